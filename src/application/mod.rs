// Application layer: translation of a constraint model into a native model
// and the solve use case shared by every engine adapter

pub mod converter;
pub mod driver;
pub mod poster;
pub mod registry;

pub use driver::{solve, solve_model, NativeOutcome};
pub use poster::zip_cycle;
pub use registry::{Handle, VarRegistry};

use std::fmt;

use tracing::trace;

use crate::domain::{
    expressions::Expr,
    models::{Model, SolverConfig, TranslationStatistics},
    solver_service::{Result, SolverError},
    value_objects::OptimizationType,
    variables::Var,
};
use crate::solver::{cp_model::CpModel, linear::LoweringError};

/// Per-solve translation context
///
/// Owns the registry and the native model under construction. A translator
/// is built for one model and consumed by [`Translator::make_model`].
pub struct Translator<'a> {
    config: &'a SolverConfig,
    registry: VarRegistry,
    model: CpModel,
    depth: usize,
}

impl<'a> Translator<'a> {
    pub fn new(config: &'a SolverConfig) -> Self {
        Self {
            config,
            registry: VarRegistry::new(),
            model: CpModel::new(config.max_domain_enumeration),
            depth: 0,
        }
    }

    pub fn registry(&self) -> &VarRegistry {
        &self.registry
    }

    pub fn native_model(&self) -> &CpModel {
        &self.model
    }

    pub fn register(&mut self, var: &Var) -> Handle {
        self.registry.ensure(var, &mut self.model)
    }

    /// Register every variable, post every constraint in order, then install
    /// the objective.
    pub fn make_model(mut self, model: &Model) -> Result<Translation> {
        let user_variables = model.variables();
        for var in &user_variables {
            self.register(var);
        }

        for constraint in &model.constraints {
            trace!(constraint = %constraint, "posting constraint");
            self.post_constraint(constraint)?;
        }

        if let Some(objective) = &model.objective {
            let value = self.convert_subexpr(&objective.expr)?;
            let e = self
                .model
                .linear_of(value)
                .map_err(lowering_failed(&objective.expr))?;
            match objective.optimization_type {
                OptimizationType::Minimize => self.model.minimize(e),
                OptimizationType::Maximize => self.model.maximize(e),
            }
        }

        Ok(Translation {
            registry: self.registry,
            model: self.model,
            num_user_variables: user_variables.len(),
        })
    }

    // Runs `f` one decomposition level deeper.
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

pub(crate) fn untranslatable(expr: &Expr, reason: impl fmt::Display) -> SolverError {
    SolverError::Untranslatable {
        expr: expr.to_string(),
        reason: reason.to_string(),
    }
}

/// Error mapper attaching `expr` to a lowering failure.
pub(crate) fn lowering_failed(expr: &Expr) -> impl Fn(LoweringError) -> SolverError + '_ {
    move |err| untranslatable(expr, err)
}

// Counts beyond u32 saturate.
fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Finished native model plus the mapping needed to read values back
#[derive(Debug)]
pub struct Translation {
    registry: VarRegistry,
    model: CpModel,
    num_user_variables: usize,
}

impl Translation {
    pub fn model(&self) -> &CpModel {
        &self.model
    }

    pub fn registry(&self) -> &VarRegistry {
        &self.registry
    }

    /// Store the engine's values (rounded) in the given variables.
    pub fn write_back(&self, vars: &[Var], values: &[f64]) {
        for var in vars {
            if let Some(handle) = self.registry.get(var) {
                var.set_value(Some(handle.value(values)));
            }
        }
    }

    pub fn objective_value(&self, values: &[f64]) -> Option<i64> {
        self.model
            .objective()
            .map(|(_, e)| e.evaluate(values).round() as i64)
    }

    pub fn statistics(&self) -> TranslationStatistics {
        let columns = self.model.columns().len();
        TranslationStatistics {
            num_user_variables: count(self.num_user_variables),
            num_auxiliary_columns: count(columns.saturating_sub(self.num_user_variables)),
            num_bool_columns: count(self.model.num_bool_columns()),
            num_rows: count(self.model.rows().len()),
        }
    }
}
