use std::time::Duration;

use super::expressions::{vars_expr, Expr};
use super::globals::GlobalConstraint;
use super::solver_service::{Result, SolverError};
use super::value_objects::{ExitStatus, OptimizationType, SolverBackend};
use super::variables::{Var, VarKind};

/// Objective expression and direction
#[derive(Debug, Clone)]
pub struct Objective {
    pub optimization_type: OptimizationType,
    pub expr: Expr,
}

/// Constraint model: ordered constraints plus an optional objective
///
/// Variables are not stored; they are discovered from the expressions.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub constraints: Vec<Expr>,
    pub objective: Option<Objective>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn add(&mut self, constraint: impl Into<Expr>) -> &mut Self {
        self.constraints.push(constraint.into());
        self
    }

    pub fn maximize(&mut self, expr: impl Into<Expr>) -> &mut Self {
        self.objective = Some(Objective {
            optimization_type: OptimizationType::Maximize,
            expr: expr.into(),
        });
        self
    }

    pub fn minimize(&mut self, expr: impl Into<Expr>) -> &mut Self {
        self.objective = Some(Objective {
            optimization_type: OptimizationType::Minimize,
            expr: expr.into(),
        });
        self
    }

    /// Variables of the constraints and the objective, in first-occurrence
    /// order.
    pub fn variables(&self) -> Vec<Var> {
        vars_expr(
            self.constraints
                .iter()
                .chain(self.objective.as_ref().map(|o| &o.expr)),
        )
    }

    /// Check domains and expression shapes, reporting every problem at once.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();

        for var in self.variables() {
            if let VarKind::Int { lb, ub } = var.kind() {
                if lb > ub {
                    errors.push(format!(
                        "Variable '{}' has lower bound ({}) > upper bound ({})",
                        var.name(),
                        lb,
                        ub
                    ));
                }
            }
        }

        let roots = self
            .constraints
            .iter()
            .chain(self.objective.as_ref().map(|o| &o.expr));
        for root in roots {
            root.visit(&mut |e| check_shape(e, &mut errors));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }
}

fn check_shape(expr: &Expr, errors: &mut Vec<String>) {
    match expr {
        Expr::NegBoolView(v) if !v.is_bool() => {
            errors.push(format!("Negated view of non-boolean variable '{}'", v));
        }
        Expr::Op(op, args) => {
            if let Some(arity) = op.arity() {
                if args.len() != arity {
                    errors.push(format!(
                        "Operator '{}' expects {} arguments, got {} in {}",
                        op,
                        arity,
                        args.len(),
                        expr
                    ));
                }
            }
        }
        Expr::Element { array, .. } if array.is_empty() => {
            errors.push(format!("Element over an empty array: {}", expr));
        }
        Expr::Global(GlobalConstraint::Min(args)) | Expr::Global(GlobalConstraint::Max(args))
            if args.is_empty() =>
        {
            errors.push(format!("Global function without arguments: {}", expr));
        }
        Expr::Global(GlobalConstraint::GlobalCardinalityCount { values, counts, .. })
            if values.len() != counts.len() =>
        {
            errors.push(format!(
                "gcc has {} values but {} counts",
                values.len(),
                counts.len()
            ));
        }
        _ => {}
    }
}

/// Configuration for a solve call
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "snake_case"))]
pub struct SolverConfig {
    pub backend: SolverBackend,
    /// Parallelism hint passed to the engine
    pub num_workers: u32,
    /// Wall-clock limit in seconds, for engines that accept one
    pub time_limit: Option<f64>,
    /// Nesting limit for global constraint decompositions
    pub max_decomposition_depth: usize,
    /// Largest domain enumerated when linearizing non-linear terms
    pub max_domain_enumeration: u64,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            num_workers: 1,
            time_limit: None,
            max_decomposition_depth: 32,
            max_domain_enumeration: 4096,
            verbose: false,
        }
    }
}

impl SolverConfig {
    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.backend = backend;
        self
    }

    pub fn with_num_workers(mut self, num_workers: u32) -> Self {
        self.num_workers = num_workers;
        self
    }

    pub fn with_time_limit(mut self, seconds: f64) -> Self {
        self.time_limit = Some(seconds);
        self
    }

    pub fn with_max_decomposition_depth(mut self, depth: usize) -> Self {
        self.max_decomposition_depth = depth;
        self
    }

    pub fn with_max_domain_enumeration(mut self, size: u64) -> Self {
        self.max_domain_enumeration = size;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(SolverError::InvalidConfig(
                "num_workers must be at least 1".to_string(),
            ));
        }
        if let Some(limit) = self.time_limit {
            if !(limit > 0.0 && limit.is_finite()) {
                return Err(SolverError::InvalidConfig(format!(
                    "time_limit must be positive, got {}",
                    limit
                )));
            }
        }
        if self.max_decomposition_depth == 0 {
            return Err(SolverError::InvalidConfig(
                "max_decomposition_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse a TOML document; missing keys keep their defaults.
    #[cfg(feature = "serde")]
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SolverConfig =
            toml::from_str(s).map_err(|e| SolverError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Size of the native model produced by a translation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationStatistics {
    pub num_user_variables: u32,
    pub num_auxiliary_columns: u32,
    pub num_bool_columns: u32,
    pub num_rows: u32,
}

/// Result record of a solve call
#[derive(Debug, Clone)]
pub struct SolverStatus {
    pub solver_name: String,
    pub exit_status: ExitStatus,
    pub runtime: Duration,
    /// Objective value of the written-back assignment, when there is one
    pub objective_value: Option<i64>,
    pub statistics: TranslationStatistics,
}

impl SolverStatus {
    pub fn is_optimal(&self) -> bool {
        self.exit_status == ExitStatus::Optimal
    }

    pub fn is_feasible(&self) -> bool {
        self.exit_status.has_solution()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::globals::{min, opaque, Decomposition};
    use crate::domain::value_objects::Operator;

    #[test]
    fn variables_include_the_objective() {
        let x = Var::integer("x", 0, 9);
        let y = Var::integer("y", 0, 9);
        let mut model = Model::new();
        model.add(x.expr().le(5)).maximize(&y);
        assert_eq!(model.variables(), vec![x, y]);
    }

    #[test]
    fn variables_reach_into_opaque_decompositions() {
        let x = Var::integer("x", 0, 3);
        let y = Var::integer("y", 0, 3);
        let aux = Var::integer("aux", 0, 4);
        let inner = opaque(
            "inner",
            Vec::<Expr>::new(),
            Some(Decomposition::new(vec![y.expr().le(2)])),
        );
        let outer = opaque(
            "outer",
            [&x],
            Some(
                Decomposition::new(vec![aux.expr().eq(&x + 1), inner])
                    .with_new_vars(vec![aux.clone()]),
            ),
        );
        let mut model = Model::new();
        model.add(outer);
        assert_eq!(model.variables(), vec![x, y]);
    }

    #[test]
    fn validate_collects_every_problem() {
        let bad = Var::integer("bad", 3, 1);
        let b = Var::integer("n", 0, 1);
        let mut model = Model::new();
        model
            .add(bad.expr().eq(2))
            .add(Expr::Op(Operator::Sub, vec![b.expr()]).eq(0))
            .add(b.not())
            .add(min(Vec::<Expr>::new()).eq(0));
        let err = model.validate().unwrap_err().to_string();
        assert!(err.contains("'bad'"), "{}", err);
        assert!(err.contains("expects 2 arguments"), "{}", err);
        assert!(err.contains("non-boolean"), "{}", err);
        assert!(err.contains("without arguments"), "{}", err);
    }

    #[test]
    fn config_rejects_zero_workers() {
        assert!(SolverConfig::default().validate().is_ok());
        let err = SolverConfig::default().with_num_workers(0).validate();
        assert!(matches!(err, Err(SolverError::InvalidConfig(_))));
        let err = SolverConfig::default().with_time_limit(0.0).validate();
        assert!(matches!(err, Err(SolverError::InvalidConfig(_))));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_loads_from_toml() {
        let config = SolverConfig::from_toml_str(
            r#"
            backend = "microlp"
            num_workers = 4
            time_limit = 2.5
        "#,
        )
        .unwrap();
        assert_eq!(config.backend, SolverBackend::Microlp);
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.time_limit, Some(2.5));
        assert_eq!(config.max_decomposition_depth, 32);
    }
}
