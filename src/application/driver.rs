// Solve use case shared by every engine adapter
//
// Translation, status mapping and write-back live here; an adapter only
// supplies the closure that runs its engine on the finished native model.

use std::time::Duration;

use tracing::{info, warn};

use crate::domain::{
    models::{Model, SolverConfig, SolverStatus},
    solver_service::{Result, SolverError},
    value_objects::ExitStatus,
};
use crate::solver::{cp_model::CpModel, factory::SolverFactory};

use super::Translator;

/// What an engine reports for one run
#[derive(Debug, Clone)]
pub struct NativeOutcome {
    pub status: ExitStatus,
    /// One value per native column; required for feasible and optimal runs
    pub values: Option<Vec<f64>>,
    /// Wall-clock time spent inside the engine
    pub runtime: Duration,
}

/// Solve `model` with the backend selected in `config`.
///
/// An unavailable backend is reported before anything is translated.
pub fn solve(model: &Model, config: &SolverConfig) -> Result<SolverStatus> {
    config.validate()?;
    let solver = SolverFactory::create(config.backend)?;
    solver.solve(model, config)
}

/// Translate `model`, run the engine through `run`, map its outcome and write
/// the solution back into the model's variables.
pub fn solve_model<F>(
    model: &Model,
    config: &SolverConfig,
    solver_name: &str,
    run: F,
) -> Result<SolverStatus>
where
    F: FnOnce(&CpModel) -> Result<NativeOutcome>,
{
    config.validate()?;
    model.validate()?;

    // Snapshot before translation so auxiliaries are never written back
    let user_variables = model.variables();
    info!(
        solver = solver_name,
        model = %model.name,
        constraints = model.constraints.len(),
        variables = user_variables.len(),
        "translating model"
    );

    let translation = Translator::new(config).make_model(model)?;
    let native = translation.model();
    info!(
        solver = solver_name,
        columns = native.columns().len(),
        rows = native.rows().len(),
        "native model built"
    );

    let outcome = run(native)?;

    let mut objective_value = None;
    if outcome.status.has_solution() {
        let values = outcome.values.ok_or_else(|| {
            SolverError::ExecutionFailed(format!(
                "{} reported {} without an assignment",
                solver_name, outcome.status
            ))
        })?;
        if !native.is_satisfied_by(&values) {
            warn!(
                solver = solver_name,
                status = %outcome.status,
                "engine assignment violates the native model"
            );
        }
        translation.write_back(&user_variables, &values);
        objective_value = translation.objective_value(&values);
    }

    let status = SolverStatus {
        solver_name: solver_name.to_string(),
        exit_status: outcome.status,
        runtime: outcome.runtime,
        objective_value,
        statistics: translation.statistics(),
    };
    info!(
        solver = solver_name,
        status = %status.exit_status,
        runtime_ms = status.runtime.as_secs_f64() * 1000.0,
        "solve finished"
    );
    Ok(status)
}
