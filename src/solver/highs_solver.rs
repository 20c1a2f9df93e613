// HiGHS Solver Adapter
// Implements the SolverService interface for HiGHS
// This is an adapter pattern - restates the native model as a HiGHS RowProblem

#[cfg(feature = "highs")]
use std::time::Instant;

#[cfg(feature = "highs")]
use crate::application::NativeOutcome;
use crate::domain::{
    models::{Model, SolverConfig, SolverStatus},
    solver_service::{Result, SolverError, SolverService},
};
#[cfg(feature = "highs")]
use crate::domain::value_objects::{ExitStatus, OptimizationType};
#[cfg(feature = "highs")]
use crate::solver::cp_model::CpModel;

pub struct HighsSolver;

impl HighsSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for HighsSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "highs")]
fn run_highs(native: &CpModel, config: &SolverConfig, name: &str) -> Result<NativeOutcome> {
    use highs::{HighsModelStatus, RowProblem, Sense};

    let mut costs = vec![0.0; native.columns().len()];
    let mut sense = Sense::Minimise;
    if let Some((direction, e)) = native.objective() {
        for (col, k) in e.terms() {
            costs[col.index()] = k as f64;
        }
        if *direction == OptimizationType::Maximize {
            sense = Sense::Maximise;
        }
    }

    // Add columns first, then rows
    let mut pb = RowProblem::default();
    let cols: Vec<_> = native
        .columns()
        .iter()
        .zip(&costs)
        .map(|(c, &cost)| pb.add_integer_column(cost, (c.lb as f64)..=(c.ub as f64)))
        .collect();

    for row in native.rows() {
        let terms: Vec<_> = row
            .terms
            .iter()
            .map(|&(col, k)| (cols[col.index()], k as f64))
            .collect();
        match (row.lower, row.upper) {
            (Some(l), Some(u)) => pb.add_row((l as f64)..=(u as f64), &terms),
            (None, Some(u)) => pb.add_row(..=(u as f64), &terms),
            (Some(l), None) => pb.add_row((l as f64).., &terms),
            (None, None) => {}
        }
    }

    let mut highs_model = pb.optimise(sense);
    if !config.verbose {
        highs_model.make_quiet();
    }
    highs_model.set_option("threads", config.num_workers as i32);
    if let Some(seconds) = config.time_limit {
        highs_model.set_option("time_limit", seconds);
    }

    let start_time = Instant::now();
    let solved = highs_model.try_solve().map_err(|status| {
        SolverError::ExecutionFailed(format!("HiGHS run failed: {:?}", status))
    })?;
    let runtime = start_time.elapsed();

    let with_values = |status: ExitStatus| NativeOutcome {
        status,
        values: Some(solved.get_solution().columns().to_vec()),
        runtime,
    };

    // Every column is bounded, so unbounded-or-infeasible means infeasible
    match solved.status() {
        HighsModelStatus::Optimal | HighsModelStatus::ModelEmpty => {
            Ok(with_values(ExitStatus::Optimal))
        }
        HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
            Ok(NativeOutcome {
                status: ExitStatus::Unsatisfiable,
                values: None,
                runtime,
            })
        }
        status @ (HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit) => {
            let outcome = with_values(ExitStatus::Feasible);
            match &outcome.values {
                Some(values) if native.is_satisfied_by(values) => Ok(outcome),
                _ => Err(SolverError::UnknownStatus {
                    solver: name.to_string(),
                    status: format!("{:?} without a solution", status),
                }),
            }
        }
        status => Err(SolverError::UnknownStatus {
            solver: name.to_string(),
            status: format!("{:?}", status),
        }),
    }
}

impl SolverService for HighsSolver {
    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolverStatus> {
        #[cfg(feature = "highs")]
        {
            crate::application::solve_model(model, config, self.name(), |native| {
                run_highs(native, config, self.name())
            })
        }
        #[cfg(not(feature = "highs"))]
        {
            let _ = (model, config);
            Err(SolverError::SolverNotAvailable(
                "HiGHS (build with the `highs` feature)".to_string(),
            ))
        }
    }

    fn name(&self) -> &str {
        "HiGHS"
    }

    fn supported(&self) -> bool {
        cfg!(feature = "highs")
    }
}
