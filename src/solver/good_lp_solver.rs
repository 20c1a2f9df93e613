// good_lp Solver Adapters
// Implements the SolverService interface for the engines reached through
// good_lp: the pure-Rust microlp engine and COIN-OR CBC

#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
use std::time::{Duration, Instant};

#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
use good_lp::{
    variable, Constraint, Expression, ProblemVariables, ResolutionError,
    Solution as GoodLpSolutionTrait, Variable as GoodLpVariable,
};
#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
use tracing::debug;

#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
use crate::application::NativeOutcome;
use crate::domain::{
    models::{Model, SolverConfig, SolverStatus},
    solver_service::{Result, SolverError, SolverService},
};
#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
use crate::domain::value_objects::{ExitStatus, OptimizationType};
#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
use crate::solver::cp_model::CpModel;

/// Native model restated with good_lp variables and constraints
#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
struct LpParts {
    vars: ProblemVariables,
    columns: Vec<GoodLpVariable>,
    objective: Expression,
    maximise: bool,
    constraints: Vec<Constraint>,
}

#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
fn lp_parts(native: &CpModel) -> LpParts {
    let mut vars = ProblemVariables::new();
    let columns: Vec<GoodLpVariable> = native
        .columns()
        .iter()
        .map(|c| {
            vars.add(
                variable()
                    .integer()
                    .min(c.lb as f64)
                    .max(c.ub as f64)
                    .name(c.name.clone()),
            )
        })
        .collect();

    let affine = |terms: &mut dyn Iterator<Item = (usize, i64)>| {
        let mut e: Expression = 0.into();
        for (i, k) in terms {
            e += (k as f64) * columns[i];
        }
        e
    };

    // The objective constant only shifts the value; it is re-evaluated on
    // the native model after solving.
    let (objective, maximise) = match native.objective() {
        Some((direction, e)) => (
            affine(&mut e.terms().map(|(c, k)| (c.index(), k))),
            *direction == OptimizationType::Maximize,
        ),
        None => (0.into(), false),
    };

    let mut constraints = Vec::with_capacity(native.rows().len());
    for row in native.rows() {
        let lhs = affine(&mut row.terms.iter().map(|&(c, k)| (c.index(), k)));
        match (row.lower, row.upper) {
            (Some(l), Some(u)) if l == u => constraints.push(lhs.eq(l as f64)),
            (lower, upper) => {
                if let Some(u) = upper {
                    constraints.push(lhs.clone().leq(u as f64));
                }
                if let Some(l) = lower {
                    constraints.push(lhs.geq(l as f64));
                }
            }
        }
    }

    LpParts {
        vars,
        columns,
        objective,
        maximise,
        constraints,
    }
}

#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
fn outcome<S: GoodLpSolutionTrait>(
    solver: &str,
    result: std::result::Result<S, ResolutionError>,
    columns: &[GoodLpVariable],
    runtime: Duration,
    proven: bool,
) -> Result<NativeOutcome> {
    match result {
        Ok(sol) => Ok(NativeOutcome {
            status: if proven {
                ExitStatus::Optimal
            } else {
                ExitStatus::Feasible
            },
            values: Some(columns.iter().map(|&var| sol.value(var)).collect()),
            runtime,
        }),
        Err(ResolutionError::Infeasible) => Ok(NativeOutcome {
            status: ExitStatus::Unsatisfiable,
            values: None,
            runtime,
        }),
        Err(e) => Err(SolverError::UnknownStatus {
            solver: solver.to_string(),
            status: format!("{:?}", e),
        }),
    }
}

pub struct MicrolpSolver;

impl MicrolpSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MicrolpSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "microlp")]
fn run_microlp(native: &CpModel, config: &SolverConfig, name: &str) -> Result<NativeOutcome> {
    use good_lp::{solvers::microlp::microlp, SolverModel};

    if config.num_workers > 1 || config.time_limit.is_some() {
        debug!(
            solver = name,
            num_workers = config.num_workers,
            time_limit = ?config.time_limit,
            "microlp is single-threaded without a time limit; ignoring options"
        );
    }

    let parts = lp_parts(native);
    let problem = if parts.maximise {
        parts.vars.maximise(parts.objective)
    } else {
        parts.vars.minimise(parts.objective)
    };
    let mut lp_model = problem.using(microlp);
    for constraint in parts.constraints {
        lp_model = lp_model.with(constraint);
    }

    let start_time = Instant::now();
    let result = lp_model.solve();
    outcome(name, result, &parts.columns, start_time.elapsed(), true)
}

impl SolverService for MicrolpSolver {
    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolverStatus> {
        #[cfg(feature = "microlp")]
        {
            crate::application::solve_model(model, config, self.name(), |native| {
                run_microlp(native, config, self.name())
            })
        }
        #[cfg(not(feature = "microlp"))]
        {
            let _ = (model, config);
            Err(SolverError::SolverNotAvailable(
                "microlp (build with the `microlp` feature)".to_string(),
            ))
        }
    }

    fn name(&self) -> &str {
        "microlp"
    }

    fn supported(&self) -> bool {
        cfg!(feature = "microlp")
    }
}

pub struct CoinCbcSolver;

impl CoinCbcSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CoinCbcSolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "coin_cbc")]
fn run_coin_cbc(native: &CpModel, config: &SolverConfig, name: &str) -> Result<NativeOutcome> {
    use good_lp::{solvers::coin_cbc::coin_cbc, SolverModel};

    let parts = lp_parts(native);
    let problem = if parts.maximise {
        parts.vars.maximise(parts.objective)
    } else {
        parts.vars.minimise(parts.objective)
    };
    let mut lp_model = problem.using(coin_cbc);
    lp_model.set_parameter("threads", &config.num_workers.to_string());
    lp_model.set_parameter("log", if config.verbose { "1" } else { "0" });
    if let Some(seconds) = config.time_limit {
        lp_model.set_parameter("seconds", &seconds.to_string());
    }
    for constraint in parts.constraints {
        lp_model = lp_model.with(constraint);
    }

    let start_time = Instant::now();
    let result = lp_model.solve();
    let runtime = start_time.elapsed();

    // good_lp reports a time-limited incumbent like an optimum; a run that
    // used up its limit only counts as feasible.
    let proven = config
        .time_limit
        .map_or(true, |limit| runtime < Duration::from_secs_f64(limit));
    outcome(name, result, &parts.columns, runtime, proven)
}

impl SolverService for CoinCbcSolver {
    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolverStatus> {
        #[cfg(feature = "coin_cbc")]
        {
            crate::application::solve_model(model, config, self.name(), |native| {
                run_coin_cbc(native, config, self.name())
            })
        }
        #[cfg(not(feature = "coin_cbc"))]
        {
            let _ = (model, config);
            Err(SolverError::SolverNotAvailable(
                "COIN-OR CBC (build with the `coin_cbc` feature)".to_string(),
            ))
        }
    }

    fn name(&self) -> &str {
        "COIN-OR CBC"
    }

    fn supported(&self) -> bool {
        cfg!(feature = "coin_cbc")
    }
}
