use crate::domain::{
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
use crate::solver::{CoinCbcSolver, HighsSolver, MicrolpSolver};
use std::sync::Arc;

/// Preference order used by [`SolverBackend::Auto`]
const AUTO_ORDER: [SolverBackend; 3] = [
    SolverBackend::Highs,
    SolverBackend::CoinCbc,
    SolverBackend::Microlp,
];

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create the solver for `backend`, failing when its engine was not
    /// compiled into this build.
    pub fn create(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        if backend == SolverBackend::Auto {
            return AUTO_ORDER
                .iter()
                .map(|&b| Self::instantiate(b))
                .find(|solver| solver.supported())
                .ok_or_else(|| {
                    SolverError::SolverNotAvailable(
                        "no engine compiled in; enable one of the `microlp`, `coin_cbc` or `highs` features"
                            .to_string(),
                    )
                });
        }
        let solver = Self::instantiate(backend);
        if !solver.supported() {
            return Err(SolverError::SolverNotAvailable(format!(
                "{} (build with the `{}` feature)",
                solver.name(),
                Self::feature(backend)
            )));
        }
        Ok(solver)
    }

    /// Backends usable in this build, in `Auto` preference order.
    pub fn available_backends() -> Vec<SolverBackend> {
        AUTO_ORDER
            .into_iter()
            .filter(|&b| Self::instantiate(b).supported())
            .collect()
    }

    fn instantiate(backend: SolverBackend) -> Arc<dyn SolverService> {
        match backend {
            SolverBackend::Highs | SolverBackend::Auto => Arc::new(HighsSolver::new()),
            SolverBackend::CoinCbc => Arc::new(CoinCbcSolver::new()),
            SolverBackend::Microlp => Arc::new(MicrolpSolver::new()),
        }
    }

    fn feature(backend: SolverBackend) -> &'static str {
        match backend {
            SolverBackend::Highs | SolverBackend::Auto => "highs",
            SolverBackend::CoinCbc => "coin_cbc",
            SolverBackend::Microlp => "microlp",
        }
    }
}
