// Domain service interface for solving constraint models
// Defines the contract that any backend adapter must follow

use super::models::{Model, SolverConfig, SolverStatus};

/// Error types for translation and solving
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("No translation for `{expr}`: {reason}")]
    Untranslatable { expr: String, reason: String },

    #[error("Variable `{0}` is referenced before it was registered")]
    UnregisteredVariable(String),

    #[error("Cannot pair sequences of length {left} and {right}")]
    ShapeMismatch { left: usize, right: usize },

    #[error("Decomposing `{expr}` exceeds the nesting limit of {limit}")]
    DecompositionDepth { expr: String, limit: usize },

    #[error("{solver} returned an unhandled status: {status}")]
    UnknownStatus { solver: String, status: String },

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for constraint solvers
///
/// A call translates the model into a fresh native model, runs the engine to
/// completion and, when a solution exists, writes values into the model's
/// variables. No state is kept between calls.
pub trait SolverService: Send + Sync {
    /// Solve a model; blocks for the whole search
    fn solve(&self, model: &Model, config: &SolverConfig) -> Result<SolverStatus>;

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Whether the engine behind this adapter can be used in this build
    fn supported(&self) -> bool;
}
