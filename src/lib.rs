// Domain layer: modeling front-end and the solver contract
pub mod domain;

// Application layer: translation context and the solve use case
pub mod application;

// Solver adapters: native target model and concrete engines
pub mod solver;

// Re-export commonly used types
pub use domain::{
    all_different, all_different_except_zero, all_equal, circuit, count,
    global_cardinality_count, max, min, opaque, CmpOp, Decomposition, ExitStatus, Expr,
    GlobalConstraint, Model, Objective, OptimizationType, Operator, SolverBackend, SolverConfig,
    SolverError, SolverService, SolverStatus, TranslationStatistics, Var, VarKind,
};

pub use application::{solve, Translation, Translator};

pub use solver::{CoinCbcSolver, HighsSolver, MicrolpSolver, SolverFactory};
