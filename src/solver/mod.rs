// Native target model and engine adapters

pub mod cp_model;
pub mod factory;
pub mod good_lp_solver;
pub mod highs_solver;
pub mod linear;

pub use cp_model::CpModel;
pub use factory::SolverFactory;
pub use good_lp_solver::{CoinCbcSolver, MicrolpSolver};
pub use highs_solver::HighsSolver;
