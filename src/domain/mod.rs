// Domain module: modeling layer and the solver contract

pub mod expressions;
pub mod globals;
pub mod models;
pub mod solver_service;
pub mod value_objects;
pub mod variables;

pub use expressions::*;
pub use globals::*;
pub use models::*;
pub use solver_service::*;
pub use value_objects::*;
pub use variables::*;
