pub mod agent;
pub mod constraint_policy;
pub mod error;
pub mod field;
pub mod integrator;
pub mod learning;
pub mod state;
pub mod trajectory;
