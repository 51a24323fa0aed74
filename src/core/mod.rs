pub mod linalg;
pub mod phase;
