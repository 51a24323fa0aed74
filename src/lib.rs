pub mod config;
pub mod core;
pub mod life;

pub use config::{AgentConfig, AppConfig, SimulationConfig};
pub use life::agent::MelodicAgent;
pub use life::error::AgentError;
pub use life::field::{FieldTensor, FieldType};
pub use life::learning::{ActionId, StateKey};
pub use life::state::MusicalState;
