/// Errors raised by the agent's public operations.
///
/// Every variant is reported before any state is mutated, so the agent is
/// still usable after an error.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentError {
    /// Malformed field tensor or agent configuration.
    Configuration(String),
    /// Empty candidate list, non-positive time step.
    InvalidArgument(String),
    /// Softmax weights could not be normalized.
    NumericalInstability(String),
}

impl AgentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    pub fn numerical_instability(message: impl Into<String>) -> Self {
        Self::NumericalInstability(message.into())
    }
}

impl std::fmt::Display for AgentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::NumericalInstability(msg) => write!(f, "numerical instability: {msg}"),
        }
    }
}

impl std::error::Error for AgentError {}
