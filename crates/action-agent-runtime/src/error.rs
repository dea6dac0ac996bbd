//! Agent error types

use action_agent_core::ValidationError;
use action_agent_llm::ModelError;
use thiserror::Error;

pub type AgentResult<T> = Result<T, AgentError>;

/// The three failure kinds callers of the agent can observe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request was rejected before any remote call
    Validation,
    /// A remote tool provider failed; reported on the reply, never raised
    ToolProvider,
    /// The model provider failed or misbehaved
    Model,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::ToolProvider => "tool_provider",
            ErrorKind::Model => "model",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Instruction is empty")]
    EmptyInstruction,

    #[error("Model failure: {0}")]
    Model(#[from] ModelError),

    /// The model kept requesting tools past the configured bound
    #[error("Model did not finish within {max_turns} turns")]
    TurnLimitExceeded { max_turns: usize },
}

impl AgentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AgentError::Validation(_) | AgentError::EmptyInstruction => ErrorKind::Validation,
            AgentError::Model(_) | AgentError::TurnLimitExceeded { .. } => ErrorKind::Model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = AgentError::from(ValidationError::UnknownRequestType("x".to_string()));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Validation failed: Unknown request_type: x");

        assert_eq!(AgentError::EmptyInstruction.kind(), ErrorKind::Validation);
        assert_eq!(
            AgentError::from(ModelError::missing_api_key("bedrock")).kind(),
            ErrorKind::Model
        );
        assert_eq!(
            AgentError::TurnLimitExceeded { max_turns: 3 }.kind().to_string(),
            "model"
        );
    }
}
