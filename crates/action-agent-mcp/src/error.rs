//! MCP error types
//!
//! Errors raised while connecting to remote MCP servers and calling their
//! tools, with the mapping onto tool failure reasons.

use action_agent_core::FailureReason;
use rmcp::ServiceError;
use rmcp::model::ErrorCode;
use thiserror::Error;

/// MCP operation result type
pub type McpResult<T> = Result<T, McpError>;

/// Errors that can occur during MCP operations
#[derive(Debug, Error)]
pub enum McpError {
    /// Could not establish or initialize the session
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Session is no longer usable
    #[error("Connection closed")]
    ConnectionClosed,

    /// Operation did not finish in time
    #[error("Timed out: {0}")]
    Timeout(String),

    /// MCP protocol error
    #[error("MCP protocol error: {0}")]
    ProtocolError(String),

    /// The server rejected the tool arguments
    #[error("Invalid tool parameters: {0}")]
    InvalidParameters(String),

    /// The server answered with an error
    #[error("Client error: {0}")]
    ClientError(String),
}

impl McpError {
    /// Convert an MCP error to a tool failure reason attributed to `provider`.
    pub fn to_failure_reason(&self, provider: &str) -> FailureReason {
        match self {
            McpError::ConnectionError(msg) => FailureReason::NetworkError {
                message: format!("{}: {}", provider, msg),
            },
            McpError::ConnectionClosed => FailureReason::NetworkError {
                message: format!("{}: MCP connection closed", provider),
            },
            McpError::Timeout(op) => FailureReason::Timeout {
                operation: format!("{}: {}", provider, op),
            },
            McpError::InvalidParameters(msg) => FailureReason::InvalidInput {
                message: msg.clone(),
            },
            McpError::ProtocolError(msg) | McpError::ClientError(msg) => {
                FailureReason::RemoteError {
                    provider: provider.to_string(),
                    message: msg.clone(),
                }
            }
        }
    }

    /// Classify an rmcp service error by variant and JSON-RPC error code.
    pub fn from_service_error(error: ServiceError) -> Self {
        match error {
            ServiceError::McpError(data) => match data.code {
                ErrorCode::INVALID_PARAMS => McpError::InvalidParameters(data.message.into_owned()),
                ErrorCode::PARSE_ERROR
                | ErrorCode::INVALID_REQUEST
                | ErrorCode::METHOD_NOT_FOUND => McpError::ProtocolError(data.message.into_owned()),
                _ => McpError::ClientError(data.message.into_owned()),
            },
            ServiceError::TransportSend(e) => McpError::ConnectionError(e.to_string()),
            ServiceError::TransportClosed | ServiceError::Cancelled { .. } => {
                McpError::ConnectionClosed
            }
            ServiceError::Timeout { timeout } => {
                McpError::Timeout(format!("request after {:?}", timeout))
            }
            ServiceError::UnexpectedResponse => {
                McpError::ProtocolError("unexpected response type".to_string())
            }
            other => McpError::ClientError(other.to_string()),
        }
    }
}
