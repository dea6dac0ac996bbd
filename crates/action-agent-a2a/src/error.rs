//! A2A error types and their wire representation.

use thiserror::Error;

pub type A2aResult<T> = Result<T, A2aError>;

#[derive(Debug, Error)]
pub enum A2aError {
    #[error("Task not found: {task_id}")]
    TaskNotFound { task_id: String },

    /// The task reached a terminal state and accepts no further changes
    #[error("Task {task_id} is in terminal state: {status}")]
    TaskTerminated { task_id: String, status: String },

    #[error("Agent not found: {agent_id}")]
    AgentNotFound { agent_id: String },

    #[error("Invalid message: {reason}")]
    InvalidMessage { reason: String },

    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Not authorized: {reason}")]
    NotAuthorized { reason: String },

    #[error("Rate limit exceeded: retry after {retry_after_seconds} seconds")]
    RateLimitExceeded { retry_after_seconds: u64 },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Protocol error: {message}")]
    ProtocolError { message: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Internal error: {message}")]
    InternalError { message: String },
}

impl A2aError {
    pub fn task_not_found(task_id: impl Into<String>) -> Self {
        Self::TaskNotFound {
            task_id: task_id.into(),
        }
    }

    pub fn task_terminated(task_id: impl Into<String>, status: impl Into<String>) -> Self {
        Self::TaskTerminated {
            task_id: task_id.into(),
            status: status.into(),
        }
    }

    pub fn invalid_message(reason: impl Into<String>) -> Self {
        Self::InvalidMessage {
            reason: reason.into(),
        }
    }

    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    pub fn protocol_error(message: impl Into<String>) -> Self {
        Self::ProtocolError {
            message: message.into(),
        }
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::InternalError {
            message: message.into(),
        }
    }

    /// HTTP status code this error is reported with
    pub fn status_code(&self) -> u16 {
        match self {
            A2aError::TaskNotFound { .. } | A2aError::AgentNotFound { .. } => 404,
            A2aError::TaskTerminated { .. }
            | A2aError::InvalidMessage { .. }
            | A2aError::ProtocolError { .. }
            | A2aError::SerializationError(_)
            | A2aError::UrlError(_) => 400,
            A2aError::AuthenticationRequired => 401,
            A2aError::NotAuthorized { .. } => 403,
            A2aError::RateLimitExceeded { .. } => 429,
            A2aError::ConnectionError { .. } => 502,
            A2aError::Timeout { .. } => 504,
            A2aError::InternalError { .. } => 500,
        }
    }
}

/// JSON error body returned by the server
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }
}

impl From<A2aError> for ErrorResponse {
    fn from(err: A2aError) -> Self {
        ErrorResponse::new(err.status_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = A2aError::task_not_found("task-123");
        assert_eq!(err.to_string(), "Task not found: task-123");
    }

    #[test]
    fn test_error_response_conversion() {
        let response: ErrorResponse = A2aError::task_not_found("task-123").into();
        assert_eq!(response.code, 404);
        assert!(response.message.contains("task-123"));

        let response: ErrorResponse = A2aError::task_terminated("t", "completed").into();
        assert_eq!(response.code, 400);

        let response: ErrorResponse = A2aError::internal_error("boom").into();
        assert_eq!(response.code, 500);
    }
}
