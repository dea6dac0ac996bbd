//! Error handling for the HTTP surface
//!
//! Every handler error is rendered as a JSON [`ErrorResponse`] with a
//! machine-readable [`ErrorCode`] and a matching HTTP status.

use action_agent_runtime::AgentError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use utoipa::ToSchema;

/// Type-safe error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Request body is missing a required field
    MissingRequiredField,
    /// Request body is present but unusable
    InvalidInput,
    /// Structured request failed the required-field check
    ValidationFailed,
    /// The model provider failed
    ModelFailed,
    /// The model did not finish within the turn limit
    TurnLimitExceeded,
    /// Internal server error
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MissingRequiredField => "missing_required_field",
            Self::InvalidInput => "invalid_input",
            Self::ValidationFailed => "validation_failed",
            Self::ModelFailed => "model_failed",
            Self::TurnLimitExceeded => "turn_limit_exceeded",
            Self::InternalError => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingRequiredField | Self::InvalidInput | Self::ValidationFailed => {
                StatusCode::BAD_REQUEST
            }
            Self::ModelFailed => StatusCode::BAD_GATEWAY,
            Self::TurnLimitExceeded | Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structured error response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: ErrorCode,
    /// Human-readable error message
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Handler error
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingRequiredField,
            format!("Missing required field: {field}"),
        )
        .with_details(serde_json::json!({ "field": field }))
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status(&self) -> StatusCode {
        self.code.status()
    }
}

impl From<AgentError> for ApiError {
    fn from(err: AgentError) -> Self {
        let code = match &err {
            AgentError::EmptyInstruction => ErrorCode::MissingRequiredField,
            AgentError::Validation(_) => ErrorCode::ValidationFailed,
            AgentError::Model(_) => ErrorCode::ModelFailed,
            AgentError::TurnLimitExceeded { .. } => ErrorCode::TurnLimitExceeded,
        };
        Self::new(code, err.to_string())
            .with_details(serde_json::json!({ "kind": err.kind().as_str() }))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = %self.code, message = %self.message, "Request failed");
        } else {
            warn!(code = %self.code, message = %self.message, "Request rejected");
        }

        let body = ErrorResponse {
            error: self.code,
            message: self.message,
            details: self.details,
        };
        (status, Json(body)).into_response()
    }
}
