//! Model types - request, response, conversation and error types

use action_agent_core::ToolSpec;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Provider-assigned id, echoed back with the result
    pub id: String,
    pub name: String,
    pub arguments: Value,
}

/// One turn of the conversation sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    User {
        content: String,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        call_id: String,
        content: String,
        #[serde(default)]
        is_error: bool,
    },
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>, is_error: bool) -> Self {
        Message::ToolResult {
            call_id: call_id.into(),
            content: content.into(),
            is_error,
        }
    }
}

/// Model request for one chat turn.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub system: String,
    pub messages: Vec<Message>,
    pub tools: Vec<ToolSpec>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Why the model stopped generating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndTurn,
    ToolUse,
    MaxTokens,
    Other(String),
}

impl StopReason {
    /// Map provider stop/finish reasons onto the shared set.
    pub fn from_provider(reason: &str) -> Self {
        match reason {
            "end_turn" | "stop" | "stop_sequence" => StopReason::EndTurn,
            "tool_use" | "tool_calls" | "function_call" => StopReason::ToolUse,
            "max_tokens" | "length" => StopReason::MaxTokens,
            other => StopReason::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

/// Model response for one chat turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub stop_reason: StopReason,
    pub usage: Option<Usage>,
}

impl ModelResponse {
    /// A plain text answer with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            text: Some(content.into()),
            tool_calls: Vec::new(),
            stop_reason: StopReason::EndTurn,
            usage: None,
        }
    }

    /// A response requesting the given tool calls.
    pub fn tool_use(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            text: None,
            tool_calls,
            stop_reason: StopReason::ToolUse,
            usage: None,
        }
    }

    pub fn wants_tools(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// The assistant turn to append to the conversation.
    pub fn to_message(&self) -> Message {
        Message::Assistant {
            text: self.text.clone(),
            tool_calls: self.tool_calls.clone(),
        }
    }
}

/// Model errors
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' is not supported")]
    ProviderNotFound { provider: String },

    #[error("provider '{provider}' requires an API key")]
    MissingApiKey { provider: String },

    #[error("network error calling provider '{provider}': {source}")]
    Network {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("provider '{provider}' returned HTTP {status}: {body}")]
    Status {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("provider '{provider}' returned invalid response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ModelError {
    pub fn provider_not_found(provider: impl Into<String>) -> Self {
        Self::ProviderNotFound {
            provider: provider.into(),
        }
    }

    pub fn missing_api_key(provider: impl Into<String>) -> Self {
        Self::MissingApiKey {
            provider: provider.into(),
        }
    }

    pub fn network(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            provider: provider.into(),
            source,
        }
    }

    pub fn status(provider: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            provider: provider.into(),
            status,
            body: body.into(),
        }
    }

    pub fn invalid_response(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same request may succeed.
    ///
    /// Throttling, server errors, timeouts and connection failures are
    /// transient; configuration and client errors are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ModelError::Network { source, .. } => {
                source.is_connect()
                    || source.is_timeout()
                    || source
                        .status()
                        .is_some_and(|s| s.as_u16() == 429 || s.is_server_error())
            }
            ModelError::Status { status, .. } => *status == 429 || (500..600).contains(status),
            ModelError::ProviderNotFound { .. }
            | ModelError::MissingApiKey { .. }
            | ModelError::InvalidResponse { .. } => false,
        }
    }
}

pub type ModelResult<T> = Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("end_turn", StopReason::EndTurn)]
    #[case("stop", StopReason::EndTurn)]
    #[case("tool_use", StopReason::ToolUse)]
    #[case("tool_calls", StopReason::ToolUse)]
    #[case("length", StopReason::MaxTokens)]
    #[case("guardrail_intervened", StopReason::Other("guardrail_intervened".to_string()))]
    fn maps_provider_stop_reasons(#[case] raw: &str, #[case] expected: StopReason) {
        assert_eq!(StopReason::from_provider(raw), expected);
    }

    #[rstest]
    #[case(429, true)]
    #[case(500, true)]
    #[case(503, true)]
    #[case(400, false)]
    #[case(403, false)]
    fn status_retryability(#[case] status: u16, #[case] retryable: bool) {
        assert_eq!(
            ModelError::status("bedrock", status, "").is_retryable(),
            retryable
        );
    }

    #[test]
    fn configuration_errors_are_permanent() {
        assert!(!ModelError::missing_api_key("openai").is_retryable());
        assert!(!ModelError::provider_not_found("gemini").is_retryable());
        assert!(!ModelError::invalid_response("openai", "no choices").is_retryable());
    }

    #[test]
    fn response_becomes_assistant_message() {
        let call = ToolCall {
            id: "t1".to_string(),
            name: "log_action".to_string(),
            arguments: serde_json::json!({}),
        };
        let response = ModelResponse::tool_use(vec![call.clone()]);
        assert!(response.wants_tools());
        assert_eq!(
            response.to_message(),
            Message::Assistant {
                text: None,
                tool_calls: vec![call]
            }
        );
    }
}
