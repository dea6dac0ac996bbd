//! Tool abstraction shared by local and remote tools.
//!
//! A tool is a named capability the model may choose to invoke. Local tools
//! (`log_action`, `validate_request`) and tools discovered on remote MCP
//! servers implement the same [`Tool`] trait so the agent can dispatch them
//! uniformly.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Maximum length of a tool name accepted by model providers.
pub const MAX_TOOL_NAME_LEN: usize = 64;

/// Validated tool name.
///
/// Model providers only accept `[A-Za-z0-9_-]{1,64}` as tool names, so every
/// tool is checked against that rule before it is registered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToolName(String);

impl ToolName {
    /// Parse and validate a tool name.
    pub fn parse(name: impl AsRef<str>) -> Result<Self, InvalidToolName> {
        let name = name.as_ref().trim();

        if name.is_empty() {
            return Err(InvalidToolName::Empty);
        }
        if name.len() > MAX_TOOL_NAME_LEN {
            return Err(InvalidToolName::TooLong {
                length: name.len(),
                max: MAX_TOOL_NAME_LEN,
            });
        }
        if let Some(ch) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(InvalidToolName::InvalidCharacter {
                name: name.to_string(),
                ch,
            });
        }

        Ok(Self(name.to_string()))
    }

    /// Get the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ToolName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ToolName {
    type Error = InvalidToolName;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ToolName> for String {
    fn from(name: ToolName) -> Self {
        name.0
    }
}

/// Reasons a tool name is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidToolName {
    #[error("tool name cannot be empty")]
    Empty,

    #[error("tool name is {length} characters long, maximum is {max}")]
    TooLong { length: usize, max: usize },

    #[error("tool name '{name}' contains invalid character '{ch}'")]
    InvalidCharacter { name: String, ch: char },
}

/// Categorized failure reasons for tool execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// Invalid or malformed input provided to the tool
    InvalidInput { message: String },
    /// The requested tool does not exist
    NotFound { resource: String },
    /// The remote tool provider could not be reached
    NetworkError { message: String },
    /// The remote tool provider reported an error
    RemoteError { provider: String, message: String },
    /// Timeout exceeded
    Timeout { operation: String },
    /// Internal tool error or unexpected state
    InternalError { message: String },
}

impl FailureReason {
    /// Get a human-readable error message
    pub fn message(&self) -> String {
        match self {
            FailureReason::InvalidInput { message } => format!("Invalid input: {}", message),
            FailureReason::NotFound { resource } => format!("Not found: {}", resource),
            FailureReason::NetworkError { message } => format!("Network error: {}", message),
            FailureReason::RemoteError { provider, message } => {
                format!("{} error: {}", provider, message)
            }
            FailureReason::Timeout { operation } => format!("Timeout: {}", operation),
            FailureReason::InternalError { message } => format!("Internal error: {}", message),
        }
    }

    /// Whether the failure originated in a remote tool provider.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            FailureReason::NetworkError { .. }
                | FailureReason::RemoteError { .. }
                | FailureReason::Timeout { .. }
        )
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// The result of executing a tool.
///
/// Either successful output or a structured failure reason, so a tool can
/// never report an inconsistent success/failure state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionResult {
    /// Tool executed successfully with the given output.
    Success { output: String },

    /// Tool execution failed with a structured reason.
    Failure { reason: FailureReason },
}

impl ExecutionResult {
    /// Create a successful execution result.
    pub fn success(output: impl Into<String>) -> Self {
        ExecutionResult::Success {
            output: output.into(),
        }
    }

    /// Create a failed execution result with a structured reason.
    pub fn failed(reason: FailureReason) -> Self {
        ExecutionResult::Failure { reason }
    }

    /// Shorthand for an invalid-input failure.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::failed(FailureReason::InvalidInput {
            message: message.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ExecutionResult::Failure { .. })
    }

    /// Get the output string (for success) or error message (for failure).
    pub fn output(&self) -> String {
        match self {
            ExecutionResult::Success { output } => output.clone(),
            ExecutionResult::Failure { reason } => reason.message(),
        }
    }

    /// Get the failure reason if available.
    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            ExecutionResult::Success { .. } => None,
            ExecutionResult::Failure { reason } => Some(reason),
        }
    }

    /// Convert to a Result type for easier error handling.
    pub fn into_result(self) -> Result<String, FailureReason> {
        match self {
            ExecutionResult::Success { output } => Ok(output),
            ExecutionResult::Failure { reason } => Err(reason),
        }
    }
}

/// Description of a tool as presented to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON Schema of the tool's input object
    pub input_schema: Value,
}

/// Trait defining a capability that the model can invoke.
///
/// # Example
///
/// ```rust
/// use action_agent_core::tool::{ExecutionResult, Tool};
/// use async_trait::async_trait;
/// use serde_json::Value;
///
/// struct EchoTool;
///
/// #[async_trait]
/// impl Tool for EchoTool {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn call(&self, input: Value) -> ExecutionResult {
///         ExecutionResult::success(input.to_string())
///     }
/// }
/// ```
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the registry to route calls.
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str {
        ""
    }

    /// JSON Schema for the tool's input object.
    ///
    /// The default accepts any object.
    fn input_schema(&self) -> Value {
        serde_json::json!({ "type": "object", "properties": {} })
    }

    /// Execute the tool with the arguments chosen by the model.
    async fn call(&self, input: Value) -> ExecutionResult;

    /// Build the model-facing description of this tool.
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}
