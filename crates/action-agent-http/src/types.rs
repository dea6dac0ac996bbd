//! Request and response bodies of the HTTP endpoints

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Action-group envelope version understood by this agent
pub const ACTION_GROUP_MESSAGE_VERSION: &str = "1.0";

/// Liveness probe response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PingResponse {
    #[schema(example = "healthy")]
    pub status: String,
}

/// Cloud runtime invocation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct InvocationRequest {
    /// Natural-language instruction for the agent
    #[schema(example = "Create user jane@example.com (Jane Doe) in PingOne")]
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct InvocationResponse {
    /// Final answer of the agent
    pub result: String,
    /// Number of tool calls made while producing the answer
    pub tool_calls: usize,
    /// Tool calls that failed in a remote tool provider
    pub tool_failures: usize,
    /// `tool_provider` when a remote tool provider failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(example = "tool_provider")]
    pub failure_kind: Option<String>,
}

/// Body of `POST /validate`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ValidateRequestBody {
    #[schema(example = "create_user")]
    pub request_type: String,
    /// Fields of the request; anything other than an object has no fields
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
}

/// `{"valid": true}` or `{"valid": false, "error": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// One named function parameter of an action-group call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ActionGroupParameter {
    pub name: String,
    /// `string`, `number`, `integer`, `boolean` or `array`
    #[serde(rename = "type", default = "default_parameter_type")]
    pub kind: String,
    pub value: String,
}

fn default_parameter_type() -> String {
    "string".to_string()
}

impl ActionGroupParameter {
    /// The parameter value as JSON, typed by its declared kind.
    ///
    /// Values that do not parse as their declared kind stay strings.
    pub fn typed_value(&self) -> Value {
        let parsed = match self.kind.as_str() {
            "number" | "integer" | "boolean" | "array" => {
                serde_json::from_str::<Value>(self.value.trim()).ok()
            }
            _ => None,
        };
        parsed.unwrap_or_else(|| Value::String(self.value.clone()))
    }
}

/// REST action-group invocation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupRequest {
    #[serde(default = "default_message_version")]
    pub message_version: String,
    pub action_group: String,
    pub function: String,
    #[serde(default)]
    pub parameters: Vec<ActionGroupParameter>,
    /// Free-text input of the calling agent, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub session_attributes: Map<String, Value>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub prompt_session_attributes: Map<String, Value>,
}

fn default_message_version() -> String {
    ACTION_GROUP_MESSAGE_VERSION.to_string()
}

impl ActionGroupRequest {
    /// Parameters as a JSON object, last value wins on duplicate names
    pub fn fields(&self) -> Map<String, Value> {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.typed_value()))
            .collect()
    }
}

/// Outcome reported to the calling agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseState {
    Failure,
    Reprompt,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ResponseBody {
    #[serde(rename = "TEXT")]
    pub text: TextBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    /// Absent on success
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_state: Option<ResponseState>,
    pub response_body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupResult {
    pub action_group: String,
    pub function: String,
    pub function_response: FunctionResponse,
}

/// REST action-group response envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActionGroupResponse {
    pub message_version: String,
    pub response: ActionGroupResult,
    #[schema(value_type = Object)]
    pub session_attributes: Map<String, Value>,
    #[schema(value_type = Object)]
    pub prompt_session_attributes: Map<String, Value>,
}

impl ActionGroupResponse {
    /// Answer `request`, echoing its session attributes
    pub fn reply(request: ActionGroupRequest, body: String, state: Option<ResponseState>) -> Self {
        Self {
            message_version: request.message_version,
            response: ActionGroupResult {
                action_group: request.action_group,
                function: request.function,
                function_response: FunctionResponse {
                    response_state: state,
                    response_body: ResponseBody {
                        text: TextBody { body },
                    },
                },
            },
            session_attributes: request.session_attributes,
            prompt_session_attributes: request.prompt_session_attributes,
        }
    }

    pub fn body(&self) -> &str {
        &self.response.function_response.response_body.text.body
    }

    pub fn is_failure(&self) -> bool {
        self.response.function_response.response_state == Some(ResponseState::Failure)
    }
}
