//! Amazon Bedrock Runtime client using the Converse API.
//!
//! Authenticates with a Bedrock API key sent as a bearer token, so no request
//! signing is needed.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::client::{HttpClientBase, ModelClient};
use crate::types::{Message, ModelError, ModelRequest, ModelResponse, StopReason, ToolCall, Usage};

pub const DEFAULT_REGION: &str = "us-east-1";

/// Bedrock Converse client.
#[derive(Clone)]
pub struct BedrockClient {
    base: HttpClientBase,
}

impl BedrockClient {
    /// Client for the regional Bedrock Runtime endpoint, or `endpoint` when given.
    pub fn new(region: &str, endpoint: Option<&str>, api_key: Option<String>) -> Self {
        let endpoint = endpoint
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://bedrock-runtime.{region}.amazonaws.com"));

        Self {
            base: HttpClientBase::new("bedrock", endpoint, api_key),
        }
    }

    fn converse_path(model_id: &str) -> String {
        format!("/model/{}/converse", encode_model_id(model_id))
    }

    fn build_payload(request: &ModelRequest) -> ConverseRequest {
        let mut system = Vec::new();
        if !request.system.is_empty() {
            system.push(json!({ "text": request.system }));
        }

        let tool_config = (!request.tools.is_empty()).then(|| {
            let tools = request
                .tools
                .iter()
                .map(|spec| {
                    let description = if spec.description.is_empty() {
                        spec.name.clone()
                    } else {
                        spec.description.clone()
                    };
                    json!({
                        "toolSpec": {
                            "name": spec.name,
                            "description": description,
                            "inputSchema": { "json": spec.input_schema },
                        }
                    })
                })
                .collect::<Vec<_>>();
            json!({ "tools": tools })
        });

        ConverseRequest {
            system,
            messages: to_converse_messages(&request.messages),
            tool_config,
            inference_config: InferenceConfig {
                max_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }

    fn parse_response(&self, response: ConverseResponse) -> ModelResponse {
        let mut texts = Vec::new();
        let mut tool_calls = Vec::new();

        for block in response.output.message.content {
            if let Some(text) = block.get("text").and_then(Value::as_str) {
                texts.push(text.to_string());
            } else if let Some(tool_use) = block.get("toolUse") {
                tool_calls.push(ToolCall {
                    id: tool_use
                        .get("toolUseId")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    name: tool_use
                        .get("name")
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string(),
                    arguments: tool_use.get("input").cloned().unwrap_or_else(|| json!({})),
                });
            }
        }

        let text = texts.join("\n");
        ModelResponse {
            text: (!text.is_empty()).then_some(text),
            tool_calls,
            stop_reason: StopReason::from_provider(&response.stop_reason),
            usage: response.usage.map(|u| Usage {
                input_tokens: u.input_tokens,
                output_tokens: u.output_tokens,
            }),
        }
    }
}

#[async_trait]
impl ModelClient for BedrockClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&Self::converse_path(&request.model));
        let payload = Self::build_payload(&request);

        info!(
            provider = self.base.id.as_str(),
            model = request.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending Converse request to Bedrock"
        );

        let response: ConverseResponse = self.base.post_with_bearer(&url, &payload).await?;
        debug!(stop_reason = response.stop_reason.as_str(), "Received Converse response");

        Ok(self.parse_response(response))
    }
}

/// Model ids and inference profile ARNs contain `:` and `/`.
fn encode_model_id(model_id: &str) -> String {
    model_id.replace(':', "%3A").replace('/', "%2F")
}

/// Stand-in for empty text, which Converse rejects.
const EMPTY_TEXT: &str = "(no output)";

fn text_block(text: &str) -> Value {
    if text.trim().is_empty() {
        json!({ "text": EMPTY_TEXT })
    } else {
        json!({ "text": text })
    }
}

/// Converse requires strictly alternating roles, so consecutive tool results
/// are grouped into a single user turn.
fn to_converse_messages(messages: &[Message]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(messages.len());
    let mut pending_results: Vec<Value> = Vec::new();

    let flush = |out: &mut Vec<Value>, pending: &mut Vec<Value>| {
        if !pending.is_empty() {
            out.push(json!({ "role": "user", "content": std::mem::take(pending) }));
        }
    };

    for message in messages {
        match message {
            Message::ToolResult {
                call_id,
                content,
                is_error,
            } => pending_results.push(json!({
                "toolResult": {
                    "toolUseId": call_id,
                    "content": [text_block(content)],
                    "status": if *is_error { "error" } else { "success" },
                }
            })),
            Message::User { content } => {
                flush(&mut out, &mut pending_results);
                out.push(json!({ "role": "user", "content": [text_block(content)] }));
            }
            Message::Assistant { text, tool_calls } => {
                flush(&mut out, &mut pending_results);
                let mut content = Vec::new();
                if let Some(text) = text.as_deref().filter(|t| !t.is_empty()) {
                    content.push(json!({ "text": text }));
                }
                content.extend(tool_calls.iter().map(|call| {
                    json!({
                        "toolUse": {
                            "toolUseId": call.id,
                            "name": call.name,
                            "input": call.arguments,
                        }
                    })
                }));
                out.push(json!({ "role": "assistant", "content": content }));
            }
        }
    }
    flush(&mut out, &mut pending_results);
    out
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequest {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<Value>,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<Value>,
    inference_config: InferenceConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseResponse {
    output: ConverseOutput,
    stop_reason: String,
    usage: Option<ConverseUsage>,
}

#[derive(Deserialize)]
struct ConverseOutput {
    message: ConverseMessage,
}

#[derive(Deserialize)]
struct ConverseMessage {
    #[serde(default)]
    content: Vec<Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConverseUsage {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_agent_core::ToolSpec;

    #[test]
    fn model_id_is_path_encoded() {
        assert_eq!(
            BedrockClient::converse_path("us.amazon.nova-pro-v1:0"),
            "/model/us.amazon.nova-pro-v1%3A0/converse"
        );
    }

    #[test]
    fn default_endpoint_is_regional() {
        let client = BedrockClient::new("eu-west-1", None, None);
        assert_eq!(
            client.base.endpoint,
            "https://bedrock-runtime.eu-west-1.amazonaws.com"
        );
    }

    #[test]
    fn tool_results_are_grouped_into_one_user_turn() {
        let messages = vec![
            Message::user("grant access"),
            Message::Assistant {
                text: Some("Checking".to_string()),
                tool_calls: vec![
                    ToolCall {
                        id: "a".to_string(),
                        name: "validate_request".to_string(),
                        arguments: json!({}),
                    },
                    ToolCall {
                        id: "b".to_string(),
                        name: "log_action".to_string(),
                        arguments: json!({}),
                    },
                ],
            },
            Message::tool_result("a", "ok", false),
            Message::tool_result("b", "boom", true),
        ];

        let converted = to_converse_messages(&messages);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[1]["content"][1]["toolUse"]["toolUseId"], "a");
        assert_eq!(converted[2]["role"], "user");
        assert_eq!(converted[2]["content"].as_array().map(Vec::len), Some(2));
        assert_eq!(converted[2]["content"][1]["toolResult"]["status"], "error");
    }

    #[test]
    fn empty_text_is_never_sent() {
        let messages = vec![
            Message::user(" "),
            Message::Assistant {
                text: None,
                tool_calls: vec![ToolCall {
                    id: "a".to_string(),
                    name: "list_users".to_string(),
                    arguments: json!({}),
                }],
            },
            Message::tool_result("a", "", false),
        ];

        let converted = to_converse_messages(&messages);
        assert_eq!(converted[0]["content"][0]["text"], EMPTY_TEXT);
        let result = &converted[2]["content"][0]["toolResult"];
        assert_eq!(result["toolUseId"], "a");
        assert_eq!(result["content"][0]["text"], EMPTY_TEXT);
        assert_eq!(result["status"], "success");
    }

    #[test]
    fn tool_config_is_omitted_without_tools() {
        let mut request = ModelRequest {
            model: "m".to_string(),
            system: String::new(),
            messages: vec![Message::user("hi")],
            tools: Vec::new(),
            temperature: 0.3,
            max_tokens: 100,
        };
        let payload = serde_json::to_value(BedrockClient::build_payload(&request)).unwrap();
        assert!(payload.get("toolConfig").is_none());
        assert!(payload.get("system").is_none());
        assert_eq!(payload["inferenceConfig"]["maxTokens"], 100);

        request.tools.push(ToolSpec {
            name: "log_action".to_string(),
            description: String::new(),
            input_schema: json!({"type": "object"}),
        });
        let payload = serde_json::to_value(BedrockClient::build_payload(&request)).unwrap();
        assert_eq!(
            payload["toolConfig"]["tools"][0]["toolSpec"]["description"],
            "log_action"
        );
    }
}
