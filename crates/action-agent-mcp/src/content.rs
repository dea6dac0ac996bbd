//! Conversion between rmcp model types and agent tool values.

use rmcp::model::{CallToolRequestParams, CallToolResult, Content, RawContent, Tool as McpTool};
use serde_json::{Value, json};

/// A tool advertised by a remote MCP server.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteToolInfo {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl RemoteToolInfo {
    /// Read a discovered tool. Tools with a blank name are skipped.
    pub fn from_tool(tool: &McpTool) -> Option<Self> {
        let name = tool.name.trim();
        if name.is_empty() {
            return None;
        }

        let input_schema = if tool.input_schema.is_empty() {
            json!({ "type": "object", "properties": {} })
        } else {
            Value::Object(tool.input_schema.as_ref().clone())
        };

        Some(Self {
            name: name.to_string(),
            description: tool.description.as_deref().unwrap_or_default().to_string(),
            input_schema,
        })
    }
}

/// Flattened result of a remote tool call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOutcome {
    pub text: String,
    pub is_error: bool,
}

impl CallOutcome {
    /// Flatten a `CallToolResult` into text.
    ///
    /// Text blocks are joined with newlines; other blocks are kept as JSON.
    /// Structured content is used when no content blocks were returned.
    pub fn from_result(result: &CallToolResult) -> Self {
        let text = if result.content.is_empty() {
            result
                .structured_content
                .as_ref()
                .filter(|v| !v.is_null())
                .map(Value::to_string)
                .unwrap_or_default()
        } else {
            result
                .content
                .iter()
                .map(block_text)
                .collect::<Vec<_>>()
                .join("\n")
        };

        Self {
            text,
            is_error: result.is_error.unwrap_or(false),
        }
    }
}

fn block_text(block: &Content) -> String {
    match &block.raw {
        RawContent::Text(text) => text.text.clone(),
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

/// Build the parameters of a `tools/call` request.
///
/// MCP arguments must be an object; `null` means no arguments.
pub fn call_params(name: &str, arguments: Value) -> Result<CallToolRequestParams, String> {
    let arguments = match arguments {
        Value::Null => None,
        Value::Object(args) => Some(args),
        other => {
            return Err(format!(
                "arguments for '{}' must be a JSON object, got {}",
                name,
                type_name(&other)
            ));
        }
    };

    Ok(CallToolRequestParams {
        meta: None,
        name: name.to_string().into(),
        arguments,
        task: None,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
