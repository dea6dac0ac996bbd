//! Content parts carried by messages and artifacts.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Part {
    #[serde(rename = "text")]
    Text(TextPart),

    #[serde(rename = "file")]
    File(FilePart),

    #[serde(rename = "data")]
    Data(DataPart),
}

impl Part {
    pub fn text(content: impl Into<String>) -> Self {
        Part::Text(TextPart {
            text: content.into(),
            metadata: HashMap::new(),
        })
    }

    pub fn data(data: serde_json::Value) -> Self {
        Part::Data(DataPart {
            data,
            media_type: "application/json".to_string(),
            metadata: HashMap::new(),
        })
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Part::Text(t) => Some(&t.text),
            _ => None,
        }
    }

    /// Textual rendering used when a message is handed to the model
    pub(crate) fn render(&self) -> Option<String> {
        match self {
            Part::Text(t) => Some(t.text.clone()),
            Part::Data(d) => Some(d.data.to_string()),
            Part::File(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextPart {
    pub text: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Reference to a file by URI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePart {
    pub uri: String,

    pub media_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

/// Structured JSON content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataPart {
    pub data: serde_json::Value,

    #[serde(default = "default_data_media_type")]
    pub media_type: String,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

fn default_data_media_type() -> String {
    "application/json".to_string()
}
