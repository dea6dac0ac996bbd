//! Task outputs.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::Part;

/// Output produced by a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,

    pub parts: Vec<Part>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Artifact {
    fn new(parts: Vec<Part>, media_type: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            parts,
            media_type: Some(media_type.to_string()),
            label: None,
            metadata: HashMap::new(),
        }
    }

    /// Plain-text artifact with a generated id
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(vec![Part::text(content)], "text/plain")
    }

    /// JSON artifact with a generated id
    pub fn json(data: serde_json::Value) -> Self {
        Self::new(vec![Part::data(data)], "application/json")
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}
