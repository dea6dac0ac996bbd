//! Request and response bodies of the task endpoints.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::{Message, Task};

/// Body of `POST /tasks/send`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub message: Message,

    /// Continue an existing task instead of opening a new one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SendMessageRequest {
    pub fn new(message: Message) -> Self {
        Self {
            message,
            task_id: None,
            context_id: None,
            metadata: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub task: Task,
}

/// Body of `POST /tasks/{id}/cancel`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelTaskRequest {
    pub task_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}
