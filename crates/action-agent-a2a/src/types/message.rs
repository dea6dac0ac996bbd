//! Messages exchanged within a task.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use super::Part;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub role: Role,

    pub parts: Vec<Part>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl Message {
    fn with_role(role: Role, text: impl Into<String>) -> Self {
        Self {
            id: Some(Uuid::new_v4().to_string()),
            role,
            parts: vec![Part::text(text)],
            timestamp: Some(Utc::now()),
            metadata: HashMap::new(),
        }
    }

    /// A text message from the calling side (a user or a client agent)
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_role(Role::User, text)
    }

    /// A text message from the serving agent
    pub fn agent(text: impl Into<String>) -> Self {
        Self::with_role(Role::Agent, text)
    }

    pub fn with_part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// All text parts joined with newlines.
    ///
    /// Data parts are rendered as compact JSON so structured requests reach
    /// the model verbatim; file parts are skipped.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(Part::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Agent => write!(f, "agent"),
        }
    }
}
