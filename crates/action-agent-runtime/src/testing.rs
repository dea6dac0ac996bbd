//! Scripted model client for tests
//!
//! Replays a fixed sequence of model responses and records every request,
//! so the tool loop can be exercised without a model provider.

use action_agent_llm::{ModelClient, ModelError, ModelRequest, ModelResponse, ToolCall};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

/// Clones share the same script and request log.
#[derive(Debug, Clone, Default)]
pub struct ScriptedModelClient {
    script: Arc<Mutex<VecDeque<Result<ModelResponse, ModelError>>>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl ScriptedModelClient {
    pub fn new(responses: impl IntoIterator<Item = ModelResponse>) -> Self {
        let client = Self::default();
        for response in responses {
            client.push(Ok(response));
        }
        client
    }

    /// Queue one more outcome
    pub fn push(&self, outcome: Result<ModelResponse, ModelError>) {
        lock(&self.script).push_back(outcome);
    }

    /// Every request received so far
    pub fn requests(&self) -> Vec<ModelRequest> {
        lock(&self.requests).clone()
    }

    pub fn remaining(&self) -> usize {
        lock(&self.script).len()
    }
}

#[async_trait]
impl ModelClient for ScriptedModelClient {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        lock(&self.requests).push(request);
        lock(&self.script)
            .pop_front()
            .unwrap_or_else(|| Err(ModelError::invalid_response("scripted", "script exhausted")))
    }
}

/// A tool call with a deterministic id
pub fn tool_call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}
