//! The Action Agent: one model, a set of tools, and the loop between them.
//!
//! An instruction is sent to the model together with the system prompt and
//! the specs of every registered tool. While the model answers with tool
//! calls, the calls are dispatched through the registry and their results
//! fed back. The first answer without tool calls is the reply.

use crate::error::{AgentError, AgentResult, ErrorKind};
use action_agent_core::{ExecutionResult, RequestValidator, ToolRegistry};
use action_agent_llm::{Message, ModelClient, ModelConfig, ModelRequest, ToolCall};
use futures::future::join_all;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

pub use crate::config::DEFAULT_MAX_TURNS;

pub const SYSTEM_PROMPT: &str = "\
You are the Action Agent in an identity & access management system.
- You receive structured requests (and conversational context) from a Chat Agent.
- Use PingOne MCP tools for identity, auth, groups, and policies.
- Use Microsoft Graph MCP tools for Microsoft 365 user and group operations.
- Always validate requests with validate_request before making changes.
- Always log important actions with log_action.
- Return clear, concise results including any important IDs (user IDs, group IDs, etc.).
- If a request is invalid, respond with a structured error message instead of guessing.";

/// Final answer for one instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AgentReply {
    pub text: String,
    /// Number of tool calls dispatched while producing the answer
    pub tool_calls: usize,
    /// Tool calls that failed in a remote tool provider
    pub tool_failures: usize,
}

impl AgentReply {
    /// [`ErrorKind::ToolProvider`] when a remote tool provider failed along
    /// the way. The reply text is still the model's final answer.
    pub fn failure_kind(&self) -> Option<ErrorKind> {
        (self.tool_failures > 0).then_some(ErrorKind::ToolProvider)
    }
}

pub struct ActionAgent {
    model: Arc<dyn ModelClient>,
    tools: Arc<dyn ToolRegistry>,
    model_id: String,
    temperature: f32,
    max_tokens: u32,
    max_turns: usize,
    system_prompt: String,
}

impl ActionAgent {
    pub fn new(
        model: Arc<dyn ModelClient>,
        tools: Arc<dyn ToolRegistry>,
        model_config: &ModelConfig,
    ) -> Self {
        Self {
            model,
            tools,
            model_id: model_config.model_id.clone(),
            temperature: model_config.temperature,
            max_tokens: model_config.max_tokens,
            max_turns: DEFAULT_MAX_TURNS,
            system_prompt: SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns.max(1);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn tools(&self) -> &Arc<dyn ToolRegistry> {
        &self.tools
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Run one natural-language instruction to completion.
    ///
    /// Tool failures are handed back to the model as error results rather
    /// than aborting the run; remote ones are counted on the reply. Only
    /// model failures and the turn bound end the run early.
    pub async fn execute(&self, instruction: &str) -> AgentResult<AgentReply> {
        let instruction = instruction.trim();
        if instruction.is_empty() {
            return Err(AgentError::EmptyInstruction);
        }

        let specs = self.tools.specs();
        let mut messages = vec![Message::user(instruction)];
        let mut tool_calls = 0;
        let mut tool_failures = 0;

        info!(model = %self.model_id, tools = specs.len(), "Executing instruction");

        for turn in 1..=self.max_turns {
            let request = ModelRequest {
                model: self.model_id.clone(),
                system: self.system_prompt.clone(),
                messages: messages.clone(),
                tools: specs.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            };

            let response = self.model.chat(request).await?;

            if !response.wants_tools() {
                let text = response.text.unwrap_or_default();
                info!(turns = turn, tool_calls, tool_failures, "Instruction completed");
                return Ok(AgentReply {
                    text,
                    tool_calls,
                    tool_failures,
                });
            }

            debug!(
                turn,
                requested = response.tool_calls.len(),
                "Model requested tool calls"
            );
            messages.push(response.to_message());

            let calls = response.tool_calls.iter().map(|call| self.run_tool(call));
            let results = join_all(calls).await;
            tool_calls += results.len();
            for (message, remote_failure) in results {
                tool_failures += usize::from(remote_failure);
                messages.push(message);
            }
        }

        warn!(max_turns = self.max_turns, "Turn limit exceeded");
        Err(AgentError::TurnLimitExceeded {
            max_turns: self.max_turns,
        })
    }

    /// Validate a structured request, then execute it.
    ///
    /// Invalid requests fail before the model or any tool provider is
    /// contacted.
    pub async fn execute_request(
        &self,
        request_type: &str,
        fields: &Map<String, Value>,
    ) -> AgentResult<AgentReply> {
        RequestValidator.validate(request_type, fields)?;
        self.execute(&render_request(request_type, fields)).await
    }

    /// Run several independent instructions concurrently.
    ///
    /// Results come back in input order.
    pub async fn execute_many<I, S>(&self, instructions: I) -> Vec<AgentResult<AgentReply>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let instructions: Vec<S> = instructions.into_iter().collect();
        join_all(instructions.iter().map(|i| self.execute(i.as_ref()))).await
    }

    /// Dispatch one call. The flag is set when a remote provider failed.
    async fn run_tool(&self, call: &ToolCall) -> (Message, bool) {
        let result = self.tools.dispatch(&call.name, call.arguments.clone()).await;
        let remote_failure = match &result {
            ExecutionResult::Success { .. } => {
                debug!(tool = %call.name, "Tool call succeeded");
                false
            }
            ExecutionResult::Failure { reason } => {
                warn!(tool = %call.name, reason = %reason, "Tool call failed");
                reason.is_remote()
            }
        };
        let message = Message::tool_result(&call.id, result.output(), result.is_failure());
        (message, remote_failure)
    }
}

impl std::fmt::Debug for ActionAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionAgent")
            .field("model", &self.model.id())
            .field("model_id", &self.model_id)
            .field("max_turns", &self.max_turns)
            .finish_non_exhaustive()
    }
}

/// Instruction text for an already validated structured request
pub fn render_request(request_type: &str, fields: &Map<String, Value>) -> String {
    format!(
        "Execute this {} request. It has already passed validation.\n{}",
        request_type,
        Value::Object(fields.clone())
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::testing::{ScriptedModelClient, tool_call};
    use action_agent_core::{
        ActionLogger, FailureReason, InMemoryToolRegistry, LogActionTool, MemorySink, Tool,
        ValidateRequestTool,
    };
    use action_agent_llm::{ModelError, ModelResponse};
    use async_trait::async_trait;
    use serde_json::json;

    /// Remote tool whose provider cannot be reached
    struct UnreachableTool;

    #[async_trait]
    impl Tool for UnreachableTool {
        fn name(&self) -> &str {
            "list_users"
        }

        fn description(&self) -> &str {
            "List directory users"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object"})
        }

        async fn call(&self, _input: Value) -> ExecutionResult {
            ExecutionResult::failed(FailureReason::NetworkError {
                message: "pingone: connection refused".to_string(),
            })
        }
    }

    fn agent(model: &ScriptedModelClient, sink: &MemorySink) -> ActionAgent {
        let registry = InMemoryToolRegistry::new()
            .with_tool(Arc::new(LogActionTool::new(ActionLogger::new(sink.clone()))))
            .unwrap()
            .with_tool(Arc::new(ValidateRequestTool::new()))
            .unwrap();
        ActionAgent::new(
            Arc::new(model.clone()),
            Arc::new(registry),
            &ModelConfig::default(),
        )
    }

    #[tokio::test]
    async fn plain_answer_is_relayed() {
        let model = ScriptedModelClient::new([ModelResponse::text("Nothing to do.")]);
        let sink = MemorySink::new();

        let reply = agent(&model, &sink).execute("  hello  ").await.unwrap();
        assert_eq!(reply.text, "Nothing to do.");
        assert_eq!(reply.tool_calls, 0);
        assert_eq!(reply.failure_kind(), None);

        let requests = model.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system, SYSTEM_PROMPT);
        assert_eq!(requests[0].messages, vec![Message::user("hello")]);
        let names: Vec<_> = requests[0].tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["log_action", "validate_request"]);
    }

    #[tokio::test]
    async fn tool_calls_are_dispatched_and_fed_back() {
        let model = ScriptedModelClient::new([
            ModelResponse::tool_use(vec![
                tool_call(
                    "c1",
                    "validate_request",
                    json!({"request_type": "create_user", "data": {"email": "a@b.com"}}),
                ),
                tool_call(
                    "c2",
                    "log_action",
                    json!({"action": "create_user", "target": "a@b.com", "result": "failure"}),
                ),
            ]),
            ModelResponse::text("Request invalid: missing first_name, last_name"),
        ]);
        let sink = MemorySink::new();

        let reply = agent(&model, &sink)
            .execute("Create user a@b.com")
            .await
            .unwrap();
        assert_eq!(reply.tool_calls, 2);
        assert!(reply.text.starts_with("Request invalid"));

        let second = &model.requests()[1];
        assert_eq!(second.messages.len(), 4);
        match &second.messages[2] {
            Message::ToolResult {
                call_id,
                content,
                is_error,
            } => {
                assert_eq!(call_id, "c1");
                assert!(!is_error);
                let report: Value = serde_json::from_str(content).unwrap();
                assert_eq!(report["valid"], false);
                assert_eq!(report["error"], "Missing fields: first_name, last_name");
            }
            other => panic!("expected a tool result, got {other:?}"),
        }
        assert_eq!(
            second.messages[3],
            Message::tool_result("c2", "Logged: create_user on a@b.com: failure", false)
        );

        let records = sink.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].status, "failure");
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_to_the_model() {
        let model = ScriptedModelClient::new([
            ModelResponse::tool_use(vec![tool_call("c1", "delete_tenant", json!({}))]),
            ModelResponse::text("That tool is not available."),
        ]);
        let sink = MemorySink::new();

        let reply = agent(&model, &sink).execute("Delete everything").await.unwrap();
        assert_eq!(reply.tool_calls, 1);
        assert_eq!(reply.tool_failures, 0);

        match &model.requests()[1].messages[2] {
            Message::ToolResult {
                call_id, is_error, ..
            } => {
                assert_eq!(call_id, "c1");
                assert!(*is_error);
            }
            other => panic!("expected a tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn remote_tool_failure_is_reported_on_the_reply() {
        let model = ScriptedModelClient::new([
            ModelResponse::tool_use(vec![
                tool_call("c1", "list_users", json!({})),
                tool_call("c2", "validate_request", json!({})),
            ]),
            ModelResponse::text("PingOne is unavailable, nothing was changed."),
        ]);
        let sink = MemorySink::new();
        let registry = InMemoryToolRegistry::new()
            .with_tool(Arc::new(UnreachableTool))
            .unwrap()
            .with_tool(Arc::new(ValidateRequestTool::new()))
            .unwrap();
        let agent = ActionAgent::new(
            Arc::new(model.clone()),
            Arc::new(registry),
            &ModelConfig::default(),
        );

        let reply = agent.execute("List users").await.unwrap();
        assert_eq!(reply.tool_calls, 2);
        assert_eq!(reply.tool_failures, 1);
        assert_eq!(reply.failure_kind(), Some(ErrorKind::ToolProvider));
        assert!(reply.text.contains("unavailable"));
        assert!(sink.records().is_empty());

        match &model.requests()[1].messages[2] {
            Message::ToolResult {
                call_id, is_error, ..
            } => {
                assert_eq!(call_id, "c1");
                assert!(*is_error);
            }
            other => panic!("expected a tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn turn_limit_is_enforced() {
        let looping =
            || ModelResponse::tool_use(vec![tool_call("c", "validate_request", json!({}))]);
        let model = ScriptedModelClient::new([looping(), looping(), looping()]);
        let sink = MemorySink::new();

        let err = agent(&model, &sink)
            .with_max_turns(2)
            .execute("loop forever")
            .await
            .unwrap_err();

        assert!(matches!(err, AgentError::TurnLimitExceeded { max_turns: 2 }));
        assert_eq!(err.kind(), ErrorKind::Model);
        assert_eq!(model.remaining(), 1);
    }

    #[tokio::test]
    async fn model_failure_surfaces_as_model_error() {
        let model = ScriptedModelClient::default();
        model.push(Err(ModelError::status("bedrock", 500, "boom")));
        let sink = MemorySink::new();

        let err = agent(&model, &sink).execute("hi").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Model);
    }

    #[tokio::test]
    async fn empty_instruction_never_reaches_the_model() {
        let model = ScriptedModelClient::default();
        let sink = MemorySink::new();

        let err = agent(&model, &sink).execute("   ").await.unwrap_err();
        assert!(matches!(err, AgentError::EmptyInstruction));
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn invalid_structured_request_fails_before_any_call() {
        let model = ScriptedModelClient::default();
        let sink = MemorySink::new();
        let fields = json!({"email": "a@b.com", "first_name": "A"});

        let err = agent(&model, &sink)
            .execute_request("create_user", fields.as_object().unwrap())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.to_string(), "Validation failed: Missing fields: last_name");
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn valid_structured_request_is_rendered_for_the_model() {
        let model = ScriptedModelClient::new([ModelResponse::text("Created u-1")]);
        let sink = MemorySink::new();
        let fields = json!({"email": "a@b.com", "first_name": "A", "last_name": "B"});

        let reply = agent(&model, &sink)
            .execute_request("create_user", fields.as_object().unwrap())
            .await
            .unwrap();
        assert_eq!(reply.text, "Created u-1");

        match &model.requests()[0].messages[0] {
            Message::User { content } => {
                assert!(content.contains("create_user"));
                assert!(content.contains("\"last_name\":\"B\""));
            }
            other => panic!("expected a user message, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn execute_many_keeps_input_order() {
        let model = ScriptedModelClient::new([
            ModelResponse::text("done"),
            ModelResponse::text("done"),
        ]);
        let sink = MemorySink::new();

        let results = agent(&model, &sink)
            .execute_many(["grant access", "", "assign group"])
            .await;

        assert_eq!(results.len(), 3);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(AgentError::EmptyInstruction)));
        assert!(results[2].is_ok());
        assert_eq!(model.requests().len(), 2);
    }
}
