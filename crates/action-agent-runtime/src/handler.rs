//! The Action Agent served over A2A.

use crate::agent::{ActionAgent, AgentReply};
use crate::error::AgentError;
use action_agent_a2a::{
    AgentCard, AgentHandler, AgentSkill, Artifact, Message, Part, Task, TaskStatus,
};
use action_agent_core::ToolSpec;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tracing::{info, warn};

pub const AGENT_ID: &str = "action-agent";
pub const AGENT_NAME: &str = "Action Agent";
pub const AGENT_DESCRIPTION: &str =
    "Executes identity & access operations via PingOne and Microsoft Graph";
pub const AGENT_VERSION: &str = "1.0.0";

/// Agent card advertising every registered tool as a skill
pub fn agent_card(runtime_url: &str, tools: &[ToolSpec]) -> AgentCard {
    tools.iter().fold(
        AgentCard::new(AGENT_ID, AGENT_NAME, runtime_url)
            .with_description(AGENT_DESCRIPTION)
            .with_version(AGENT_VERSION),
        |card, spec| {
            card.with_skill(
                AgentSkill::new(&spec.name, &spec.name).with_description(&spec.description),
            )
        },
    )
}

/// A structured request carried in a data part:
/// `{"request_type": "...", "data": {...}}`
fn structured_request(message: &Message) -> Option<(String, Map<String, Value>)> {
    message.parts.iter().find_map(|part| match part {
        Part::Data(part) => {
            let request_type = part.data.get("request_type")?.as_str()?.to_string();
            let fields = part.data.get("data")?.as_object()?.clone();
            Some((request_type, fields))
        }
        _ => None,
    })
}

pub struct ActionAgentHandler {
    agent: Arc<ActionAgent>,
    card: AgentCard,
}

impl ActionAgentHandler {
    pub fn new(agent: Arc<ActionAgent>, card: AgentCard) -> Self {
        Self { agent, card }
    }

    fn record_reply(task: &mut Task, reply: AgentReply) {
        let mut artifact = Artifact::text(reply.text.clone())
            .with_label("result")
            .with_metadata("toolCalls", json!(reply.tool_calls))
            .with_metadata("toolFailures", json!(reply.tool_failures));
        if let Some(kind) = reply.failure_kind() {
            artifact = artifact.with_metadata("failureKind", json!(kind.as_str()));
        }
        task.add_artifact(artifact);
        task.add_message(Message::agent(reply.text));
    }
}

#[async_trait]
impl AgentHandler for ActionAgentHandler {
    fn agent_card(&self) -> AgentCard {
        self.card.clone()
    }

    async fn handle_message(&self, task: &mut Task, message: Message) -> Result<(), String> {
        let outcome = match structured_request(&message) {
            Some((request_type, fields)) => {
                info!(task_id = %task.id, request_type, "Structured request received");
                self.agent.execute_request(&request_type, &fields).await
            }
            None => self.agent.execute(&message.text()).await,
        };

        match outcome {
            Ok(reply) => {
                Self::record_reply(task, reply);
                Ok(())
            }
            // Invalid requests are answered, not failed
            Err(e @ AgentError::Validation(_)) => {
                task.add_message(
                    Message::agent(e.to_string())
                        .with_part(Part::data(json!({"valid": false, "error": e.to_string()}))),
                );
                task.set_status(TaskStatus::Rejected);
                Ok(())
            }
            Err(e) => {
                warn!(task_id = %task.id, kind = %e.kind(), error = %e, "Instruction failed");
                Err(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedModelClient, tool_call};
    use action_agent_core::{
        ActionLogger, InMemoryToolRegistry, LogActionTool, MemorySink, ToolRegistry,
        ValidateRequestTool,
    };
    use action_agent_llm::{ModelConfig, ModelResponse};

    fn handler(model: &ScriptedModelClient) -> ActionAgentHandler {
        let registry = InMemoryToolRegistry::new()
            .with_tool(Arc::new(LogActionTool::new(ActionLogger::new(
                MemorySink::new(),
            ))))
            .unwrap()
            .with_tool(Arc::new(ValidateRequestTool::new()))
            .unwrap();
        let card = agent_card("http://127.0.0.1:9000/", &registry.specs());
        let agent = ActionAgent::new(
            Arc::new(model.clone()),
            Arc::new(registry),
            &ModelConfig::default(),
        );
        ActionAgentHandler::new(Arc::new(agent), card)
    }

    #[test]
    fn card_describes_the_agent() {
        let card = handler(&ScriptedModelClient::default()).agent_card();
        assert_eq!(card.agent_id, AGENT_ID);
        assert_eq!(card.version.as_deref(), Some(AGENT_VERSION));
        assert_eq!(card.description.as_deref(), Some(AGENT_DESCRIPTION));
        assert_eq!(card.skills.len(), 2);
    }

    #[tokio::test]
    async fn text_message_produces_result_artifact() {
        let model = ScriptedModelClient::new([
            ModelResponse::tool_use(vec![tool_call(
                "c1",
                "validate_request",
                json!({"request_type": "assign_group", "data": {"user_id": "u1", "group_id": "g1"}}),
            )]),
            ModelResponse::text("Added u1 to g1."),
        ]);
        let mut task = Task::new_with_uuid();

        handler(&model)
            .handle_message(&mut task, Message::user("Add u1 to g1"))
            .await
            .unwrap();

        assert_eq!(task.artifacts.len(), 1);
        assert_eq!(task.artifacts[0].label.as_deref(), Some("result"));
        assert_eq!(task.artifacts[0].metadata["toolCalls"], 1);
        assert_eq!(task.artifacts[0].metadata["toolFailures"], 0);
        assert!(!task.artifacts[0].metadata.contains_key("failureKind"));
        assert_eq!(task.latest_agent_text().as_deref(), Some("Added u1 to g1."));
    }

    #[test]
    fn remote_tool_failure_is_labelled_on_the_artifact() {
        let mut task = Task::new_with_uuid();
        ActionAgentHandler::record_reply(
            &mut task,
            AgentReply {
                text: "PingOne is unavailable.".to_string(),
                tool_calls: 2,
                tool_failures: 1,
            },
        );

        let metadata = &task.artifacts[0].metadata;
        assert_eq!(metadata["toolFailures"], 1);
        assert_eq!(metadata["failureKind"], "tool_provider");
    }

    #[tokio::test]
    async fn invalid_structured_request_is_rejected_without_model_call() {
        let model = ScriptedModelClient::default();
        let mut task = Task::new_with_uuid();
        let message = Message::user("create this user").with_part(Part::data(json!({
            "request_type": "create_user",
            "data": {"email": "a@b.com"}
        })));

        handler(&model)
            .handle_message(&mut task, message)
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::Rejected);
        assert!(model.requests().is_empty());
        let text = task.latest_agent_text().unwrap_or_default();
        assert!(text.contains("first_name"), "{text}");
    }

    #[tokio::test]
    async fn model_failure_is_reported_as_error() {
        let model = ScriptedModelClient::default();
        let mut task = Task::new_with_uuid();

        let err = handler(&model)
            .handle_message(&mut task, Message::user("anything"))
            .await
            .unwrap_err();
        assert!(err.starts_with("Model failure"), "{err}");
        assert!(task.artifacts.is_empty());
    }
}
