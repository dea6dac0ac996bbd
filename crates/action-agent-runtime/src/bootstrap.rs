//! Process startup and shutdown.
//!
//! Startup connects every configured MCP server, registers the two local
//! tools followed by the remote ones, and builds the agent. Shutdown closes
//! the MCP sessions.

use crate::agent::ActionAgent;
use crate::config::{AgentConfig, ConfigError};
use crate::handler::{self, ActionAgentHandler};
use action_agent_a2a::AgentCard;
use action_agent_core::{
    ActionLogger, AuditError, InMemoryToolRegistry, JsonLinesSink, LogActionTool, RegistryError,
    ToolRegistry, ValidateRequestTool,
};
use action_agent_llm::{ModelClient, ModelError, ProviderFactory};
use action_agent_mcp::{McpError, McpToolProvider};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to connect to MCP server '{provider}': {source}")]
    ToolProvider {
        provider: String,
        #[source]
        source: McpError,
    },

    #[error("Failed to create model client: {0}")]
    Model(#[from] ModelError),

    #[error("Failed to open audit log: {0}")]
    Audit(#[from] AuditError),

    #[error("Failed to register tool: {0}")]
    Registry(#[from] RegistryError),
}

/// A running Action Agent and the sessions it owns
pub struct ActionAgentRuntime {
    config: AgentConfig,
    agent: Arc<ActionAgent>,
    registry: Arc<InMemoryToolRegistry>,
    providers: Vec<McpToolProvider>,
}

impl ActionAgentRuntime {
    /// Start with the model client described by `config`
    pub async fn start(config: AgentConfig) -> Result<Self, BootstrapError> {
        config.validate()?;
        let model = ProviderFactory::create(&config.model)?;
        Self::start_with_model(config, model).await
    }

    /// Start with an explicit model client
    pub async fn start_with_model(
        config: AgentConfig,
        model: Arc<dyn ModelClient>,
    ) -> Result<Self, BootstrapError> {
        let logger = match &config.audit_log {
            Some(path) => {
                info!(path = %path.display(), "Writing audit records to file");
                ActionLogger::new(JsonLinesSink::open(path)?)
            }
            None => ActionLogger::stdout(),
        };
        Self::assemble(config, model, logger).await
    }

    /// Connect providers and wire everything together.
    ///
    /// Any configured MCP server that cannot be reached aborts startup;
    /// sessions opened before the failure are closed again.
    pub async fn assemble(
        config: AgentConfig,
        model: Arc<dyn ModelClient>,
        logger: ActionLogger,
    ) -> Result<Self, BootstrapError> {
        let mut providers = Vec::new();
        for server in config.mcp_servers() {
            match McpToolProvider::connect(&server).await {
                Ok(provider) => providers.push(provider),
                Err(source) => {
                    error!(provider = %server.name, error = %source, "MCP server unavailable");
                    close_all(&providers).await;
                    return Err(BootstrapError::ToolProvider {
                        provider: server.name,
                        source,
                    });
                }
            }
        }

        let mut registry = InMemoryToolRegistry::new();
        registry.register(Arc::new(LogActionTool::new(logger)))?;
        registry.register(Arc::new(ValidateRequestTool::new()))?;
        for provider in &providers {
            let registered = registry.register_all(provider.tools());
            info!(provider = provider.name(), tools = registered, "Registered remote tools");
        }
        let registry = Arc::new(registry);

        let agent = ActionAgent::new(model, registry.clone(), &config.model)
            .with_max_turns(config.max_turns);

        info!(
            tools = registry.len(),
            names = ?registry.names(),
            model = %config.model.model_id,
            provider = %config.model.provider,
            "Action Agent ready"
        );

        Ok(Self {
            config,
            agent: Arc::new(agent),
            registry,
            providers,
        })
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn agent(&self) -> Arc<ActionAgent> {
        Arc::clone(&self.agent)
    }

    pub fn registry(&self) -> &InMemoryToolRegistry {
        &self.registry
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.registry.names().into_iter().map(String::from).collect()
    }

    pub fn agent_card(&self) -> AgentCard {
        handler::agent_card(&self.config.runtime_url, &self.registry.specs())
    }

    /// A2A handler sharing this runtime's agent
    pub fn a2a_handler(&self) -> ActionAgentHandler {
        ActionAgentHandler::new(self.agent(), self.agent_card())
    }

    /// Close every MCP session
    pub async fn shutdown(self) {
        info!("Shutting down MCP client sessions");
        close_all(&self.providers).await;
        info!("MCP client sessions closed");
    }
}

async fn close_all(providers: &[McpToolProvider]) {
    for provider in providers {
        provider.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedModelClient, tool_call};
    use action_agent_core::MemorySink;
    use action_agent_llm::ModelResponse;
    use serde_json::json;
    use std::time::Duration;

    #[tokio::test]
    async fn local_tools_are_registered_without_mcp_servers() {
        let model = ScriptedModelClient::default();
        let runtime = ActionAgentRuntime::assemble(
            AgentConfig::default(),
            Arc::new(model),
            ActionLogger::new(MemorySink::new()),
        )
        .await
        .unwrap();

        assert_eq!(runtime.tool_names(), vec!["log_action", "validate_request"]);

        let card = runtime.agent_card();
        assert_eq!(card.name, "Action Agent");
        assert_eq!(card.base_url(), Some("http://127.0.0.1:9000/"));
        let skills: Vec<_> = card.skills.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(skills, vec!["log_action", "validate_request"]);

        runtime.shutdown().await;
    }

    #[tokio::test]
    async fn max_turns_comes_from_config() {
        let model = ScriptedModelClient::new([
            ModelResponse::tool_use(vec![tool_call("c1", "validate_request", json!({}))]),
            ModelResponse::text("unreachable"),
        ]);
        let config = AgentConfig {
            max_turns: 1,
            ..Default::default()
        };
        let runtime = ActionAgentRuntime::assemble(
            config,
            Arc::new(model),
            ActionLogger::new(MemorySink::new()),
        )
        .await
        .unwrap();

        let err = runtime.agent().execute("validate").await.unwrap_err();
        assert!(matches!(
            err,
            crate::AgentError::TurnLimitExceeded { max_turns: 1 }
        ));
    }

    #[tokio::test]
    async fn unreachable_mcp_server_aborts_startup() {
        let config = AgentConfig {
            pingone_mcp_url: Some("http://127.0.0.1:9/mcp".to_string()),
            mcp_connect_timeout: Duration::from_secs(5),
            ..Default::default()
        };

        let err = ActionAgentRuntime::start_with_model(
            config,
            Arc::new(ScriptedModelClient::default()),
        )
        .await
        .err()
        .expect("startup should fail");

        match err {
            BootstrapError::ToolProvider { provider, .. } => assert_eq!(provider, "pingone"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn audit_records_go_to_the_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let model = ScriptedModelClient::new([
            ModelResponse::tool_use(vec![tool_call(
                "c1",
                "log_action",
                json!({"action": "create_user", "target": "a@b.com", "result": "success"}),
            )]),
            ModelResponse::text("Logged."),
        ]);
        let config = AgentConfig {
            audit_log: Some(path.clone()),
            ..Default::default()
        };

        let runtime = ActionAgentRuntime::start_with_model(config, Arc::new(model))
            .await
            .unwrap();
        let reply = runtime.agent().execute("Create a@b.com").await.unwrap();
        assert_eq!(reply.text, "Logged.");

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = contents.lines().collect();
        assert_eq!(lines.len(), 1);
        let record: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record["action"], "create_user");
        assert_eq!(record["target"], "a@b.com");
        assert_eq!(record["status"], "success");
    }

    #[tokio::test]
    async fn start_rejects_invalid_config() {
        let config = AgentConfig {
            max_turns: 0,
            ..Default::default()
        };
        let err = ActionAgentRuntime::start(config).await.err().unwrap();
        assert!(matches!(err, BootstrapError::Config(_)));
    }
}
