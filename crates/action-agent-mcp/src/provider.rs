//! Remote MCP servers exposed as agent tools.
//!
//! Each [`McpToolProvider`] owns one client session to an MCP server. The
//! session is opened once, initialized, and its tool list discovered; every
//! discovered tool is wrapped in a [`RemoteTool`] that shares the session, so
//! connections are reused across calls.

use crate::content::{self, CallOutcome, RemoteToolInfo};
use crate::error::{McpError, McpResult};
use action_agent_core::tool::{ExecutionResult, Tool};
use async_trait::async_trait;
use rmcp::ServiceExt;
use rmcp::model::{ClientInfo, Implementation};
use rmcp::service::{Peer, RoleClient, RunningService};
use rmcp::transport::{IntoTransport, StreamableHttpClientTransport};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

/// Where and how to reach one MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpServerConfig {
    /// Provider name used in logs and failure reasons, e.g. `pingone`
    pub name: String,
    /// Streamable HTTP endpoint
    pub url: String,
    pub connect_timeout: Duration,
    pub call_timeout: Duration,
}

impl McpServerConfig {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }
}

fn client_info() -> ClientInfo {
    ClientInfo {
        client_info: Implementation {
            name: env!("CARGO_PKG_NAME").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            ..Default::default()
        },
        ..Default::default()
    }
}

/// An open session to one MCP server and the tools it advertises.
pub struct McpToolProvider {
    name: String,
    tools: Vec<Arc<RemoteTool>>,
    service: Mutex<Option<RunningService<RoleClient, ClientInfo>>>,
}

impl McpToolProvider {
    /// Connect over streamable HTTP, initialize, and discover tools.
    pub async fn connect(config: &McpServerConfig) -> McpResult<Self> {
        info!(provider = %config.name, url = %config.url, "Connecting to MCP server");
        let transport = StreamableHttpClientTransport::from_uri(config.url.as_str());
        Self::connect_with_transport(
            &config.name,
            transport,
            config.connect_timeout,
            config.call_timeout,
        )
        .await
    }

    /// Connect over any rmcp transport.
    pub async fn connect_with_transport<T, E, A>(
        name: &str,
        transport: T,
        connect_timeout: Duration,
        call_timeout: Duration,
    ) -> McpResult<Self>
    where
        T: IntoTransport<RoleClient, E, A>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let handshake = async {
            let service = client_info()
                .serve(transport)
                .await
                .map_err(|e| McpError::ConnectionError(e.to_string()))?;
            let tools = service
                .peer()
                .list_all_tools()
                .await
                .map_err(|e| McpError::ProtocolError(format!("tools/list failed: {}", e)))?;
            Ok::<_, McpError>((service, tools))
        };

        let (service, listed) = tokio::time::timeout(connect_timeout, handshake)
            .await
            .map_err(|_| McpError::Timeout(format!("connecting to MCP server '{}'", name)))??;

        let peer = service.peer().clone();
        let mut tools = Vec::with_capacity(listed.len());
        for tool in &listed {
            match RemoteToolInfo::from_tool(tool) {
                Some(info) => tools.push(Arc::new(RemoteTool {
                    provider: name.to_string(),
                    info,
                    peer: peer.clone(),
                    call_timeout,
                })),
                None => warn!(provider = name, "Ignoring MCP tool without a name"),
            }
        }

        info!(provider = name, tools = tools.len(), "Connected to MCP server");

        Ok(Self {
            name: name.to_string(),
            tools,
            service: Mutex::new(Some(service)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Every discovered tool, ready for registration.
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools
            .iter()
            .map(|t| Arc::clone(t) as Arc<dyn Tool>)
            .collect()
    }

    pub fn tool_names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.info.name.as_str()).collect()
    }

    /// Cancel the session. Calls made afterwards fail with a network error.
    pub async fn close(&self) {
        let Some(service) = self.service.lock().await.take() else {
            return;
        };
        match service.cancel().await {
            Ok(reason) => info!(provider = %self.name, ?reason, "MCP session closed"),
            Err(e) => warn!(provider = %self.name, error = %e, "MCP session did not shut down cleanly"),
        }
    }

    pub async fn is_closed(&self) -> bool {
        self.service.lock().await.is_none()
    }
}

impl std::fmt::Debug for McpToolProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpToolProvider")
            .field("name", &self.name)
            .field("tools", &self.tool_names())
            .finish_non_exhaustive()
    }
}

/// A tool hosted on a remote MCP server.
pub struct RemoteTool {
    provider: String,
    info: RemoteToolInfo,
    peer: Peer<RoleClient>,
    call_timeout: Duration,
}

impl RemoteTool {
    pub fn provider(&self) -> &str {
        &self.provider
    }

    fn failure(&self, error: McpError) -> ExecutionResult {
        warn!(
            provider = %self.provider,
            tool = %self.info.name,
            error = %error,
            "Remote tool call failed"
        );
        ExecutionResult::failed(error.to_failure_reason(&self.provider))
    }
}

#[async_trait]
impl Tool for RemoteTool {
    fn name(&self) -> &str {
        &self.info.name
    }

    fn description(&self) -> &str {
        &self.info.description
    }

    fn input_schema(&self) -> Value {
        self.info.input_schema.clone()
    }

    async fn call(&self, input: Value) -> ExecutionResult {
        let params = match content::call_params(&self.info.name, input) {
            Ok(params) => params,
            Err(message) => return ExecutionResult::invalid_input(message),
        };

        debug!(provider = %self.provider, tool = %self.info.name, "Calling remote tool");

        let result = match tokio::time::timeout(self.call_timeout, self.peer.call_tool(params)).await
        {
            Err(_) => {
                return self.failure(McpError::Timeout(format!("tools/call {}", self.info.name)));
            }
            Ok(Err(e)) => return self.failure(McpError::from_service_error(e)),
            Ok(Ok(result)) => result,
        };

        let outcome = CallOutcome::from_result(&result);

        if outcome.is_error {
            self.failure(McpError::ClientError(outcome.text))
        } else {
            ExecutionResult::success(outcome.text)
        }
    }
}
