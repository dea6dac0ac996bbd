//! Router assembly and serving

use crate::docs::openapi_spec;
use crate::handlers::{AppState, invoke, invoke_action_group, ping, validate_request};
use action_agent_a2a::{A2aServer, AgentHandler, TaskStoreConfig};
use action_agent_runtime::ActionAgent;
use axum::{
    Router,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

/// Router options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOptions {
    /// Requests running longer than this are answered with 408
    pub request_timeout: Duration,
    pub enable_cors: bool,
    pub enable_openapi: bool,
    pub task_store: TaskStoreConfig,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(300),
            enable_cors: true,
            enable_openapi: true,
            task_store: TaskStoreConfig::default(),
        }
    }
}

impl HttpOptions {
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("Failed to bind to {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Server(#[source] std::io::Error),
}

/// Serves every inbound channel of one agent
pub struct HttpServer<H: AgentHandler> {
    agent: Arc<ActionAgent>,
    handler: H,
}

impl<H: AgentHandler + 'static> HttpServer<H> {
    pub fn new(agent: Arc<ActionAgent>, handler: H) -> Self {
        Self { agent, handler }
    }

    /// Create the router with all endpoints and middleware.
    ///
    /// Also returns the A2A server so the caller can drive task cleanup.
    pub fn into_router(self, options: &HttpOptions) -> (Router, A2aServer<H>) {
        let a2a = A2aServer::with_config(self.handler, options.task_store.clone());

        let agent_routes = Router::new()
            .route("/invocations", post(invoke))
            .route("/action-group", post(invoke_action_group))
            .with_state(AppState { agent: self.agent });

        let mut router = Router::new()
            .route("/ping", get(ping))
            .route("/validate", post(validate_request))
            .merge(agent_routes)
            .merge(a2a.router());

        if options.enable_openapi {
            router = router.route("/openapi.json", get(openapi_spec));
        }

        router = router
            .layer(TimeoutLayer::new(options.request_timeout))
            .layer(TraceLayer::new_for_http());

        if options.enable_cors {
            router = router.layer(CorsLayer::permissive());
        }

        (router, a2a)
    }

    /// Create the router with all endpoints and middleware
    pub fn router(self, options: &HttpOptions) -> Router {
        self.into_router(options).0
    }

    /// Bind `addr` and serve until `shutdown` completes
    pub async fn serve<F>(
        self,
        addr: &str,
        options: &HttpOptions,
        shutdown: F,
    ) -> Result<(), ServeError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener =
            tokio::net::TcpListener::bind(addr)
                .await
                .map_err(|source| ServeError::Bind {
                    addr: addr.to_string(),
                    source,
                })?;

        let card = self.handler.agent_card();
        let (router, a2a) = self.into_router(options);
        let cleanup = a2a.start_cleanup_task();

        info!(
            agent = %card.name,
            version = card.version.as_deref().unwrap_or_default(),
            address = %addr,
            "Action Agent listening"
        );

        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(ServeError::Server);

        cleanup.abort();
        info!("HTTP server stopped");
        result
    }
}
