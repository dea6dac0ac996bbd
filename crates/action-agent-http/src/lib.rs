//! # Action Agent HTTP
//!
//! Serves every inbound channel of the Action Agent from one axum router:
//!
//! | Route | Channel |
//! |---|---|
//! | `GET /ping` | liveness probe |
//! | `POST /invocations` | cloud agent runtime |
//! | `POST /action-group` | REST action-group function calls |
//! | `POST /validate` | offline request validation |
//! | `GET /openapi.json` | interface description |
//! | `/.well-known/agent.json`, `/tasks/*` | A2A |
//!
//! ```rust,no_run
//! use action_agent_http::{HttpOptions, HttpServer, shutdown_signal};
//! use action_agent_runtime::{ActionAgentRuntime, AgentConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let runtime = ActionAgentRuntime::start(AgentConfig::from_env()?).await?;
//! let server = HttpServer::new(runtime.agent(), runtime.a2a_handler());
//! server
//!     .serve(&runtime.config().listen_addr(), &HttpOptions::default(), shutdown_signal())
//!     .await?;
//! runtime.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod docs;
pub mod error;
pub mod handlers;
pub mod router;
pub mod shutdown;
pub mod types;

pub use docs::openapi;
pub use error::{ApiError, ErrorCode, ErrorResponse};
pub use router::{HttpOptions, HttpServer, ServeError};
pub use shutdown::shutdown_signal;
