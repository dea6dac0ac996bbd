//! # Action Agent MCP
//!
//! Remote Model Context Protocol servers (PingOne, Microsoft Graph, ...)
//! exposed as agent tools.
//!
//! ## Example
//!
//! ```rust,no_run
//! use action_agent_mcp::{McpServerConfig, McpToolProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = McpServerConfig::new("pingone", "http://localhost:8080/mcp");
//!     let provider = McpToolProvider::connect(&config).await?;
//!
//!     for name in provider.tool_names() {
//!         println!("{name}");
//!     }
//!
//!     provider.close().await;
//!     Ok(())
//! }
//! ```

pub mod content;
pub mod error;
pub mod provider;

pub use content::{CallOutcome, RemoteToolInfo};
pub use error::{McpError, McpResult};
pub use provider::{McpServerConfig, McpToolProvider, RemoteTool};
