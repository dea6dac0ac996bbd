//! # Action Agent Runtime
//!
//! Wires the pieces of the Action Agent together:
//!
//! - [`config`]: environment-based configuration
//! - [`agent`]: the model/tool loop behind every inbound channel
//! - [`bootstrap`]: MCP connections, tool registration and shutdown
//! - [`handler`]: the agent exposed as an A2A [`AgentHandler`](action_agent_a2a::AgentHandler)

pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod handler;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use agent::{ActionAgent, AgentReply, SYSTEM_PROMPT};
pub use bootstrap::{ActionAgentRuntime, BootstrapError};
pub use config::{AgentConfig, ConfigError};
pub use error::{AgentError, AgentResult, ErrorKind};
pub use handler::ActionAgentHandler;
