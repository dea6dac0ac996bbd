//! HTTP handlers, one module per channel

pub mod action_group;
pub mod health;
pub mod invocations;
pub mod validate;

pub use action_group::invoke_action_group;
pub use health::ping;
pub use invocations::invoke;
pub use validate::validate_request;

use action_agent_runtime::ActionAgent;
use std::sync::Arc;

/// State shared by the agent-facing handlers
#[derive(Debug, Clone)]
pub struct AppState {
    pub agent: Arc<ActionAgent>,
}
