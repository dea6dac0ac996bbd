//! # Action Agent A2A
//!
//! Agent2Agent (A2A) protocol support: the data types, an HTTP server that
//! exposes an agent to other agents, and a client for delegating work to
//! one.
//!
//! ## Example: describing an agent
//!
//! ```rust
//! use action_agent_a2a::{AgentCard, AgentSkill};
//!
//! let card = AgentCard::new("action-agent", "Action Agent", "http://127.0.0.1:9000/")
//!     .with_description("Executes identity & access operations")
//!     .with_version("1.0.0")
//!     .with_skill(AgentSkill::new("validate_request", "validate_request"));
//!
//! assert_eq!(card.skills.len(), 1);
//! ```
//!
//! ## Example: task lifecycle
//!
//! ```rust
//! use action_agent_a2a::{Message, Task, TaskStatus};
//!
//! let mut task = Task::new("task-001");
//! task.add_message(Message::user("Create user a@b.com"));
//! assert_eq!(task.status, TaskStatus::Working);
//!
//! task.add_message(Message::agent("User created: u-123"));
//! task.set_status(TaskStatus::Completed);
//! assert!(task.is_terminal());
//! ```

pub mod error;
pub mod types;

#[cfg(feature = "client")]
pub mod client;

#[cfg(feature = "server")]
pub mod server;

pub use error::{A2aError, A2aResult, ErrorResponse};
pub use types::*;

#[cfg(feature = "client")]
pub use client::{A2aClient, AuthConfig};

#[cfg(feature = "server")]
pub use server::{A2aErrorResponse, A2aServer, AgentHandler, TaskStoreConfig};
