//! A2A protocol data types
//!
//! - [`task`] - task lifecycle and status
//! - [`message`] - messages and sender roles
//! - [`part`] - text, file and data content parts
//! - [`artifact`] - task outputs
//! - [`agent_card`] - capability discovery
//! - [`request`] - bodies of the task endpoints

mod agent_card;
mod artifact;
mod message;
mod part;
mod request;
mod task;

pub use agent_card::{AgentCapabilities, AgentCard, AgentInterface, AgentProvider, AgentSkill};
pub use artifact::Artifact;
pub use message::{Message, Role};
pub use part::{DataPart, FilePart, Part, TextPart};
pub use request::{CancelTaskRequest, SendMessageRequest, SendMessageResponse};
pub use task::{Task, TaskStatus};
