//! # Action Agent Core
//!
//! Core building blocks shared by every part of the Action Agent:
//!
//! - **Tools**: the [`Tool`] trait and [`ExecutionResult`] returned by every
//!   tool, local or remote
//! - **Registry**: [`InMemoryToolRegistry`] routing model tool calls to tools
//! - **Validation**: the static required-field table for structured requests
//! - **Audit**: [`ActionLogger`] appending one [`ActionRecord`] per operation
//! - **Built-in tools**: `log_action` and `validate_request`, the two
//!   in-process tools exposed to the model
//!
//! ## Example: validating a request
//!
//! ```rust
//! use action_agent_core::validation::validate;
//! use serde_json::json;
//!
//! let fields = json!({"email": "a@b.com", "first_name": "A"});
//! let result = validate("create_user", fields.as_object().unwrap());
//! assert!(result.is_err());
//! ```

pub mod audit;
pub mod builtin;
pub mod registry;
pub mod tool;
pub mod validation;

pub use audit::{
    ActionLogger, ActionRecord, AuditError, AuditSink, JsonLinesSink, MemorySink, StdoutSink,
};
pub use builtin::{LogActionTool, ValidateRequestTool};
pub use registry::{InMemoryToolRegistry, RegistryError, ToolRegistry};
pub use tool::{ExecutionResult, FailureReason, InvalidToolName, Tool, ToolName, ToolSpec};
pub use validation::{Acceptance, RequestValidator, ValidationError};
