//! # Action Agent LLM
//!
//! Model provider clients with native tool use.
//!
//! - [`BedrockClient`]: Amazon Bedrock Runtime Converse API, bearer-token auth
//! - [`OpenAiClient`]: OpenAI-compatible chat completions
//! - [`RetryingModelClient`]: exponential backoff for throttling and 5xx
//!
//! Clients are created from a [`ModelConfig`] through [`ProviderFactory`].

pub mod bedrock;
pub mod client;
pub mod factory;
pub mod openai;
pub mod retry;
pub mod types;

pub use bedrock::BedrockClient;
pub use client::{HttpClientBase, ModelClient};
pub use factory::{ModelConfig, ProviderFactory, ProviderKind};
pub use openai::OpenAiClient;
pub use retry::{RetryPolicy, RetryingModelClient};
pub use types::{
    Message, ModelError, ModelRequest, ModelResponse, ModelResult, StopReason, ToolCall, Usage,
};
