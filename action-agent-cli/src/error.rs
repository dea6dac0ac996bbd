use action_agent_a2a::A2aError;
use action_agent_http::ServeError;
use action_agent_runtime::{AgentError, BootstrapError, ConfigError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("A2A request failed: {0}")]
    A2a(#[from] A2aError),

    #[error("Invalid JSON in --{flag}: {source}")]
    InvalidJson {
        flag: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to render output: {0}")]
    Output(#[source] serde_json::Error),

    /// The request did not pass validation; the report was already printed
    #[error("request is invalid")]
    Invalid,
}
