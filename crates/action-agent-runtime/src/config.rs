//! # Environment-Based Configuration
//!
//! Everything the Action Agent needs at startup is read from environment
//! variables (optionally seeded from a `.env` file by the binary).
//!
//! ## Model
//! - `MODEL_PROVIDER` - `bedrock` or `openai` (default: bedrock)
//! - `MODEL_ID` - model identifier (default: `us.amazon.nova-pro-v1:0`)
//! - `MODEL_TEMPERATURE` - 0.0 to 2.0 (default: 0.3)
//! - `MODEL_MAX_TOKENS` - response token limit (default: 4096)
//! - `MODEL_ENDPOINT` - base URL override for the provider
//! - `MODEL_API_KEY` - API key for OpenAI-compatible providers (falls back to `OPENAI_API_KEY`)
//! - `AWS_REGION` - Bedrock region (default: us-east-1)
//! - `AWS_BEARER_TOKEN_BEDROCK` - Bedrock API key
//!
//! ## Tool providers
//! - `PINGONE_MCP_URL` - PingOne MCP server (streamable HTTP)
//! - `MSGRAPH_MCP_URL` - Microsoft Graph MCP server (streamable HTTP)
//! - `MCP_CONNECT_TIMEOUT_SECS` - connect and discovery timeout (default: 30)
//!
//! ## Serving
//! - `AGENTCORE_RUNTIME_URL` - public URL advertised in the agent card (default: `http://127.0.0.1:9000/`)
//! - `ACTION_AGENT_HOST` - listen host (default: 0.0.0.0)
//! - `ACTION_AGENT_PORT` - listen port (default: 9000)
//! - `ACTION_AGENT_MAX_TURNS` - model round trips per instruction (default: 16)
//! - `ACTION_AGENT_AUDIT_LOG` - JSON-lines audit file; audit lines go to stdout when unset
//! - `ACTION_AGENT_REQUEST_TIMEOUT_SECS` - HTTP request timeout (default: 300)

use action_agent_llm::{ModelConfig, ProviderKind};
use action_agent_mcp::McpServerConfig;
use std::{env, path::PathBuf, time::Duration};

pub const DEFAULT_RUNTIME_URL: &str = "http://127.0.0.1:9000/";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 9000;
pub const DEFAULT_MAX_TURNS: usize = 16;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 300;
pub const DEFAULT_MCP_CONNECT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid environment variable '{key}': {message}")]
    InvalidEnvVar { key: String, message: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Complete startup configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub model: ModelConfig,
    pub pingone_mcp_url: Option<String>,
    pub msgraph_mcp_url: Option<String>,
    pub mcp_connect_timeout: Duration,
    pub runtime_url: String,
    pub host: String,
    pub port: u16,
    pub max_turns: usize,
    pub audit_log: Option<PathBuf>,
    pub request_timeout: Duration,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            pingone_mcp_url: None,
            msgraph_mcp_url: None,
            mcp_connect_timeout: Duration::from_secs(DEFAULT_MCP_CONNECT_TIMEOUT_SECS),
            runtime_url: DEFAULT_RUNTIME_URL.to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_turns: DEFAULT_MAX_TURNS,
            audit_log: None,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl AgentConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if any variable has an invalid value or the
    /// resulting configuration fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(provider) = get_env_string("MODEL_PROVIDER") {
            config.model.provider = provider.parse::<ProviderKind>().map_err(|e| {
                ConfigError::InvalidEnvVar {
                    key: "MODEL_PROVIDER".to_string(),
                    message: e.to_string(),
                }
            })?;
        }
        if let Some(model_id) = get_env_string("MODEL_ID") {
            config.model.model_id = model_id;
        }
        if let Some(temperature) = get_env_f32("MODEL_TEMPERATURE")? {
            config.model.temperature = temperature;
        }
        if let Some(max_tokens) = get_env_u32("MODEL_MAX_TOKENS")? {
            config.model.max_tokens = max_tokens;
        }
        config.model.endpoint = get_env_string("MODEL_ENDPOINT");
        if let Some(region) = get_env_string("AWS_REGION") {
            config.model.region = region;
        }
        config.model.api_key = match config.model.provider {
            ProviderKind::Bedrock => get_env_string("AWS_BEARER_TOKEN_BEDROCK")
                .or_else(|| get_env_string("MODEL_API_KEY")),
            ProviderKind::OpenAi => {
                get_env_string("MODEL_API_KEY").or_else(|| get_env_string("OPENAI_API_KEY"))
            }
        };

        config.pingone_mcp_url = get_env_string("PINGONE_MCP_URL");
        config.msgraph_mcp_url = get_env_string("MSGRAPH_MCP_URL");
        if let Some(secs) = get_env_u64("MCP_CONNECT_TIMEOUT_SECS")? {
            config.mcp_connect_timeout = Duration::from_secs(secs);
        }

        if let Some(url) = get_env_string("AGENTCORE_RUNTIME_URL") {
            config.runtime_url = url;
        }
        if let Some(host) = get_env_string("ACTION_AGENT_HOST") {
            config.host = host;
        }
        if let Some(port) = get_env_u16("ACTION_AGENT_PORT")? {
            config.port = port;
        }
        if let Some(max_turns) = get_env_usize("ACTION_AGENT_MAX_TURNS")? {
            config.max_turns = max_turns;
        }
        config.audit_log = get_env_string("ACTION_AGENT_AUDIT_LOG").map(PathBuf::from);
        if let Some(secs) = get_env_u64("ACTION_AGENT_REQUEST_TIMEOUT_SECS")? {
            config.request_timeout = Duration::from_secs(secs);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check value ranges and URLs
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ConfigError::ValidationError(format!(
                "model temperature must be between 0.0 and 2.0, got {}",
                self.model.temperature
            )));
        }
        if self.model.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "model max_tokens must be greater than 0".to_string(),
            ));
        }
        if self.model.model_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model id cannot be empty".to_string(),
            ));
        }
        if self.max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "max_turns must be greater than 0".to_string(),
            ));
        }
        if self.mcp_connect_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "MCP connect timeout must be greater than 0".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::ValidationError(
                "request timeout must be greater than 0".to_string(),
            ));
        }

        check_url("runtime_url", &self.runtime_url)?;
        if let Some(url) = &self.pingone_mcp_url {
            check_url("PINGONE_MCP_URL", url)?;
        }
        if let Some(url) = &self.msgraph_mcp_url {
            check_url("MSGRAPH_MCP_URL", url)?;
        }
        if let Some(url) = &self.model.endpoint {
            check_url("MODEL_ENDPOINT", url)?;
        }

        Ok(())
    }

    /// Configured MCP servers, PingOne first
    pub fn mcp_servers(&self) -> Vec<McpServerConfig> {
        [
            ("pingone", &self.pingone_mcp_url),
            ("msgraph", &self.msgraph_mcp_url),
        ]
        .into_iter()
        .filter_map(|(name, url)| {
            url.as_ref().map(|url| {
                McpServerConfig::new(name, url.as_str())
                    .with_connect_timeout(self.mcp_connect_timeout)
            })
        })
        .collect()
    }

    /// `host:port` to bind
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn check_url(name: &str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value).map(|_| ()).map_err(|e| {
        ConfigError::ValidationError(format!("{name} is not a valid URL '{value}': {e}"))
    })
}

// Environment variable helper functions

/// Blank values count as unset so `.env` templates can leave keys empty.
fn get_env_string(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_env<T>(key: &str, type_name: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match get_env_string(key) {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvVar {
                key: key.to_string(),
                message: format!("invalid {type_name} value '{val}': {e}"),
            }),
        None => Ok(None),
    }
}

fn get_env_u16(key: &str) -> Result<Option<u16>, ConfigError> {
    parse_env(key, "u16")
}

fn get_env_u32(key: &str) -> Result<Option<u32>, ConfigError> {
    parse_env(key, "u32")
}

fn get_env_u64(key: &str) -> Result<Option<u64>, ConfigError> {
    parse_env(key, "u64")
}

fn get_env_usize(key: &str) -> Result<Option<usize>, ConfigError> {
    parse_env(key, "usize")
}

fn get_env_f32(key: &str) -> Result<Option<f32>, ConfigError> {
    parse_env(key, "f32")
}
