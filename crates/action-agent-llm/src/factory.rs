//! Provider factory - creates clients from configuration

use crate::bedrock::{BedrockClient, DEFAULT_REGION};
use crate::client::ModelClient;
use crate::openai::OpenAiClient;
use crate::retry::{RetryPolicy, RetryingModelClient};
use crate::types::ModelError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub const DEFAULT_MODEL_ID: &str = "us.amazon.nova-pro-v1:0";
pub const DEFAULT_TEMPERATURE: f32 = 0.3;
pub const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Supported model providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProviderKind {
    #[default]
    Bedrock,
    OpenAi,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Bedrock => "bedrock",
            ProviderKind::OpenAi => "openai",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = ModelError;

    /// Accepts the provider names commonly used for OpenAI-compatible servers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bedrock" | "aws" | "amazon" => Ok(ProviderKind::Bedrock),
            "openai" | "openai-compatible" | "ollama" | "vllm" | "litellm" => {
                Ok(ProviderKind::OpenAi)
            }
            other => Err(ModelError::provider_not_found(other)),
        }
    }
}

/// Everything needed to build a model client and shape its requests.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub provider: ProviderKind,
    pub model_id: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Base URL override
    pub endpoint: Option<String>,
    /// Bearer token for the selected provider
    pub api_key: Option<String>,
    pub region: String,
    pub retry: RetryPolicy,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model_id: DEFAULT_MODEL_ID.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            endpoint: None,
            api_key: None,
            region: DEFAULT_REGION.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

/// Factory for creating model clients from configuration.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the configured client, wrapped in the retry policy.
    ///
    /// Fails fast when the provider requires an API key and none is set.
    pub fn create(config: &ModelConfig) -> Result<Arc<dyn ModelClient>, ModelError> {
        let has_key = config
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());

        match config.provider {
            ProviderKind::Bedrock => {
                if !has_key {
                    return Err(ModelError::missing_api_key(ProviderKind::Bedrock.as_str()));
                }
                let client = BedrockClient::new(
                    &config.region,
                    config.endpoint.as_deref(),
                    config.api_key.clone(),
                );
                Ok(Arc::new(RetryingModelClient::new(client, config.retry.clone())))
            }
            ProviderKind::OpenAi => {
                // Local OpenAI-compatible servers accept any token
                let api_key = if has_key {
                    config.api_key.clone()
                } else if config.endpoint.is_some() {
                    Some("unused".to_string())
                } else {
                    return Err(ModelError::missing_api_key(ProviderKind::OpenAi.as_str()));
                };
                let client = OpenAiClient::new(config.endpoint.as_deref(), api_key);
                Ok(Arc::new(RetryingModelClient::new(client, config.retry.clone())))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("bedrock", ProviderKind::Bedrock)]
    #[case("  Bedrock ", ProviderKind::Bedrock)]
    #[case("openai", ProviderKind::OpenAi)]
    #[case("ollama", ProviderKind::OpenAi)]
    fn parses_provider_names(#[case] raw: &str, #[case] expected: ProviderKind) {
        assert_eq!(raw.parse::<ProviderKind>().unwrap(), expected);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        assert!(matches!(
            "gemini".parse::<ProviderKind>(),
            Err(ModelError::ProviderNotFound { .. })
        ));
    }

    #[test]
    fn defaults_match_documented_values() {
        let config = ModelConfig::default();
        assert_eq!(config.provider, ProviderKind::Bedrock);
        assert_eq!(config.model_id, "us.amazon.nova-pro-v1:0");
        assert_eq!(config.temperature, 0.3);
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn bedrock_requires_a_key() {
        let result = ProviderFactory::create(&ModelConfig::default());
        assert!(matches!(result, Err(ModelError::MissingApiKey { .. })));

        let config = ModelConfig {
            api_key: Some("token".to_string()),
            ..ModelConfig::default()
        };
        assert_eq!(ProviderFactory::create(&config).unwrap().id(), "bedrock");
    }

    #[test]
    fn openai_with_local_endpoint_needs_no_key() {
        let config = ModelConfig {
            provider: ProviderKind::OpenAi,
            endpoint: Some("http://localhost:11434".to_string()),
            ..ModelConfig::default()
        };
        assert_eq!(ProviderFactory::create(&config).unwrap().id(), "openai");

        let hosted = ModelConfig {
            provider: ProviderKind::OpenAi,
            ..ModelConfig::default()
        };
        assert!(ProviderFactory::create(&hosted).is_err());
    }
}
