//! Retry policy for transient model failures.
//!
//! Implements exponential backoff with configurable parameters.

use crate::client::ModelClient;
use crate::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Retry policy implementing exponential backoff.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Cap for exponential growth.
    pub max_backoff: Duration,
    /// Multiplier applied to backoff after each retry.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Backoff before retry number `retry` (zero-based):
    /// `initial_backoff * multiplier^retry`, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let exp = i32::try_from(retry).unwrap_or(i32::MAX);
        let secs = self.initial_backoff.as_secs_f64() * self.backoff_multiplier.powi(exp);
        let capped = secs.min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(capped.max(0.0))
    }

    pub fn should_retry(&self, error: &ModelError, retry: u32) -> bool {
        error.is_retryable() && retry < self.max_retries
    }
}

/// Wraps a [`ModelClient`] and retries retryable failures.
pub struct RetryingModelClient<C> {
    inner: C,
    policy: RetryPolicy,
}

impl<C: ModelClient> RetryingModelClient<C> {
    pub fn new(inner: C, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

#[async_trait]
impl<C: ModelClient> ModelClient for RetryingModelClient<C> {
    fn id(&self) -> &str {
        self.inner.id()
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let mut retry = 0;
        loop {
            match self.inner.chat(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if self.policy.should_retry(&e, retry) => {
                    let delay = self.policy.backoff(retry);
                    tracing::warn!(
                        provider = self.inner.id(),
                        error = %e,
                        retry = retry + 1,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Model call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    retry += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
