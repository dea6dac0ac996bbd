//! A2A protocol client
//!
//! Used by the calling side (a chat agent, or the CLI) to discover an agent
//! and delegate work to it.

use crate::error::{A2aError, A2aResult};
use crate::types::{
    AgentCard, CancelTaskRequest, Message, SendMessageRequest, SendMessageResponse, Task,
};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default timeout for HTTP requests
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct A2aClient {
    base_url: Url,
    http: Client,
    timeout: Duration,
    auth: Option<AuthConfig>,
}

impl std::fmt::Debug for A2aClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("A2aClient")
            .field("base_url", &self.base_url.as_str())
            .field("has_auth", &self.auth.is_some())
            .finish()
    }
}

/// Credentials attached to every request
#[derive(Clone)]
pub enum AuthConfig {
    Bearer(String),
    ApiKeyHeader { name: String, value: String },
    ApiKeyQuery { name: String, value: String },
}

impl A2aClient {
    /// Create a client for the agent at `base_url`
    pub fn new(base_url: impl AsRef<str>) -> A2aResult<Self> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client whose requests give up after `timeout`.
    ///
    /// Delegated tasks run to completion inside `POST /tasks/send`, so
    /// callers driving slow agents want more than [`DEFAULT_TIMEOUT`].
    pub fn with_timeout(base_url: impl AsRef<str>, timeout: Duration) -> A2aResult<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(format!("action-agent-a2a/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                A2aError::connection_error(format!("Failed to create HTTP client: {}", e))
            })?;
        let mut client = Self::with_http_client(base_url, http)?;
        client.timeout = timeout;
        Ok(client)
    }

    pub fn with_http_client(base_url: impl AsRef<str>, http: Client) -> A2aResult<Self> {
        Ok(Self {
            base_url: Url::parse(base_url.as_ref())?,
            http,
            timeout: DEFAULT_TIMEOUT,
            auth: None,
        })
    }

    pub fn with_auth(mut self, auth: AuthConfig) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn with_bearer_token(self, token: impl Into<String>) -> Self {
        self.with_auth(AuthConfig::Bearer(token.into()))
    }

    pub fn with_api_key(self, header_name: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.with_auth(AuthConfig::ApiKeyHeader {
            name: header_name.into(),
            value: api_key.into(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> A2aResult<Url> {
        self.base_url
            .join(path)
            .map_err(|e| A2aError::protocol_error(format!("Invalid endpoint path: {}", e)))
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some(AuthConfig::Bearer(token)) => builder.bearer_auth(token),
            Some(AuthConfig::ApiKeyHeader { name, value }) => builder.header(name.as_str(), value),
            Some(AuthConfig::ApiKeyQuery { name, value }) => {
                builder.query(&[(name.as_str(), value.as_str())])
            }
            None => builder,
        }
    }

    /// Send a prepared request and decode a successful JSON body
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
        what: &str,
    ) -> A2aResult<T> {
        let response = self.apply_auth(builder).send().await.map_err(|e| {
            if e.is_timeout() {
                A2aError::Timeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                A2aError::connection_error(format!("Failed to {}: {}", what, e))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(self.handle_error_response(status, response).await);
        }

        response.json().await.map_err(|e| {
            A2aError::protocol_error(format!("Failed to parse response to {}: {}", what, e))
        })
    }

    /// Fetch the agent card from the well-known endpoint
    pub async fn get_agent_card(&self) -> A2aResult<AgentCard> {
        let url = self.endpoint("/.well-known/agent.json")?;
        debug!(url = %url, "Fetching agent card");

        let card: AgentCard = self.execute(self.http.get(url), "fetch agent card").await?;

        info!(
            agent_id = %card.agent_id,
            name = %card.name,
            skills = card.skills.len(),
            "Fetched agent card"
        );
        Ok(card)
    }

    /// Send a text message as a new task
    pub async fn send_message(&self, text: impl Into<String>) -> A2aResult<Task> {
        self.send(Message::user(text), None, None).await
    }

    /// Send a follow-up message to a task waiting for input
    pub async fn continue_task(
        &self,
        task_id: impl Into<String>,
        text: impl Into<String>,
    ) -> A2aResult<Task> {
        self.send(Message::user(text), Some(task_id.into()), None)
            .await
    }

    pub async fn send(
        &self,
        message: Message,
        task_id: Option<String>,
        context_id: Option<String>,
    ) -> A2aResult<Task> {
        let url = self.endpoint("/tasks/send")?;
        let mut body = SendMessageRequest::new(message);
        body.task_id = task_id;
        body.context_id = context_id;

        debug!(url = %url, "Sending message to agent");

        let response: SendMessageResponse = self
            .execute(self.http.post(url).json(&body), "send message")
            .await?;

        debug!(
            task_id = %response.task.id,
            status = %response.task.status,
            "Message sent"
        );
        Ok(response.task)
    }

    pub async fn get_task(&self, task_id: impl AsRef<str>) -> A2aResult<Task> {
        let url = self.endpoint(&format!("/tasks/{}", task_id.as_ref()))?;
        self.execute(self.http.get(url), "fetch task").await
    }

    pub async fn cancel_task(
        &self,
        task_id: impl Into<String>,
        reason: Option<String>,
    ) -> A2aResult<Task> {
        let task_id = task_id.into();
        let url = self.endpoint(&format!("/tasks/{}/cancel", task_id))?;
        let body = CancelTaskRequest {
            task_id: task_id.clone(),
            reason,
        };

        let task: Task = self
            .execute(self.http.post(url).json(&body), "cancel task")
            .await?;

        info!(task_id = %task.id, "Task cancelled");
        Ok(task)
    }

    async fn handle_error_response(
        &self,
        status: StatusCode,
        response: reqwest::Response,
    ) -> A2aError {
        let retry_after = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let body = response.text().await.unwrap_or_default();
        // Prefer the server's own message when it sent an error body
        let message = serde_json::from_str::<crate::error::ErrorResponse>(&body)
            .map(|e| e.message)
            .unwrap_or(body);

        match status {
            StatusCode::NOT_FOUND => A2aError::AgentNotFound {
                agent_id: format!("{} ({})", self.base_url, message),
            },
            StatusCode::UNAUTHORIZED => A2aError::AuthenticationRequired,
            StatusCode::FORBIDDEN => A2aError::NotAuthorized { reason: message },
            StatusCode::TOO_MANY_REQUESTS => A2aError::RateLimitExceeded {
                retry_after_seconds: retry_after,
            },
            StatusCode::BAD_REQUEST => A2aError::InvalidMessage { reason: message },
            StatusCode::GATEWAY_TIMEOUT => A2aError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            },
            StatusCode::BAD_GATEWAY => A2aError::connection_error(message),
            StatusCode::INTERNAL_SERVER_ERROR => A2aError::internal_error(message),
            _ => A2aError::protocol_error(format!("HTTP {}: {}", status, message)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = A2aClient::new("https://agent.example.com").unwrap();
        assert_eq!(client.base_url().as_str(), "https://agent.example.com/");
    }

    #[test]
    fn test_endpoint_building() {
        let client = A2aClient::new("https://agent.example.com").unwrap();
        assert_eq!(
            client.endpoint("/tasks/send").unwrap().as_str(),
            "https://agent.example.com/tasks/send"
        );
        assert_eq!(
            client.endpoint("/.well-known/agent.json").unwrap().as_str(),
            "https://agent.example.com/.well-known/agent.json"
        );
    }

    #[test]
    fn test_invalid_url() {
        assert!(matches!(
            A2aClient::new("not a valid url"),
            Err(A2aError::UrlError(_))
        ));
    }

    #[test]
    fn test_client_with_auth() {
        let client = A2aClient::new("https://agent.example.com")
            .unwrap()
            .with_bearer_token("my-token");
        assert!(client.auth.is_some());
        assert!(format!("{client:?}").contains("has_auth: true"));
    }
}
