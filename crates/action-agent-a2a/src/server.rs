//! A2A protocol server
//!
//! Exposes an [`AgentHandler`] over HTTP:
//!
//! | Method | Path | Purpose |
//! |---|---|---|
//! | GET | `/.well-known/agent.json` | agent card |
//! | GET | `/.well-known/agent-card.json` | agent card (newer discovery path) |
//! | POST | `/tasks/send` | send a message, creating or continuing a task |
//! | GET | `/tasks/{task_id}` | fetch a task |
//! | POST | `/tasks/{task_id}/cancel` | cancel a task |
//!
//! Tasks live in an in-memory store and expire after a configurable TTL.
//! Messages sent to the same task are handled one at a time.

use crate::error::{A2aError, ErrorResponse};
use crate::types::{
    AgentCard, CancelTaskRequest, Message, SendMessageRequest, SendMessageResponse, Task,
    TaskStatus,
};
use async_trait::async_trait;
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, error, info, warn};

/// Behavior of an agent served over A2A.
#[async_trait]
pub trait AgentHandler: Send + Sync + 'static {
    fn agent_card(&self) -> AgentCard;

    /// Process an incoming message and record the outcome on `task`.
    ///
    /// The task already contains `message`. Returning `Ok` without setting a
    /// status completes the task; an `Err` fails it and the error text is
    /// appended as an agent message.
    async fn handle_message(&self, task: &mut Task, message: Message) -> Result<(), String>;

    /// Called before a task is marked cancelled
    async fn on_cancel(&self, _task: &Task) -> Result<(), String> {
        Ok(())
    }
}

#[async_trait]
impl<H: AgentHandler + ?Sized> AgentHandler for Arc<H> {
    fn agent_card(&self) -> AgentCard {
        (**self).agent_card()
    }

    async fn handle_message(&self, task: &mut Task, message: Message) -> Result<(), String> {
        (**self).handle_message(task, message).await
    }

    async fn on_cancel(&self, task: &Task) -> Result<(), String> {
        (**self).on_cancel(task).await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStoreConfig {
    /// How long a task is kept after its last update (default: 1 hour)
    pub default_ttl_secs: u64,
    /// How often expired tasks are purged (default: 5 minutes)
    pub cleanup_interval_secs: u64,
}

impl Default for TaskStoreConfig {
    fn default() -> Self {
        Self {
            default_ttl_secs: 3600,
            cleanup_interval_secs: 300,
        }
    }
}

#[derive(Debug, Clone)]
struct StoredTask {
    task: Task,
    expires_at: chrono::DateTime<Utc>,
    /// Held while a message or cancellation is applied to the task
    turn: Arc<Mutex<()>>,
}

impl StoredTask {
    fn is_expired(&self, now: chrono::DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// In-memory task store with expiration
#[derive(Debug)]
struct TaskStore {
    tasks: RwLock<HashMap<String, StoredTask>>,
    config: TaskStoreConfig,
}

impl TaskStore {
    fn with_config(config: TaskStoreConfig) -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            config,
        }
    }

    async fn get(&self, task_id: &str) -> Option<Task> {
        let tasks = self.tasks.read().await;
        tasks
            .get(task_id)
            .filter(|stored| !stored.is_expired(Utc::now()))
            .map(|stored| stored.task.clone())
    }

    /// Wait for exclusive access to a stored task.
    ///
    /// The task is read after the turn is acquired, so it reflects every
    /// earlier turn.
    async fn begin_turn(&self, task_id: &str) -> Option<(OwnedMutexGuard<()>, Task)> {
        let turn = {
            let tasks = self.tasks.read().await;
            let stored = tasks
                .get(task_id)
                .filter(|stored| !stored.is_expired(Utc::now()))?;
            Arc::clone(&stored.turn)
        };
        let guard = turn.lock_owned().await;
        let task = self.get(task_id).await?;
        Some((guard, task))
    }

    async fn update(&self, task: Task) {
        let ttl = i64::try_from(self.config.default_ttl_secs).unwrap_or(i64::MAX);
        let expires_at = Utc::now() + chrono::Duration::seconds(ttl);
        let mut tasks = self.tasks.write().await;
        match tasks.entry(task.id.clone()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get_mut();
                stored.task = task;
                stored.expires_at = expires_at;
            }
            Entry::Vacant(entry) => {
                entry.insert(StoredTask {
                    task,
                    expires_at,
                    turn: Arc::default(),
                });
            }
        }
    }

    async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|id, stored| {
            let keep = !stored.is_expired(now);
            if !keep {
                debug!(task_id = %id, "Cleaned up expired task");
            }
            keep
        });
        let removed = before - tasks.len();
        if removed > 0 {
            info!(count = removed, "Cleaned up expired A2A tasks");
        }
        removed
    }

    #[cfg(test)]
    async fn task_count(&self) -> usize {
        self.tasks.read().await.len()
    }
}

struct AppState<H: AgentHandler> {
    handler: Arc<H>,
    store: Arc<TaskStore>,
}

impl<H: AgentHandler> Clone for AppState<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
            store: Arc::clone(&self.store),
        }
    }
}

/// Serves one agent over the A2A HTTP binding
pub struct A2aServer<H: AgentHandler> {
    handler: Arc<H>,
    store: Arc<TaskStore>,
}

impl<H: AgentHandler> A2aServer<H> {
    pub fn new(handler: H) -> Self {
        Self::with_config(handler, TaskStoreConfig::default())
    }

    pub fn with_config(handler: H, config: TaskStoreConfig) -> Self {
        Self {
            handler: Arc::new(handler),
            store: Arc::new(TaskStore::with_config(config)),
        }
    }

    /// Spawn the periodic purge of expired tasks.
    ///
    /// Abort the returned handle to stop it.
    pub fn start_cleanup_task(&self) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(&self.store);
        let period = Duration::from_secs(store.config.cleanup_interval_secs.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                store.cleanup_expired().await;
            }
        })
    }

    /// The A2A routes. Cross-origin policy is left to the caller.
    pub fn router(&self) -> Router {
        let state = AppState {
            handler: Arc::clone(&self.handler),
            store: Arc::clone(&self.store),
        };

        Router::new()
            .route("/.well-known/agent.json", get(get_agent_card::<H>))
            .route("/.well-known/agent-card.json", get(get_agent_card::<H>))
            .route("/tasks/send", post(send_message::<H>))
            .route("/tasks/{task_id}", get(get_task::<H>))
            .route("/tasks/{task_id}/cancel", post(cancel_task::<H>))
            .with_state(state)
    }
}

async fn get_agent_card<H: AgentHandler>(State(state): State<AppState<H>>) -> Json<AgentCard> {
    let card = state.handler.agent_card();
    debug!(agent_id = %card.agent_id, "Serving agent card");
    Json(card)
}

async fn send_message<H: AgentHandler>(
    State(state): State<AppState<H>>,
    Json(request): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, A2aErrorResponse> {
    if request.message.text().trim().is_empty() {
        return Err(A2aError::invalid_message("message has no text content").into());
    }

    let (_turn, mut task) = match &request.task_id {
        Some(task_id) => {
            let (turn, task) = state
                .store
                .begin_turn(task_id)
                .await
                .ok_or_else(|| A2aError::task_not_found(task_id))?;
            (Some(turn), task)
        }
        None => {
            let mut task = Task::new_with_uuid();
            task.context_id = request.context_id.clone();
            (None, task)
        }
    };

    if task.is_terminal() {
        return Err(A2aError::task_terminated(&task.id, task.status.to_string()).into());
    }

    debug!(task_id = %task.id, "Processing A2A message");

    task.add_message(request.message.clone());
    if task.status == TaskStatus::InputRequired {
        task.set_status(TaskStatus::Working);
    }

    match state.handler.handle_message(&mut task, request.message).await {
        Ok(()) => {
            if !task.is_terminal() && task.status != TaskStatus::InputRequired {
                task.set_status(TaskStatus::Completed);
            }
        }
        Err(e) => {
            error!(task_id = %task.id, error = %e, "Agent handler failed");
            task.set_status(TaskStatus::Failed);
            task.add_message(Message::agent(format!("Error: {}", e)));
        }
    }

    state.store.update(task.clone()).await;
    debug!(task_id = %task.id, status = %task.status, "Message processed");

    Ok(Json(SendMessageResponse { task }))
}

async fn get_task<H: AgentHandler>(
    State(state): State<AppState<H>>,
    Path(task_id): Path<String>,
) -> Result<Json<Task>, A2aErrorResponse> {
    let task = state
        .store
        .get(&task_id)
        .await
        .ok_or_else(|| A2aError::task_not_found(&task_id))?;
    Ok(Json(task))
}

async fn cancel_task<H: AgentHandler>(
    State(state): State<AppState<H>>,
    Path(task_id): Path<String>,
    Json(request): Json<CancelTaskRequest>,
) -> Result<Json<Task>, A2aErrorResponse> {
    let (_turn, mut task) = state
        .store
        .begin_turn(&task_id)
        .await
        .ok_or_else(|| A2aError::task_not_found(&task_id))?;

    if task.is_terminal() {
        return Err(A2aError::task_terminated(&task_id, task.status.to_string()).into());
    }

    if let Err(e) = state.handler.on_cancel(&task).await {
        warn!(task_id = %task_id, error = %e, "Cancel callback failed");
    }

    task.set_status(TaskStatus::Cancelled);
    state.store.update(task.clone()).await;

    info!(task_id = %task_id, reason = ?request.reason, "Task cancelled");
    Ok(Json(task))
}

/// [`A2aError`] rendered as an HTTP response
pub struct A2aErrorResponse(A2aError);

impl From<A2aError> for A2aErrorResponse {
    fn from(err: A2aError) -> Self {
        Self(err)
    }
}

impl IntoResponse for A2aErrorResponse {
    fn into_response(self) -> Response {
        let body: ErrorResponse = self.0.into();
        let status =
            StatusCode::from_u16(body.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(body)).into_response()
    }
}
