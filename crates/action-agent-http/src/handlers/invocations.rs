//! Cloud agent runtime entry point

use super::AppState;
use crate::error::{ApiError, ErrorResponse};
use crate::types::{InvocationRequest, InvocationResponse};
use axum::{extract::State, response::Json};
use tracing::info;

/// POST /invocations - run one natural-language instruction
#[utoipa::path(
    post,
    path = "/invocations",
    tag = "agent",
    request_body = InvocationRequest,
    responses(
        (status = 200, description = "Instruction executed", body = InvocationResponse),
        (status = 400, description = "Missing or empty prompt", body = ErrorResponse),
        (status = 502, description = "Model provider failure", body = ErrorResponse)
    )
)]
pub async fn invoke(
    State(state): State<AppState>,
    Json(request): Json<InvocationRequest>,
) -> Result<Json<InvocationResponse>, ApiError> {
    let prompt = request
        .prompt
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ApiError::missing_field("prompt"))?;

    info!(chars = prompt.len(), "Invocation received");
    let reply = state.agent.execute(&prompt).await?;

    Ok(Json(InvocationResponse {
        failure_kind: reply.failure_kind().map(|kind| kind.as_str().to_string()),
        result: reply.text,
        tool_calls: reply.tool_calls,
        tool_failures: reply.tool_failures,
    }))
}
