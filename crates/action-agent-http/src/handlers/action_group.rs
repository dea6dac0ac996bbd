//! REST action-group channel.
//!
//! The function name doubles as the request type. Functions with an entry in
//! the required-field table are validated before the model sees them; other
//! functions are passed through as free-form instructions.

use super::AppState;
use crate::types::{ActionGroupRequest, ActionGroupResponse, ResponseState};
use action_agent_core::validation;
use action_agent_runtime::AgentError;
use axum::{extract::State, response::Json};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

/// POST /action-group - execute one action-group function
#[utoipa::path(
    post,
    path = "/action-group",
    tag = "agent",
    request_body = ActionGroupRequest,
    responses((
        status = 200,
        description = "Function result; failures carry responseState FAILURE",
        body = ActionGroupResponse
    ))
)]
pub async fn invoke_action_group(
    State(state): State<AppState>,
    Json(request): Json<ActionGroupRequest>,
) -> Json<ActionGroupResponse> {
    let fields = request.fields();
    info!(
        action_group = %request.action_group,
        function = %request.function,
        parameters = fields.len(),
        "Action-group call received"
    );

    let outcome = if validation::required_fields(&request.function).is_some() {
        state.agent.execute_request(&request.function, &fields).await
    } else {
        state.agent.execute(&instruction(&request, fields)).await
    };

    let response = match outcome {
        Ok(reply) => ActionGroupResponse::reply(request, reply.text, None),
        Err(e) => {
            warn!(function = %request.function, kind = %e.kind(), error = %e, "Action-group call failed");
            let body = match &e {
                AgentError::Validation(err) => {
                    json!({ "valid": false, "error": err.to_string() }).to_string()
                }
                other => other.to_string(),
            };
            ActionGroupResponse::reply(request, body, Some(ResponseState::Failure))
        }
    };

    Json(response)
}

/// Free-form instruction for a function without a required-field entry
fn instruction(request: &ActionGroupRequest, fields: Map<String, Value>) -> String {
    let call = format!(
        "Execute the {} function with these parameters:\n{}",
        request.function,
        Value::Object(fields)
    );
    match request.input_text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => format!("{text}\n{call}"),
        _ => call,
    }
}
