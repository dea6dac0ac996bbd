use crate::types::{ValidateRequestBody, ValidateResponse};
use action_agent_core::validation;
use axum::response::Json;

/// POST /validate - check a structured request against the required-field table.
///
/// Always answers 200; the verdict is in the body.
#[utoipa::path(
    post,
    path = "/validate",
    tag = "agent",
    request_body = ValidateRequestBody,
    responses((status = 200, description = "Validation verdict", body = ValidateResponse))
)]
pub async fn validate_request(Json(body): Json<ValidateRequestBody>) -> Json<ValidateResponse> {
    let verdict = match validation::validate_value(&body.request_type, &body.data) {
        Ok(_) => ValidateResponse {
            valid: true,
            error: None,
        },
        Err(e) => ValidateResponse {
            valid: false,
            error: Some(e.to_string()),
        },
    };
    Json(verdict)
}
