use crate::types::PingResponse;
use axum::response::Json;

/// GET /ping - liveness probe
#[utoipa::path(
    get,
    path = "/ping",
    tag = "health",
    responses((status = 200, description = "Service is running", body = PingResponse))
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        status: "healthy".to_string(),
    })
}
