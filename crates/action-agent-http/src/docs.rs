//! Machine-readable interface description

use crate::error::{ErrorCode, ErrorResponse};
use crate::types::{
    ActionGroupParameter, ActionGroupRequest, ActionGroupResponse, ActionGroupResult,
    FunctionResponse, InvocationRequest, InvocationResponse, PingResponse, ResponseBody,
    ResponseState, TextBody, ValidateRequestBody, ValidateResponse,
};
use axum::response::Json;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::ping,
        crate::handlers::invocations::invoke,
        crate::handlers::action_group::invoke_action_group,
        crate::handlers::validate::validate_request
    ),
    components(schemas(
        PingResponse,
        InvocationRequest,
        InvocationResponse,
        ActionGroupParameter,
        ActionGroupRequest,
        ActionGroupResponse,
        ActionGroupResult,
        FunctionResponse,
        ResponseBody,
        ResponseState,
        TextBody,
        ValidateRequestBody,
        ValidateResponse,
        ErrorCode,
        ErrorResponse
    )),
    tags(
        (name = "agent", description = "Identity and access operations"),
        (name = "health", description = "Health check endpoints")
    ),
    info(
        title = "Action Agent",
        description = "Executes identity & access operations via PingOne and Microsoft Graph. \
                       A2A routes (/.well-known/agent.json, /tasks/*) are served alongside."
    )
)]
struct ApiDoc;

/// The OpenAPI document of the HTTP surface
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

/// GET /openapi.json
pub async fn openapi_spec() -> Json<utoipa::openapi::OpenApi> {
    Json(openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_agent_route() {
        let doc = openapi();
        for path in ["/ping", "/invocations", "/action-group", "/validate"] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
        let schemas = doc.components.expect("components").schemas;
        assert!(schemas.contains_key("ActionGroupRequest"));
        assert!(schemas.contains_key("ErrorResponse"));
    }
}
