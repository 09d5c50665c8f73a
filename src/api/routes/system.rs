//! System handlers: health, stats, OpenAPI.

use super::StatsResponse;
use crate::api::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde_json::json;

/// GET /health - Health check
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "system",
    responses(
        (status = 200, description = "Service is healthy")
    )
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /stats - External API call counter
#[utoipa::path(
    get,
    path = "/api/stats",
    tag = "system",
    responses(
        (status = 200, description = "Calls issued to the YouTube API since startup", body = StatsResponse)
    )
)]
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatsResponse {
        api_calls: state.service.api_calls(),
    })
}

/// GET /openapi.json - OpenAPI specification
#[utoipa::path(
    get,
    path = "/api/openapi.json",
    tag = "system",
    responses(
        (status = 200, description = "OpenAPI 3 specification in JSON format")
    )
)]
pub async fn openapi_spec() -> impl IntoResponse {
    use crate::api::openapi::ApiDoc;
    use utoipa::OpenApi;

    Json(ApiDoc::openapi())
}
