//! REST API server module
//!
//! Exposes channel and comment discovery over HTTP, plus health, stats and
//! an OpenAPI 3 description of the whole surface.

use crate::error::Error;
use crate::{Result, YouTubeData};
use axum::{Router, http::HeaderValue, routing::get};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Discovery
/// - `GET /api/youtube/channels?q=&subscribers_n=&days=` - Qualifying channels and their videos
/// - `GET /api/youtube/comments?q=` - Top-level comments of matching videos
///
/// ## System
/// - `GET /api/health` - Health check
/// - `GET /api/stats` - YouTube API calls issued since startup
/// - `GET /api/openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
pub fn create_router(service: Arc<YouTubeData>) -> Router {
    let state = AppState::new(service);
    let config = state.config.clone();

    let api = Router::new()
        // Discovery
        .route("/youtube/channels", get(routes::search_channels))
        .route("/youtube/comments", get(routes::search_comments))
        // System
        .route("/health", get(routes::health_check))
        .route("/stats", get(routes::stats))
        .route("/openapi.json", get(routes::openapi_spec));

    let router = Router::new().nest("/api", api);

    // Swagger UI loads the document served by routes::openapi_spec
    let router = if config.api.swagger_ui {
        router.merge(
            SwaggerUi::new("/swagger-ui")
                .config(utoipa_swagger_ui::Config::from("/api/openapi.json")),
        )
    } else {
        router
    };

    let router = router
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if config.api.cors_enabled {
        router.layer(build_cors_layer(&config.api.cors_origins))
    } else {
        router
    }
}

/// Build a CORS layer based on configured origins
///
/// `"*"` or an empty list allows any origin.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Serves until the service's shutdown token is cancelled, then drains
/// in-flight requests and returns.
///
/// # Example
///
/// ```no_run
/// use youtube_data::{Config, YouTubeData};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = Arc::new(YouTubeData::new(Config::from_env()?)?);
///
/// // Blocks until shutdown
/// youtube_data::api::start_api_server(service).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(service: Arc<YouTubeData>) -> Result<()> {
    let bind_address = service.config().api.bind_address;
    let shutdown = service.shutdown_token();

    tracing::info!(address = %bind_address, "Starting API server");

    let app = create_router(service);

    let listener = TcpListener::bind(bind_address).await.map_err(Error::Io)?;

    tracing::info!(address = %bind_address, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| Error::ApiServerError(e.to_string()))?;

    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
