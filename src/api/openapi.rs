//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the youtube-data REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the youtube-data REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "youtube-data REST API",
        description = "Discover YouTube channels and comments matching a search term, and export them as CSV",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:8080/api", description = "Local development server")
    ),
    paths(
        // Discovery
        crate::api::routes::search_channels,
        crate::api::routes::search_comments,

        // System
        crate::api::routes::health_check,
        crate::api::routes::stats,
        crate::api::routes::openapi_spec,
    ),
    components(schemas(
        // Rows and reports
        crate::types::ChannelRow,
        crate::types::CommentRow,
        crate::types::ChannelReport,
        crate::types::CommentReport,
        crate::types::RunStats,
        crate::types::ExportReceipt,

        // Config types
        crate::config::PipelineConfig,
        crate::config::ExportConfig,
        crate::config::RetryConfig,
        crate::config::ApiConfig,

        // Request/response types
        crate::api::routes::ChannelSearchParams,
        crate::api::routes::CommentSearchParams,
        crate::api::routes::StatsResponse,

        // Error types
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "youtube", description = "Discovery - Search channels and comments, export rows as CSV"),
        (name = "system", description = "System endpoints - Health checks, API call stats, OpenAPI spec"),
    )
)]
pub struct ApiDoc;
