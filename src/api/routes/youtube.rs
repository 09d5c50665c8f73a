//! Discovery handlers: channels and comments.

use super::{ChannelSearchParams, CommentSearchParams};
use crate::api::AppState;
use crate::error::Result;
use crate::types::{ChannelReport, CommentReport, Report};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// 200 with the report, or 500 when the rows could not be exported
fn report_response<R: Serialize>(report: Report<R>) -> Response {
    let status = if report.export_failed {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::OK
    };
    (status, Json(report)).into_response()
}

/// GET /youtube/channels - Discover channels and their videos
#[utoipa::path(
    get,
    path = "/api/youtube/channels",
    tag = "youtube",
    params(
        ("q" = String, Query, description = "Search term"),
        ("subscribers_n" = u64, Query, description = "Minimum subscriber count (inclusive)"),
        ("days" = u64, Query, description = "Minimum channel age in days (inclusive)")
    ),
    responses(
        (status = 200, description = "Rows of qualifying channels, with export link", body = ChannelReport),
        (status = 400, description = "Missing or malformed query parameter", body = crate::error::ApiError),
        (status = 500, description = "Rows computed but export failed", body = ChannelReport),
        (status = 502, description = "YouTube API failure or pagination overflow", body = crate::error::ApiError)
    )
)]
pub async fn search_channels(
    State(state): State<AppState>,
    Query(params): Query<ChannelSearchParams>,
) -> Result<Response> {
    let query = params.into_query()?;
    tracing::info!(
        term = %query.term,
        min_subscribers = query.min_subscribers,
        min_days = query.min_days,
        "Channel search requested"
    );

    let report = state.service.channel_report(&query).await?;
    Ok(report_response(report))
}

/// GET /youtube/comments - Collect comments of matching videos
#[utoipa::path(
    get,
    path = "/api/youtube/comments",
    tag = "youtube",
    params(
        ("q" = String, Query, description = "Search term")
    ),
    responses(
        (status = 200, description = "Comment rows, with export link", body = CommentReport),
        (status = 400, description = "Missing query parameter", body = crate::error::ApiError),
        (status = 500, description = "Rows computed but export failed", body = CommentReport),
        (status = 502, description = "YouTube API failure", body = crate::error::ApiError)
    )
)]
pub async fn search_comments(
    State(state): State<AppState>,
    Query(params): Query<CommentSearchParams>,
) -> Result<Response> {
    let query = params.into_query()?;
    tracing::info!(term = %query.term, "Comment search requested");

    let report = state.service.comment_report(&query).await?;
    Ok(report_response(report))
}
