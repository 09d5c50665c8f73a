//! Core types for youtube-data

use crate::error::ErrorDetail;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Inputs of a channel discovery run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelQuery {
    /// Free-text search term
    pub term: String,
    /// Minimum subscriber count (inclusive)
    pub min_subscribers: u64,
    /// Minimum channel age in days (inclusive)
    pub min_days: u64,
}

/// Inputs of a comment discovery run
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentQuery {
    /// Free-text search term
    pub term: String,
}

/// One page of a cursor-paginated feed
#[derive(Clone, Debug)]
pub struct SearchPage<T> {
    /// Items on this page, in source ranking order
    pub items: Vec<T>,
    /// Cursor for the next page; `None` ends pagination
    pub next_page_token: Option<String>,
}

impl<T> SearchPage<T> {
    /// A page with no successor
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }
}

/// A channel search hit, not yet enriched
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelRef {
    /// Channel id
    pub channel_id: String,
    /// Channel title as shown in the search result
    pub title: String,
}

/// A video search hit, not yet enriched
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VideoRef {
    /// Video id
    pub video_id: String,
    /// Video title
    pub title: String,
    /// Default thumbnail URL from the search snippet
    pub thumbnail_url: String,
}

/// Channel statistics fetched from the channels endpoint
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelCandidate {
    /// Channel id
    pub channel_id: String,
    /// Channel title
    pub title: String,
    /// Public subscriber count (0 when hidden)
    pub subscriber_count: u64,
    /// Number of public videos
    pub video_count: u64,
    /// When the channel was created
    pub published_at: DateTime<Utc>,
}

/// Video statistics fetched from the videos endpoint
#[derive(Clone, Debug, PartialEq)]
pub struct VideoDetail {
    /// Video id
    pub video_id: String,
    /// Default thumbnail URL
    pub thumbnail_url: String,
    /// View count
    pub view_count: u64,
    /// Like count (0 when hidden)
    pub like_count: u64,
    /// Dislike count (0 when not exposed)
    pub dislike_count: u64,
    /// Comment count (0 when comments are disabled)
    pub comment_count: u64,
    /// Owning channel id
    pub channel_id: String,
}

/// A top-level comment from a comment thread
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommentRecord {
    /// Video the comment belongs to
    pub video_id: String,
    /// Author display name
    pub author_name: String,
    /// Author channel id (empty for deleted accounts)
    pub author_channel_id: String,
    /// Comment text as displayed
    pub text: String,
    /// Likes on the comment
    pub like_count: u64,
    /// Replies in the thread
    pub reply_count: u64,
    /// Publish timestamp exactly as the source returned it
    pub published_at: String,
}

/// One exported row of a channel discovery: a video of a matching channel
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ChannelRow {
    /// Video id
    pub video_id: String,
    /// Watch URL of the video
    pub url: String,
    /// Default thumbnail URL
    pub thumbnail_url: String,
    /// likes / (likes + dislikes), 0 when both are 0
    #[serde(rename = "like_rate")]
    pub like_ratio: f64,
    /// Video view count
    pub view_count: u64,
    /// Video comment count
    pub comment_count: u64,

    /// Channel id
    pub channel_id: String,
    /// Channel title
    pub channel_name: String,
    /// Channel subscriber count
    pub subscriber_count: u64,
    /// Number of videos on the channel
    #[serde(rename = "video_contents")]
    pub video_count: u64,
    /// Videos published per day since channel creation
    #[serde(rename = "avg_daily_contents")]
    pub avg_daily_content: f64,
    /// Subscribers gained per day since channel creation
    pub avg_daily_views: f64,
    /// Whole days since channel creation
    #[serde(rename = "days_ago")]
    pub days_since_creation: u64,
    /// Channel creation timestamp
    pub channel_created_at: DateTime<Utc>,
    /// When this row was assembled
    pub created_at: DateTime<Utc>,
}

/// One exported row of a comment discovery
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CommentRow {
    /// Video id
    pub video_id: String,
    /// Video like count
    #[serde(rename = "like")]
    pub video_like_count: u64,
    /// Video comment count
    #[serde(rename = "comments")]
    pub video_comment_count: u64,

    /// Comment author display name
    #[serde(rename = "name")]
    pub author_name: String,
    /// Comment author channel id
    #[serde(rename = "name_id")]
    pub author_channel_id: String,
    /// Comment text
    #[serde(rename = "comment")]
    pub text: String,
    /// Likes on the comment
    #[serde(rename = "favo")]
    pub like_count: u64,
    /// Replies to the comment
    #[serde(rename = "replay")]
    pub reply_count: u64,
    /// Comment publish timestamp as returned by the source
    #[serde(rename = "created_at")]
    pub published_at: String,
}

/// Per-run counters, logged and returned with each response
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RunStats {
    /// External calls issued by this run
    pub api_calls: u64,
    /// Search pages consumed
    pub pages: u64,
    /// Items skipped because a per-item call failed
    pub skipped_items: u64,
}

/// Rows produced by a discovery run, with its counters
#[derive(Clone, Debug, Default)]
pub struct Discovery<R> {
    /// Filter-passing rows, in source ranking order
    pub rows: Vec<R>,
    /// Counters for this run
    pub stats: RunStats,
}

/// Result of a successful export
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExportReceipt {
    /// Object name in the bucket
    pub object_name: String,
    /// Durable access link
    pub link: String,
    /// Size of the CSV payload
    pub bytes: u64,
}

/// JSON envelope returned by the discovery endpoints
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
#[aliases(ChannelReport = Report<ChannelRow>, CommentReport = Report<CommentRow>)]
pub struct Report<R> {
    /// The search term as received
    pub query: String,
    /// Link to the exported CSV; absent when export is disabled or failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// Enriched rows (an empty list is a valid result)
    pub rows: Vec<R>,
    /// External calls issued for this request
    pub api_calls: u64,
    /// Set when rows were computed but the export failed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub export_failed: bool,
    /// Why the export failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorDetail>,
}
