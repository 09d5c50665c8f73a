//! Wire types of the YouTube Data API v3 and their conversion into domain types
//!
//! Statistics counters arrive as decimal strings (`"subscriberCount": "5000"`)
//! and are frequently absent (hidden likes, hidden subscriber counts, the
//! retired public dislike count); absent counters read as 0.

use crate::types::{ChannelCandidate, ChannelRef, CommentRecord, VideoDetail, VideoRef};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Generic `*.list` response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListResponse<T> {
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchResult {
    pub id: ResourceId,
    #[serde(default)]
    pub snippet: Option<SearchSnippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ResourceId {
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SearchSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnails {
    #[serde(default)]
    pub default: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Thumbnail {
    #[serde(default)]
    pub url: String,
}

fn default_thumbnail(thumbnails: Option<&Thumbnails>) -> String {
    thumbnails
        .and_then(|t| t.default.as_ref())
        .map(|d| d.url.clone())
        .unwrap_or_default()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiChannel {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<ChannelSnippet>,
    #[serde(default)]
    pub statistics: Option<ChannelStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelSnippet {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub published_at: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChannelStatistics {
    #[serde(default, deserialize_with = "count")]
    pub subscriber_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub video_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiVideo {
    pub id: String,
    #[serde(default)]
    pub snippet: Option<VideoSnippet>,
    #[serde(default)]
    pub statistics: Option<VideoStatistics>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoSnippet {
    #[serde(default)]
    pub channel_id: String,
    #[serde(default)]
    pub thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VideoStatistics {
    #[serde(default, deserialize_with = "count")]
    pub view_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub like_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub dislike_count: u64,
    #[serde(default, deserialize_with = "count")]
    pub comment_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiCommentThread {
    pub snippet: ThreadSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThreadSnippet {
    #[serde(default)]
    pub video_id: Option<String>,
    pub top_level_comment: TopLevelComment,
    #[serde(default, deserialize_with = "count")]
    pub total_reply_count: u64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TopLevelComment {
    pub snippet: CommentSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CommentSnippet {
    #[serde(default)]
    pub video_id: Option<String>,
    #[serde(default)]
    pub author_display_name: String,
    #[serde(default)]
    pub author_channel_id: Option<AuthorChannelId>,
    #[serde(default)]
    pub text_display: String,
    #[serde(default, deserialize_with = "count")]
    pub like_count: u64,
    #[serde(default)]
    pub published_at: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AuthorChannelId {
    #[serde(default)]
    pub value: String,
}

/// Error body returned by Google APIs
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub error: ErrorBody,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<ErrorReason>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorReason {
    #[serde(default)]
    pub reason: String,
}

impl ErrorBody {
    pub fn has_reason(&self, reasons: &[&str]) -> bool {
        self.errors.iter().any(|e| reasons.contains(&e.reason.as_str()))
    }
}

/// Accept counters encoded either as JSON numbers or decimal strings
fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Count::deserialize(deserializer)? {
        Count::Number(n) => Ok(n),
        Count::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

impl SearchResult {
    pub fn into_channel_ref(self) -> Option<ChannelRef> {
        let channel_id = self.id.channel_id.filter(|id| !id.is_empty())?;
        Some(ChannelRef {
            channel_id,
            title: self.snippet.map(|s| s.title).unwrap_or_default(),
        })
    }

    /// Only hits of kind `youtube#video` become video references
    pub fn into_video_ref(self) -> Option<VideoRef> {
        if !self.id.kind.is_empty() && self.id.kind != "youtube#video" {
            return None;
        }
        let video_id = self.id.video_id.filter(|id| !id.is_empty())?;
        let (title, thumbnail_url) = match self.snippet {
            Some(s) => {
                let thumb = default_thumbnail(s.thumbnails.as_ref());
                (s.title, thumb)
            }
            None => (String::new(), String::new()),
        };
        Some(VideoRef {
            video_id,
            title,
            thumbnail_url,
        })
    }
}

impl ApiChannel {
    /// Fails when the channel has no parseable creation timestamp
    pub fn into_candidate(self) -> Result<ChannelCandidate, String> {
        let snippet = self.snippet.ok_or("missing snippet")?;
        let published_at = snippet.published_at.ok_or("missing publishedAt")?;
        let published_at = DateTime::parse_from_rfc3339(&published_at)
            .map_err(|e| format!("invalid publishedAt '{}': {}", published_at, e))?
            .with_timezone(&Utc);
        let statistics = self.statistics.unwrap_or_default();

        Ok(ChannelCandidate {
            channel_id: self.id,
            title: snippet.title,
            subscriber_count: statistics.subscriber_count,
            video_count: statistics.video_count,
            published_at,
        })
    }
}

impl ApiVideo {
    pub fn into_detail(self) -> VideoDetail {
        let statistics = self.statistics.unwrap_or_default();
        let (channel_id, thumbnail_url) = match self.snippet {
            Some(s) => {
                let thumb = default_thumbnail(s.thumbnails.as_ref());
                (s.channel_id, thumb)
            }
            None => (String::new(), String::new()),
        };

        VideoDetail {
            video_id: self.id,
            thumbnail_url,
            view_count: statistics.view_count,
            like_count: statistics.like_count,
            dislike_count: statistics.dislike_count,
            comment_count: statistics.comment_count,
            channel_id,
        }
    }
}

impl ApiCommentThread {
    pub fn into_record(self, requested_video_id: &str) -> CommentRecord {
        let thread = self.snippet;
        let comment = thread.top_level_comment.snippet;
        let video_id = comment
            .video_id
            .or(thread.video_id)
            .unwrap_or_else(|| requested_video_id.to_string());

        CommentRecord {
            video_id,
            author_name: comment.author_display_name,
            author_channel_id: comment
                .author_channel_id
                .map(|a| a.value)
                .unwrap_or_default(),
            text: comment.text_display,
            like_count: comment.like_count,
            reply_count: thread.total_reply_count,
            published_at: comment.published_at,
        }
    }
}
