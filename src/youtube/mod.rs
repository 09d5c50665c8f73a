//! YouTube Data API access
//!
//! [`VideoSource`] is the seam between the enrichment pipeline and the
//! external data source. [`YouTubeClient`] implements it over the Data API v3;
//! tests substitute in-memory sources.

mod client;
mod models;

pub use client::YouTubeClient;

use crate::error::UpstreamError;
use crate::types::{ChannelCandidate, ChannelRef, CommentRecord, SearchPage, VideoDetail, VideoRef};
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of a single data source call
pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;

/// Read-only access to channels, videos and comments
///
/// Implementations never retry; callers decide what is worth retrying.
#[async_trait]
pub trait VideoSource: Send + Sync {
    /// One page of channels matching `term`, ranked by view count
    async fn search_channels(
        &self,
        term: &str,
        page_token: Option<&str>,
    ) -> UpstreamResult<SearchPage<ChannelRef>>;

    /// One page of videos uploaded by `channel_id`
    async fn search_videos_by_channel(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> UpstreamResult<SearchPage<VideoRef>>;

    /// The first page of videos matching `term`
    async fn search_videos(&self, term: &str) -> UpstreamResult<Vec<VideoRef>>;

    /// Statistics of a single channel
    async fn get_channel(&self, channel_id: &str) -> UpstreamResult<ChannelCandidate>;

    /// Statistics of a single video
    async fn get_video(&self, video_id: &str) -> UpstreamResult<VideoDetail>;

    /// Top-level comments of a video (first page)
    async fn list_top_level_comments(&self, video_id: &str) -> UpstreamResult<Vec<CommentRecord>>;
}

/// Process-wide count of external calls issued
#[derive(Debug, Default)]
pub struct ApiCallCounter(AtomicU64);

impl ApiCallCounter {
    /// A counter starting at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one call, returning the new total
    pub fn record(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Calls recorded so far
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests;
