//! HTTP client for the YouTube Data API v3

use super::models::{
    ApiChannel, ApiCommentThread, ApiVideo, ErrorResponse, ListResponse, SearchResult,
};
use super::{ApiCallCounter, UpstreamResult, VideoSource};
use crate::config::YouTubeConfig;
use crate::error::{Error, Resource, Result, UpstreamError};
use crate::types::{ChannelCandidate, ChannelRef, CommentRecord, SearchPage, VideoDetail, VideoRef};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use url::Url;

/// Error reasons Google uses for quota and rate limiting on 403 responses
const QUOTA_REASONS: &[&str] = &[
    "quotaExceeded",
    "dailyLimitExceeded",
    "rateLimitExceeded",
    "userRateLimitExceeded",
];

/// Message prefix of quota errors whose body carries no reason
const QUOTA_MESSAGE_PREFIX: &str = "The request cannot be completed because you have exceeded your";

/// Longest raw body quoted in an error message
const MAX_ERROR_BODY: usize = 200;

#[derive(Debug, Clone)]
struct Endpoints {
    search: Url,
    channels: Url,
    videos: Url,
    comment_threads: Url,
}

/// [`VideoSource`] backed by the YouTube Data API
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    api_key: String,
    page_size: String,
    calls: Arc<ApiCallCounter>,
}

impl YouTubeClient {
    /// Build a client from configuration, counting every call on `calls`
    pub fn new(config: &YouTubeConfig, calls: Arc<ApiCallCounter>) -> Result<Self> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let base = Url::parse(&base).map_err(|e| {
            Error::config(
                "YOUTUBE_API_BASE_URL",
                format!("invalid base URL '{}': {}", config.base_url, e),
            )
        })?;
        let join = |path: &str| {
            base.join(path).map_err(|e| {
                Error::config(
                    "YOUTUBE_API_BASE_URL",
                    format!("cannot derive {} endpoint: {}", path, e),
                )
            })
        };
        let endpoints = Endpoints {
            search: join("search")?,
            channels: join("channels")?,
            videos: join("videos")?,
            comment_threads: join("commentThreads")?,
        };

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("youtube-data/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoints,
            api_key: config.api_key.clone(),
            page_size: config.page_size.to_string(),
            calls,
        })
    }

    /// Issue one GET and decode the JSON body
    ///
    /// The call is counted before it is sent, so failed calls count too.
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &Url,
        params: &[(&str, &str)],
        resource: Resource,
        id: &str,
    ) -> UpstreamResult<T> {
        let total = self.calls.record();
        tracing::debug!(%resource, id, total_calls = total, "YouTube API call");

        let transport = |source: reqwest::Error| UpstreamError::Transport {
            resource,
            id: id.to_string(),
            // the request URL carries the API key
            source: source.without_url(),
        };

        let response = self
            .http
            .get(url.clone())
            .query(&[("key", self.api_key.as_str())])
            .query(params)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify(status.as_u16(), &body, resource, id));
        }

        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body).map_err(|e| UpstreamError::Decode {
            resource,
            id: id.to_string(),
            message: e.to_string(),
        })
    }

    async fn search(
        &self,
        params: &[(&str, &str)],
        page_token: Option<&str>,
        id: &str,
    ) -> UpstreamResult<ListResponse<SearchResult>> {
        let mut params = params.to_vec();
        params.push(("part", "snippet"));
        params.push(("maxResults", self.page_size.as_str()));
        if let Some(token) = page_token.filter(|t| !t.is_empty()) {
            params.push(("pageToken", token));
        }
        self.fetch(&self.endpoints.search, &params, Resource::Search, id)
            .await
    }
}

/// Map a non-success response onto a typed upstream error
fn classify(status: u16, body: &str, resource: Resource, id: &str) -> UpstreamError {
    let parsed: ErrorResponse = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.error.message.is_empty() {
        body.trim().chars().take(MAX_ERROR_BODY).collect()
    } else {
        parsed.error.message.clone()
    };
    let id = id.to_string();

    match status {
        404 => UpstreamError::NotFound { resource, id },
        429 => UpstreamError::QuotaExceeded { resource, id },
        403 if parsed.error.has_reason(QUOTA_REASONS)
            || message.starts_with(QUOTA_MESSAGE_PREFIX) =>
        {
            UpstreamError::QuotaExceeded { resource, id }
        }
        403 => UpstreamError::Forbidden {
            resource,
            id,
            message,
        },
        _ => UpstreamError::Status {
            resource,
            id,
            status,
            message,
        },
    }
}

fn next_token(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}

#[async_trait]
impl VideoSource for YouTubeClient {
    async fn search_channels(
        &self,
        term: &str,
        page_token: Option<&str>,
    ) -> UpstreamResult<SearchPage<ChannelRef>> {
        let page = self
            .search(
                &[("q", term), ("type", "channel"), ("order", "viewCount")],
                page_token,
                term,
            )
            .await?;

        Ok(SearchPage {
            items: page
                .items
                .into_iter()
                .filter_map(SearchResult::into_channel_ref)
                .collect(),
            next_page_token: next_token(page.next_page_token),
        })
    }

    async fn search_videos_by_channel(
        &self,
        channel_id: &str,
        page_token: Option<&str>,
    ) -> UpstreamResult<SearchPage<VideoRef>> {
        let page = self
            .search(
                &[("channelId", channel_id), ("type", "video"), ("order", "date")],
                page_token,
                channel_id,
            )
            .await?;

        Ok(SearchPage {
            items: page
                .items
                .into_iter()
                .filter_map(SearchResult::into_video_ref)
                .collect(),
            next_page_token: next_token(page.next_page_token),
        })
    }

    async fn search_videos(&self, term: &str) -> UpstreamResult<Vec<VideoRef>> {
        let page = self
            .search(&[("q", term), ("type", "video")], None, term)
            .await?;

        Ok(page
            .items
            .into_iter()
            .filter_map(SearchResult::into_video_ref)
            .collect())
    }

    async fn get_channel(&self, channel_id: &str) -> UpstreamResult<ChannelCandidate> {
        let response: ListResponse<ApiChannel> = self
            .fetch(
                &self.endpoints.channels,
                &[("part", "snippet,statistics"), ("id", channel_id)],
                Resource::Channel,
                channel_id,
            )
            .await?;

        let channel = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| UpstreamError::NotFound {
                resource: Resource::Channel,
                id: channel_id.to_string(),
            })?;

        channel
            .into_candidate()
            .map_err(|message| UpstreamError::Decode {
                resource: Resource::Channel,
                id: channel_id.to_string(),
                message,
            })
    }

    async fn get_video(&self, video_id: &str) -> UpstreamResult<VideoDetail> {
        let response: ListResponse<ApiVideo> = self
            .fetch(
                &self.endpoints.videos,
                &[("part", "snippet,statistics"), ("id", video_id)],
                Resource::Video,
                video_id,
            )
            .await?;

        response
            .items
            .into_iter()
            .next()
            .map(ApiVideo::into_detail)
            .ok_or_else(|| UpstreamError::NotFound {
                resource: Resource::Video,
                id: video_id.to_string(),
            })
    }

    async fn list_top_level_comments(&self, video_id: &str) -> UpstreamResult<Vec<CommentRecord>> {
        let response: ListResponse<ApiCommentThread> = self
            .fetch(
                &self.endpoints.comment_threads,
                &[
                    ("part", "snippet"),
                    ("videoId", video_id),
                    ("maxResults", self.page_size.as_str()),
                    ("textFormat", "plainText"),
                ],
                Resource::CommentThreads,
                video_id,
            )
            .await?;

        Ok(response
            .items
            .into_iter()
            .map(|thread| thread.into_record(video_id))
            .collect())
    }
}
