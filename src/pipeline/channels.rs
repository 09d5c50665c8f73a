use super::pagination::{PageEnd, collect_pages};
use super::{Pipeline, RunCounter};
use crate::error::{Error, Result};
use crate::metrics::{avg_daily, days_since, like_ratio};
use crate::retry::with_retry;
use crate::types::{ChannelCandidate, ChannelQuery, ChannelRef, ChannelRow, Discovery, VideoRef};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

/// Label of the top-level channel feed in logs and `TooManyPages` errors
const CHANNEL_FEED: &str = "channel search";

/// A channel that passed every filter, with its derived metrics
struct QualifiedChannel {
    candidate: ChannelCandidate,
    days_ago: u64,
    avg_daily_contents: f64,
    avg_daily_views: f64,
}

impl Pipeline {
    /// Discover channels matching `query`, measured against the current time
    pub async fn discover_channels(&self, query: &ChannelQuery) -> Result<Discovery<ChannelRow>> {
        self.discover_channels_at(query, Utc::now()).await
    }

    /// Discover channels matching `query`, computing channel ages relative to `now`
    pub async fn discover_channels_at(
        &self,
        query: &ChannelQuery,
        now: DateTime<Utc>,
    ) -> Result<Discovery<ChannelRow>> {
        let counter = RunCounter::default();
        let candidates = self.channel_feed(&query.term, &counter).await?;

        tracing::debug!(
            term = %query.term,
            candidates = candidates.len(),
            "Channel search complete, enriching candidates"
        );

        let rows: Vec<Vec<ChannelRow>> = stream::iter(candidates)
            .map(|candidate| self.enrich_channel(candidate, query, now, &counter))
            .buffered(self.concurrency())
            .collect()
            .await;
        let rows: Vec<ChannelRow> = rows.into_iter().flatten().collect();

        let stats = counter.snapshot();
        tracing::info!(
            term = %query.term,
            rows = rows.len(),
            api_calls = stats.api_calls,
            pages = stats.pages,
            skipped = stats.skipped_items,
            "Channel discovery finished"
        );

        Ok(Discovery { rows, stats })
    }

    /// Every channel search hit for `term`, across pages
    async fn channel_feed(&self, term: &str, counter: &RunCounter) -> Result<Vec<ChannelRef>> {
        let max_pages = self.config.max_search_pages;
        let paged = collect_pages(max_pages, |token| async move {
            with_retry(&self.search_retry, || {
                counter.call();
                self.source.search_channels(term, token.as_deref())
            })
            .await
        })
        .await;
        counter.pages(paged.pages);

        match paged.end {
            PageEnd::Exhausted => Ok(paged.items),
            PageEnd::Capped => {
                tracing::error!(
                    term,
                    limit = max_pages,
                    "Channel search still had pages left at the cap"
                );
                Err(Error::TooManyPages {
                    feed: CHANNEL_FEED.to_string(),
                    limit: max_pages,
                })
            }
            PageEnd::Failed(e) => Err(e.into()),
        }
    }

    /// Rows for one channel candidate; empty when it is filtered out or fails
    async fn enrich_channel(
        &self,
        candidate: ChannelRef,
        query: &ChannelQuery,
        now: DateTime<Utc>,
        counter: &RunCounter,
    ) -> Vec<ChannelRow> {
        let Some(channel) = self.qualify_channel(&candidate, query, now, counter).await else {
            return Vec::new();
        };

        let videos = self.channel_videos(&channel.candidate.channel_id, counter).await;

        let mut rows = Vec::with_capacity(videos.len());
        for video in videos {
            counter.call();
            match self.source.get_video(&video.video_id).await {
                Ok(detail) => {
                    let thumbnail_url = if video.thumbnail_url.is_empty() {
                        detail.thumbnail_url
                    } else {
                        video.thumbnail_url
                    };
                    rows.push(ChannelRow {
                        url: watch_url(&detail.video_id),
                        video_id: detail.video_id,
                        thumbnail_url,
                        like_ratio: like_ratio(detail.like_count, detail.dislike_count),
                        view_count: detail.view_count,
                        comment_count: detail.comment_count,
                        channel_id: channel.candidate.channel_id.clone(),
                        channel_name: channel.candidate.title.clone(),
                        subscriber_count: channel.candidate.subscriber_count,
                        video_count: channel.candidate.video_count,
                        avg_daily_content: channel.avg_daily_contents,
                        avg_daily_views: channel.avg_daily_views,
                        days_since_creation: channel.days_ago,
                        channel_created_at: channel.candidate.published_at,
                        created_at: now,
                    });
                }
                Err(e) => {
                    counter.skip();
                    tracing::warn!(
                        video_id = %video.video_id,
                        channel_id = %channel.candidate.channel_id,
                        error = %e,
                        "Skipping video: statistics lookup failed"
                    );
                }
            }
        }

        rows
    }

    /// Fetch channel statistics and apply the subscriber and age thresholds
    async fn qualify_channel(
        &self,
        candidate: &ChannelRef,
        query: &ChannelQuery,
        now: DateTime<Utc>,
        counter: &RunCounter,
    ) -> Option<QualifiedChannel> {
        counter.call();
        let mut channel = match self.source.get_channel(&candidate.channel_id).await {
            Ok(channel) => channel,
            Err(e) => {
                counter.skip();
                tracing::warn!(
                    channel_id = %candidate.channel_id,
                    error = %e,
                    "Skipping channel: statistics lookup failed"
                );
                return None;
            }
        };
        if channel.title.is_empty() {
            channel.title = candidate.title.clone();
        }

        if channel.subscriber_count < query.min_subscribers {
            tracing::debug!(
                channel_id = %channel.channel_id,
                subscribers = channel.subscriber_count,
                "Channel below subscriber threshold"
            );
            return None;
        }

        let days_ago = days_since(channel.published_at, now);
        if days_ago < query.min_days {
            tracing::debug!(channel_id = %channel.channel_id, days_ago, "Channel too young");
            return None;
        }

        // created less than a day ago: per-day averages are undefined
        let (Some(avg_daily_contents), Some(avg_daily_views)) = (
            avg_daily(channel.video_count, days_ago),
            avg_daily(channel.subscriber_count, days_ago),
        ) else {
            tracing::debug!(channel_id = %channel.channel_id, "Channel created today, excluded");
            return None;
        };

        Some(QualifiedChannel {
            candidate: channel,
            days_ago,
            avg_daily_contents,
            avg_daily_views,
        })
    }

    /// Videos of a qualified channel; pagination trouble truncates the list
    async fn channel_videos(&self, channel_id: &str, counter: &RunCounter) -> Vec<VideoRef> {
        let max_pages = self.config.max_video_pages;
        let paged = collect_pages(max_pages, |token| async move {
            counter.call();
            self.source
                .search_videos_by_channel(channel_id, token.as_deref())
                .await
        })
        .await;
        counter.pages(paged.pages);

        match paged.end {
            PageEnd::Exhausted => {}
            PageEnd::Capped => {
                tracing::warn!(
                    channel_id,
                    limit = max_pages,
                    videos = paged.items.len(),
                    "Channel video list truncated at page cap"
                );
            }
            PageEnd::Failed(e) => {
                counter.skip();
                tracing::warn!(
                    channel_id,
                    error = %e,
                    videos = paged.items.len(),
                    "Channel video listing failed, keeping videos fetched so far"
                );
            }
        }

        paged.items
    }
}

fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", video_id)
}
