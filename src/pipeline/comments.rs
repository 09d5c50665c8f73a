use super::{Pipeline, RunCounter};
use crate::error::Result;
use crate::retry::with_retry;
use crate::types::{CommentQuery, CommentRow, Discovery, VideoRef};
use futures::stream::{self, StreamExt};

impl Pipeline {
    /// Collect top-level comments of the videos matching `query`
    ///
    /// Only the first page of video search results is used. Every row carries
    /// its video's like and comment totals.
    pub async fn discover_comments(&self, query: &CommentQuery) -> Result<Discovery<CommentRow>> {
        let counter = RunCounter::default();

        let videos = with_retry(&self.search_retry, || {
            counter.call();
            self.source.search_videos(&query.term)
        })
        .await?;
        counter.pages(1);

        tracing::debug!(term = %query.term, videos = videos.len(), "Video search complete");

        let rows: Vec<Vec<CommentRow>> = stream::iter(videos)
            .map(|video| self.video_comments(video, &counter))
            .buffered(self.concurrency())
            .collect()
            .await;
        let rows: Vec<CommentRow> = rows.into_iter().flatten().collect();

        let stats = counter.snapshot();
        tracing::info!(
            term = %query.term,
            rows = rows.len(),
            api_calls = stats.api_calls,
            skipped = stats.skipped_items,
            "Comment discovery finished"
        );

        Ok(Discovery { rows, stats })
    }

    async fn video_comments(&self, video: VideoRef, counter: &RunCounter) -> Vec<CommentRow> {
        counter.call();
        let detail = match self.source.get_video(&video.video_id).await {
            Ok(detail) => detail,
            Err(e) => {
                counter.skip();
                tracing::warn!(
                    video_id = %video.video_id,
                    error = %e,
                    "Skipping video: statistics lookup failed"
                );
                return Vec::new();
            }
        };

        counter.call();
        let comments = match self.source.list_top_level_comments(&video.video_id).await {
            Ok(comments) => comments,
            Err(e) => {
                counter.skip();
                tracing::warn!(
                    video_id = %video.video_id,
                    error = %e,
                    "Skipping video: comment listing failed"
                );
                return Vec::new();
            }
        };

        comments
            .into_iter()
            .map(|comment| CommentRow {
                video_id: video.video_id.clone(),
                video_like_count: detail.like_count,
                video_comment_count: detail.comment_count,
                author_name: comment.author_name,
                author_channel_id: comment.author_channel_id,
                text: comment.text,
                like_count: comment.like_count,
                reply_count: comment.reply_count,
                published_at: comment.published_at,
            })
            .collect()
    }
}
