//! The service facade tying the pipeline to the exporter

use crate::config::{Config, StorageBackend};
use crate::error::{ApiError, Error, Result};
use crate::export::{Exporter, ExportRow, GcsStore, MemoryStore, ObjectStore};
use crate::pipeline::Pipeline;
use crate::types::{ChannelQuery, ChannelRow, CommentQuery, CommentRow, Discovery, Report};
use crate::youtube::{ApiCallCounter, VideoSource, YouTubeClient};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Discovery service: runs queries, exports the rows and builds the report
///
/// Cloning is cheap; clones share the call counter and shutdown token.
#[derive(Clone, Debug)]
pub struct YouTubeData {
    config: Arc<Config>,
    pipeline: Pipeline,
    exporter: Option<Exporter>,
    calls: Arc<ApiCallCounter>,
    shutdown: CancellationToken,
}

impl YouTubeData {
    /// Validate `config` and build the YouTube client and object store it describes
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let calls = Arc::new(ApiCallCounter::new());
        let source = Arc::new(YouTubeClient::new(&config.youtube, calls.clone())?);

        let store = if config.export.enabled {
            let store: Arc<dyn ObjectStore> = match config.storage.backend {
                StorageBackend::Gcs => Arc::new(GcsStore::new(&config.storage)?),
                StorageBackend::Memory => Arc::new(MemoryStore::new()),
            };
            Some(store)
        } else {
            None
        };

        tracing::info!(
            backend = ?config.storage.backend,
            project_id = config.storage.project_id.as_deref().unwrap_or("-"),
            bucket = %config.export.bucket,
            export_enabled = config.export.enabled,
            "youtube-data service initialized"
        );

        Ok(Self::with_components(config, source, store, calls))
    }

    /// Assemble the service from pre-built parts
    ///
    /// `store` is ignored when export is disabled in `config`. Nothing is
    /// validated here.
    pub fn with_components(
        config: Config,
        source: Arc<dyn VideoSource>,
        store: Option<Arc<dyn ObjectStore>>,
        calls: Arc<ApiCallCounter>,
    ) -> Self {
        let shutdown = CancellationToken::new();
        let pipeline = Pipeline::new(
            source,
            config.pipeline.clone(),
            config.youtube.retry.clone(),
        );
        let exporter = store
            .filter(|_| config.export.enabled)
            .map(|store| Exporter::new(store, config.export.clone(), shutdown.clone()));

        Self {
            config: Arc::new(config),
            pipeline,
            exporter,
            calls,
            shutdown,
        }
    }

    /// Find qualifying channels and their videos, then export the rows
    pub async fn channel_report(&self, query: &ChannelQuery) -> Result<Report<ChannelRow>> {
        let discovery = self.pipeline.discover_channels(query).await?;
        Ok(self.finish(&query.term, discovery).await)
    }

    /// Collect comments for videos matching the term, then export the rows
    pub async fn comment_report(&self, query: &CommentQuery) -> Result<Report<CommentRow>> {
        let discovery = self.pipeline.discover_comments(query).await?;
        Ok(self.finish(&query.term, discovery).await)
    }

    /// Export the rows if enabled; an export failure is reported, never raised
    async fn finish<R: ExportRow>(&self, term: &str, discovery: Discovery<R>) -> Report<R> {
        let mut report = Report {
            query: term.to_string(),
            link: None,
            rows: Vec::new(),
            api_calls: discovery.stats.api_calls,
            export_failed: false,
            error: None,
        };

        if let Some(exporter) = &self.exporter {
            match exporter.export(&discovery.rows, term).await {
                Ok(receipt) => report.link = Some(receipt.link),
                Err(e) => {
                    tracing::error!(term, rows = discovery.rows.len(), error = %e, "Export failed");
                    report.export_failed = true;
                    report.error = Some(ApiError::from(Error::Export(e)).error);
                }
            }
        }

        report.rows = discovery.rows;
        report
    }

    /// External calls issued since startup
    pub fn api_calls(&self) -> u64 {
        self.calls.get()
    }

    /// Configuration the service was built from
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Token cancelled when the service shuts down
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Begin shutdown: pending export retries give up and the API server drains
    pub fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!("Shutting down youtube-data service");
            self.shutdown.cancel();
        }
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RetryConfig;
    use crate::error::UpstreamError;
    use crate::export::{BlobWriter, StoreResult, WriteOptions};
    use crate::types::{
        ChannelCandidate, ChannelRef, CommentRecord, SearchPage, VideoDetail, VideoRef,
    };
    use crate::youtube::UpstreamResult;
    use async_trait::async_trait;
    use std::time::Duration;

    /// Source with a single commented video and no channels
    struct OneVideo;

    #[async_trait]
    impl VideoSource for OneVideo {
        async fn search_channels(
            &self,
            _: &str,
            _: Option<&str>,
        ) -> UpstreamResult<SearchPage<ChannelRef>> {
            Ok(SearchPage::last(Vec::new()))
        }

        async fn search_videos_by_channel(
            &self,
            _: &str,
            _: Option<&str>,
        ) -> UpstreamResult<SearchPage<VideoRef>> {
            Ok(SearchPage::last(Vec::new()))
        }

        async fn search_videos(&self, _: &str) -> UpstreamResult<Vec<VideoRef>> {
            Ok(vec![VideoRef {
                video_id: "v1".into(),
                title: "cat".into(),
                thumbnail_url: String::new(),
            }])
        }

        async fn get_channel(&self, id: &str) -> UpstreamResult<ChannelCandidate> {
            Err(UpstreamError::NotFound {
                resource: crate::error::Resource::Channel,
                id: id.into(),
            })
        }

        async fn get_video(&self, id: &str) -> UpstreamResult<VideoDetail> {
            Ok(VideoDetail {
                video_id: id.into(),
                thumbnail_url: String::new(),
                view_count: 1,
                like_count: 2,
                dislike_count: 0,
                comment_count: 1,
                channel_id: "UC1".into(),
            })
        }

        async fn list_top_level_comments(&self, id: &str) -> UpstreamResult<Vec<CommentRecord>> {
            Ok(vec![CommentRecord {
                video_id: id.into(),
                author_name: "Alice".into(),
                author_channel_id: "UCa".into(),
                text: "hi".into(),
                like_count: 0,
                reply_count: 0,
                published_at: "2024-01-01T00:00:00Z".into(),
            }])
        }
    }

    /// Store whose uploads never commit
    struct BrokenStore;

    #[async_trait]
    impl ObjectStore for BrokenStore {
        async fn open(
            &self,
            _: &str,
            name: &str,
            _: WriteOptions,
        ) -> StoreResult<Box<dyn BlobWriter>> {
            Err(crate::error::StoreError::NotFound(name.into()))
        }

        async fn link(&self, _: &str, name: &str) -> StoreResult<String> {
            Err(crate::error::StoreError::NotFound(name.into()))
        }
    }

    fn config(export: bool) -> Config {
        let mut config = Config::default();
        config.youtube.api_key = "k".into();
        config.youtube.retry = RetryConfig::fixed(1, Duration::from_millis(1));
        config.export.enabled = export;
        config
    }

    #[tokio::test]
    async fn report_carries_link_from_store() {
        let store = MemoryStore::new();
        let service = YouTubeData::with_components(
            config(true),
            Arc::new(OneVideo),
            Some(Arc::new(store.clone()) as Arc<dyn ObjectStore>),
            Arc::new(ApiCallCounter::new()),
        );

        let report = service
            .comment_report(&CommentQuery { term: "cats".into() })
            .await
            .unwrap();

        assert_eq!(report.query, "cats");
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.api_calls, 3);
        assert!(!report.export_failed);
        let link = report.link.unwrap();
        assert!(link.starts_with("memory://data-sdy/youtube-data-comment-cats-"));
        assert_eq!(store.list("data-sdy").await.len(), 1);
    }

    #[tokio::test]
    async fn export_failure_keeps_rows() {
        let service = YouTubeData::with_components(
            config(true),
            Arc::new(OneVideo),
            Some(Arc::new(BrokenStore) as Arc<dyn ObjectStore>),
            Arc::new(ApiCallCounter::new()),
        );

        let report = service
            .comment_report(&CommentQuery { term: "cats".into() })
            .await
            .unwrap();

        assert!(report.export_failed);
        assert!(report.link.is_none());
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.error.unwrap().code, "export_failed");
    }

    #[tokio::test]
    async fn disabled_export_yields_no_link() {
        let service = YouTubeData::with_components(
            config(false),
            Arc::new(OneVideo),
            Some(Arc::new(MemoryStore::new()) as Arc<dyn ObjectStore>),
            Arc::new(ApiCallCounter::new()),
        );

        let report = service
            .channel_report(&ChannelQuery {
                term: "cats".into(),
                min_subscribers: 0,
                min_days: 0,
            })
            .await
            .unwrap();

        assert!(report.rows.is_empty());
        assert!(report.link.is_none());
        assert!(!report.export_failed);
    }

    #[test]
    fn new_rejects_invalid_config() {
        assert!(matches!(
            YouTubeData::new(Config::default()),
            Err(Error::Config { .. })
        ));
    }

    #[test]
    fn shutdown_cancels_token_once() {
        let service = YouTubeData::new(config(false)).unwrap();
        let token = service.shutdown_token();
        assert!(!token.is_cancelled());
        service.shutdown();
        service.shutdown();
        assert!(token.is_cancelled());
    }
}
