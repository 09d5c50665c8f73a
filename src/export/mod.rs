//! CSV export of discovery rows to an object store
//!
//! The exporter serializes rows before touching the store, writes the payload
//! through a [`BlobWriter`], retries `close` under the configured policy and
//! finally resolves a durable link. A writer that was opened is always either
//! closed or aborted.

mod csv;
mod gcs;
mod memory;
mod store;

pub use gcs::GcsStore;
pub use memory::{MemoryStore, StoredObject};
pub use store::{BlobWriter, ObjectStore, StoreResult, WriteOptions};

use crate::config::ExportConfig;
use crate::error::{ExportError, StoreError};
use crate::retry::{backoff, next_delay_for};
use crate::types::{ChannelRow, CommentRow, ExportReceipt};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Content type of every exported object
pub const CSV_CONTENT_TYPE: &str = "text/csv";

mod sealed {
    pub trait Sealed {}
    impl Sealed for crate::types::ChannelRow {}
    impl Sealed for crate::types::CommentRow {}
}

/// A row type that can be exported
///
/// Implemented for [`ChannelRow`] and [`CommentRow`] only.
pub trait ExportRow: Serialize + Send + Sync + sealed::Sealed {
    /// Row kind used in object names
    const KIND: &'static str;
    /// CSV header, in serialization order
    const HEADERS: &'static [&'static str];
}

impl ExportRow for ChannelRow {
    const KIND: &'static str = "channel";
    const HEADERS: &'static [&'static str] = &[
        "video_id",
        "url",
        "thumbnail_url",
        "like_rate",
        "view_count",
        "comment_count",
        "channel_id",
        "channel_name",
        "subscriber_count",
        "video_contents",
        "avg_daily_contents",
        "avg_daily_views",
        "days_ago",
        "channel_created_at",
        "created_at",
    ];
}

impl ExportRow for CommentRow {
    const KIND: &'static str = "comment";
    const HEADERS: &'static [&'static str] = &[
        "video_id",
        "like",
        "comments",
        "name",
        "name_id",
        "comment",
        "favo",
        "replay",
        "created_at",
    ];
}

/// Object name for an export: `{prefix}-{kind}-{term}-{id}.csv`
///
/// Path separators and control characters in `term` become `_`.
pub fn object_name(prefix: &str, kind: &str, term: &str, id: Uuid) -> String {
    let term: String = term
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    format!("{}-{}-{}-{}.csv", prefix, kind, term, id)
}

/// Writes row sets as CSV objects
#[derive(Clone)]
pub struct Exporter {
    store: Arc<dyn ObjectStore>,
    config: ExportConfig,
    shutdown: CancellationToken,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Exporter {
    /// Create an exporter; cancelling `shutdown` interrupts close retries
    pub fn new(
        store: Arc<dyn ObjectStore>,
        config: ExportConfig,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            store,
            config,
            shutdown,
        }
    }

    /// Export `rows` found for `term`
    pub async fn export<R: ExportRow>(
        &self,
        rows: &[R],
        term: &str,
    ) -> Result<ExportReceipt, ExportError> {
        self.export_at(rows, term, Utc::now()).await
    }

    /// Export `rows`, anchoring the retention window at `now`
    pub async fn export_at<R: ExportRow>(
        &self,
        rows: &[R],
        term: &str,
        now: DateTime<Utc>,
    ) -> Result<ExportReceipt, ExportError> {
        let payload = csv::encode(rows)?;
        let object = object_name(&self.config.file_prefix, R::KIND, term, Uuid::new_v4());
        let bucket = self.config.bucket.as_str();

        let retain_until = chrono::Duration::from_std(self.config.retention)
            .ok()
            .filter(|retention| !retention.is_zero())
            .and_then(|retention| now.checked_add_signed(retention));
        let options = WriteOptions {
            content_type: CSV_CONTENT_TYPE.to_string(),
            retain_until,
        };

        let writer = self
            .store
            .open(bucket, &object, options)
            .await
            .map_err(|e| ExportError::Open {
                object: object.clone(),
                reason: e.to_string(),
            })?;

        let mut pending = PendingUpload::new(writer, &object);
        let uploaded = match pending.writer() {
            Some(writer) => self.upload(writer, &payload, &object).await,
            None => Ok(()),
        };
        pending.settle();
        uploaded?;

        let link = self
            .store
            .link(bucket, &object)
            .await
            .map_err(|e| ExportError::Link {
                object: object.clone(),
                reason: e.to_string(),
            })?;

        tracing::info!(
            bucket,
            object = %object,
            rows = rows.len(),
            bytes = payload.len(),
            "Export complete"
        );

        Ok(ExportReceipt {
            object_name: object,
            link,
            bytes: payload.len() as u64,
        })
    }

    /// Write the payload and close; `writer` is closed or aborted on return
    async fn upload(
        &self,
        writer: &mut dyn BlobWriter,
        payload: &[u8],
        object: &str,
    ) -> Result<(), ExportError> {
        if let Err(e) = writer.write(payload).await {
            abort(writer, object).await;
            return Err(ExportError::Write {
                object: object.to_string(),
                reason: e.to_string(),
            });
        }

        self.close_with_retry(writer, object).await
    }

    /// Close `writer`, retrying under `close_retry`; aborts it when giving up
    async fn close_with_retry(
        &self,
        writer: &mut dyn BlobWriter,
        object: &str,
    ) -> Result<(), ExportError> {
        let policy = &self.config.close_retry;
        let max_attempts = policy.max_attempts.max(1);
        let mut delay = policy.initial_delay;
        let mut attempt = 1;

        loop {
            let error = match writer.close().await {
                Ok(()) => {
                    if attempt > 1 {
                        tracing::info!(object, attempts = attempt, "Close succeeded after retry");
                    }
                    return Ok(());
                }
                Err(e) => e,
            };

            // a finished writer never accepts another close
            if attempt >= max_attempts || matches!(error, StoreError::Finished(_)) {
                tracing::error!(object, attempts = attempt, error = %error, "Giving up on close");
                abort(writer, object).await;
                return Err(ExportError::CloseExhausted {
                    object: object.to_string(),
                    attempts: attempt,
                    reason: error.to_string(),
                });
            }

            tracing::warn!(
                object,
                attempt,
                max_attempts,
                error = %error,
                "Close failed, retrying"
            );

            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    tracing::warn!(object, "Shutdown requested, abandoning export");
                    abort(writer, object).await;
                    return Err(ExportError::Cancelled { object: object.to_string() });
                }
                _ = tokio::time::sleep(next_delay_for(policy, delay)) => {}
            }

            delay = backoff(policy, delay);
            attempt += 1;
        }
    }
}

/// An opened writer that must be closed or aborted
///
/// Dropping it unsettled (the export future was dropped mid-upload, e.g. on
/// client disconnect) aborts the writer on a background task so the upload
/// session is released.
struct PendingUpload {
    writer: Option<Box<dyn BlobWriter>>,
    object: String,
}

impl PendingUpload {
    fn new(writer: Box<dyn BlobWriter>, object: &str) -> Self {
        Self {
            writer: Some(writer),
            object: object.to_string(),
        }
    }

    /// The open writer; `None` once settled
    fn writer(&mut self) -> Option<&mut (dyn BlobWriter + 'static)> {
        self.writer.as_deref_mut()
    }

    /// The writer was closed or aborted explicitly
    fn settle(&mut self) {
        self.writer = None;
    }
}

impl Drop for PendingUpload {
    fn drop(&mut self) {
        let Some(mut writer) = self.writer.take() else {
            return;
        };
        let object = std::mem::take(&mut self.object);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                tracing::warn!(object = %object, "Export dropped mid-upload, aborting writer");
                handle.spawn(async move {
                    abort(writer.as_mut(), &object).await;
                });
            }
            Err(_) => {
                tracing::warn!(
                    object = %object,
                    "Export dropped outside a runtime, upload left open"
                );
            }
        }
    }
}

async fn abort(writer: &mut dyn BlobWriter, object: &str) {
    if let Err(e) = writer.abort().await {
        tracing::warn!(object, error = %e, "Failed to abort upload");
    }
}
