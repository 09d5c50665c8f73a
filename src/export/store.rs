//! Object store abstraction used by the exporter

use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of an object store operation
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Metadata attached to a new object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WriteOptions {
    /// MIME type of the payload
    pub content_type: String,
    /// The object may not be deleted before this instant
    pub retain_until: Option<DateTime<Utc>>,
}

/// A bucket-addressed blob store
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Start writing a new object
    ///
    /// Nothing becomes visible until [`BlobWriter::close`] succeeds.
    async fn open(
        &self,
        bucket: &str,
        name: &str,
        options: WriteOptions,
    ) -> StoreResult<Box<dyn BlobWriter>>;

    /// Durable access link for a stored object
    async fn link(&self, bucket: &str, name: &str) -> StoreResult<String>;
}

/// An in-progress object upload
#[async_trait]
pub trait BlobWriter: Send {
    /// Append bytes to the object
    async fn write(&mut self, bytes: &[u8]) -> StoreResult<()>;

    /// Commit the object; may be called again after a failure
    async fn close(&mut self) -> StoreResult<()>;

    /// Release the upload without committing anything
    async fn abort(&mut self) -> StoreResult<()>;
}

/// Lifecycle of a writer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WriterState {
    Open,
    Closed,
    Aborted,
}
