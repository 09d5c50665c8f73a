//! In-process object store

use super::store::{BlobWriter, ObjectStore, StoreResult, WriteOptions, WriterState};
use crate::error::StoreError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A committed object
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// Object contents
    pub data: Vec<u8>,
    /// MIME type given at open
    pub content_type: String,
    /// Retention expiry given at open
    pub retain_until: Option<DateTime<Utc>>,
}

type Objects = Arc<RwLock<HashMap<(String, String), StoredObject>>>;

/// [`ObjectStore`] that keeps objects in memory, for local runs and tests
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    objects: Objects,
}

impl MemoryStore {
    /// An empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a committed object
    pub async fn get(&self, bucket: &str, name: &str) -> Option<StoredObject> {
        self.objects
            .read()
            .await
            .get(&(bucket.to_string(), name.to_string()))
            .cloned()
    }

    /// Names of all committed objects in `bucket`, sorted
    pub async fn list(&self, bucket: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .objects
            .read()
            .await
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn open(
        &self,
        bucket: &str,
        name: &str,
        options: WriteOptions,
    ) -> StoreResult<Box<dyn BlobWriter>> {
        Ok(Box::new(MemoryWriter {
            objects: self.objects.clone(),
            key: (bucket.to_string(), name.to_string()),
            options,
            buffer: Vec::new(),
            state: WriterState::Open,
        }))
    }

    async fn link(&self, bucket: &str, name: &str) -> StoreResult<String> {
        let key = (bucket.to_string(), name.to_string());
        if self.objects.read().await.contains_key(&key) {
            Ok(format!("memory://{}/{}", bucket, name))
        } else {
            Err(StoreError::NotFound(name.to_string()))
        }
    }
}

struct MemoryWriter {
    objects: Objects,
    key: (String, String),
    options: WriteOptions,
    buffer: Vec<u8>,
    state: WriterState,
}

#[async_trait]
impl BlobWriter for MemoryWriter {
    async fn write(&mut self, bytes: &[u8]) -> StoreResult<()> {
        if self.state != WriterState::Open {
            return Err(StoreError::Finished(self.key.1.clone()));
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn close(&mut self) -> StoreResult<()> {
        match self.state {
            WriterState::Closed => return Ok(()),
            WriterState::Aborted => return Err(StoreError::Finished(self.key.1.clone())),
            WriterState::Open => {}
        }
        let object = StoredObject {
            data: std::mem::take(&mut self.buffer),
            content_type: self.options.content_type.clone(),
            retain_until: self.options.retain_until,
        };
        self.objects.write().await.insert(self.key.clone(), object);
        self.state = WriterState::Closed;
        Ok(())
    }

    async fn abort(&mut self) -> StoreResult<()> {
        if self.state == WriterState::Open {
            self.buffer.clear();
            self.state = WriterState::Aborted;
        }
        Ok(())
    }
}
