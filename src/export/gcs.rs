//! Google Cloud Storage backend over the JSON API
//!
//! Uploads use a resumable session: `open` creates the session with the
//! object metadata, `write` buffers locally, and `close` sends the whole
//! payload in one `PUT`. Until that `PUT` succeeds nothing is committed, so a
//! failed close can be retried against the same session and `abort` simply
//! deletes it.

use super::store::{BlobWriter, ObjectStore, StoreResult, WriteOptions, WriterState};
use crate::config::StorageConfig;
use crate::error::{Error, Result, StoreError};
use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, LOCATION};
use serde::Deserialize;
use url::Url;

/// GCS answers a successful session cancel with this non-standard status
const SESSION_CANCELLED: u16 = 499;

/// [`ObjectStore`] backed by a GCS bucket
#[derive(Debug, Clone)]
pub struct GcsStore {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectResource {
    #[serde(default)]
    media_link: Option<String>,
}

impl GcsStore {
    /// Build a store from configuration
    pub fn new(config: &StorageConfig) -> Result<Self> {
        let endpoint = format!("{}/", config.endpoint.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|e| {
            Error::config(
                "GCS_ENDPOINT",
                format!("invalid endpoint '{}': {}", config.endpoint, e),
            )
        })?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("youtube-data/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> StoreResult<Url> {
        self.endpoint
            .join(path)
            .map_err(|e| StoreError::Other(format!("invalid object URL {}: {}", path, e)))
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        authorize(request, self.access_token.as_deref())
    }
}

fn authorize(request: reqwest::RequestBuilder, token: Option<&str>) -> reqwest::RequestBuilder {
    match token {
        Some(token) => request.bearer_auth(token),
        None => request,
    }
}

async fn status_error(response: reqwest::Response) -> StoreError {
    let status = response.status().as_u16();
    let message = response.text().await.unwrap_or_default();
    StoreError::Status {
        status,
        message: message.trim().chars().take(200).collect(),
    }
}

fn upload_metadata(name: &str, options: &WriteOptions) -> serde_json::Value {
    let mut metadata = serde_json::json!({
        "name": name,
        "contentType": options.content_type,
    });
    if let Some(until) = options.retain_until {
        metadata["retention"] = serde_json::json!({
            "mode": "Unlocked",
            "retainUntilTime": until.to_rfc3339(),
        });
    }
    metadata
}

#[async_trait]
impl ObjectStore for GcsStore {
    async fn open(
        &self,
        bucket: &str,
        name: &str,
        options: WriteOptions,
    ) -> StoreResult<Box<dyn BlobWriter>> {
        let mut url = self.url(&format!(
            "upload/storage/v1/b/{}/o",
            urlencoding::encode(bucket)
        ))?;
        url.query_pairs_mut()
            .append_pair("uploadType", "resumable")
            .append_pair("name", name);

        let response = self
            .authorize(self.http.post(url))
            .header("X-Upload-Content-Type", options.content_type.as_str())
            .json(&upload_metadata(name, &options))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| StoreError::Other("upload session response has no Location".into()))?;
        // absolute in production, resolved against the endpoint otherwise
        let session = self.url(location)?;

        tracing::debug!(bucket, object = name, "Opened GCS upload session");

        Ok(Box::new(GcsWriter {
            http: self.http.clone(),
            access_token: self.access_token.clone(),
            session,
            name: name.to_string(),
            content_type: options.content_type,
            buffer: Vec::new(),
            state: WriterState::Open,
        }))
    }

    async fn link(&self, bucket: &str, name: &str) -> StoreResult<String> {
        let url = self.url(&format!(
            "storage/v1/b/{}/o/{}",
            urlencoding::encode(bucket),
            urlencoding::encode(name)
        ))?;
        let response = self.authorize(self.http.get(url)).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(name.to_string()));
        }
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        let object: ObjectResource = response.json().await?;
        object
            .media_link
            .filter(|link| !link.is_empty())
            .ok_or_else(|| StoreError::Other(format!("object {} has no mediaLink", name)))
    }
}

struct GcsWriter {
    http: reqwest::Client,
    access_token: Option<String>,
    session: Url,
    name: String,
    content_type: String,
    buffer: Vec<u8>,
    state: WriterState,
}

#[async_trait]
impl BlobWriter for GcsWriter {
    async fn write(&mut self, bytes: &[u8]) -> StoreResult<()> {
        if self.state != WriterState::Open {
            return Err(StoreError::Finished(self.name.clone()));
        }
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    async fn close(&mut self) -> StoreResult<()> {
        match self.state {
            WriterState::Closed => return Ok(()),
            WriterState::Aborted => return Err(StoreError::Finished(self.name.clone())),
            WriterState::Open => {}
        }

        let request = self
            .http
            .put(self.session.clone())
            .header(CONTENT_TYPE, self.content_type.as_str())
            .body(self.buffer.clone());
        let response = authorize(request, self.access_token.as_deref())
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(status_error(response).await);
        }

        self.state = WriterState::Closed;
        self.buffer = Vec::new();
        tracing::debug!(object = %self.name, "GCS upload committed");
        Ok(())
    }

    async fn abort(&mut self) -> StoreResult<()> {
        if self.state != WriterState::Open {
            return Ok(());
        }
        self.state = WriterState::Aborted;
        self.buffer = Vec::new();

        let request = self.http.delete(self.session.clone());
        let response = authorize(request, self.access_token.as_deref())
            .send()
            .await?;
        let status = response.status();
        if status.is_success()
            || status.as_u16() == SESSION_CANCELLED
            || status == reqwest::StatusCode::NOT_FOUND
        {
            Ok(())
        } else {
            Err(status_error(response).await)
        }
    }
}
