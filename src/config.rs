//! Configuration types for youtube-data

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, time::Duration};
use utoipa::ToSchema;

/// YouTube Data API client settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct YouTubeConfig {
    /// API key sent with every request (required)
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the Data API (default: "https://www.googleapis.com/youtube/v3")
    #[serde(default = "default_youtube_base_url")]
    pub base_url: String,

    /// `maxResults` for search and list calls (default: 50, the API maximum)
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Timeout applied to each API call (default: 30 seconds)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub request_timeout: Duration,

    /// Retry policy for top-level search pages; per-item calls are never retried
    #[serde(default = "default_search_retry")]
    pub retry: RetryConfig,
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_youtube_base_url(),
            page_size: default_page_size(),
            request_timeout: default_request_timeout(),
            retry: default_search_retry(),
        }
    }
}

/// Enrichment pipeline limits
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct PipelineConfig {
    /// Maximum pages consumed from the channel search feed (default: 10)
    ///
    /// Reaching the cap while the source still hands out page tokens fails the
    /// request with `TooManyPages` instead of looping on a misbehaving upstream.
    #[serde(default = "default_max_search_pages")]
    pub max_search_pages: usize,

    /// Maximum pages of videos listed per channel (default: 1)
    ///
    /// Reaching this cap truncates the channel's video list; it is not an error.
    #[serde(default = "default_max_video_pages")]
    pub max_video_pages: usize,

    /// Candidates enriched concurrently (default: 4, 1 = strictly sequential)
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_search_pages: default_max_search_pages(),
            max_video_pages: default_max_video_pages(),
            concurrency: default_concurrency(),
        }
    }
}

/// Object store backend used for exports
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Google Cloud Storage JSON API (default)
    #[default]
    Gcs,
    /// In-process store, for local development
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gcs" => Ok(StorageBackend::Gcs),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(Error::config(
                "STORAGE_BACKEND",
                format!("unknown storage backend '{}', expected 'gcs' or 'memory'", other),
            )),
        }
    }
}

/// Object store connection settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct StorageConfig {
    /// Which backend to use (default: gcs)
    #[serde(default)]
    pub backend: StorageBackend,

    /// GCS endpoint (default: "https://storage.googleapis.com")
    #[serde(default = "default_gcs_endpoint")]
    pub endpoint: String,

    /// Google Cloud project id, informational (logged at startup)
    #[serde(default)]
    pub project_id: Option<String>,

    /// OAuth bearer token for GCS requests
    #[serde(default, skip_serializing)]
    pub access_token: Option<String>,

    /// Timeout applied to each store request (default: 60 seconds)
    #[serde(default = "default_store_timeout", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub request_timeout: Duration,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            endpoint: default_gcs_endpoint(),
            project_id: None,
            access_token: None,
            request_timeout: default_store_timeout(),
        }
    }
}

/// CSV export settings
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExportConfig {
    /// Upload rows to the object store (default: true)
    ///
    /// When disabled, responses carry rows but no link.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Destination bucket (default: "data-sdy")
    #[serde(default = "default_bucket")]
    pub bucket: String,

    /// Object name prefix (default: "youtube-data")
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,

    /// How long exported objects are retained, counted from export time (default: 24 hours)
    #[serde(default = "default_retention", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub retention: Duration,

    /// Close retry policy (default: 10 attempts, fixed 1 second delay)
    #[serde(default = "default_close_retry")]
    pub close_retry: RetryConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bucket: default_bucket(),
            file_prefix: default_file_prefix(),
            retention: default_retention(),
            close_retry: default_close_retry(),
        }
    }
}

/// Retry configuration for transient failures
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct RetryConfig {
    /// Total number of attempts, including the first one (default: 3)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Delay before the first retry (default: 1 second)
    #[serde(default = "default_initial_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub initial_delay: Duration,

    /// Maximum delay between retries (default: 60 seconds)
    #[serde(default = "default_max_delay", with = "duration_serde")]
    #[schema(value_type = u64)]
    pub max_delay: Duration,

    /// Multiplier for exponential backoff (default: 2.0, 1.0 = fixed delay)
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (default: true)
    #[serde(default = "default_true")]
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            initial_delay: default_initial_delay(),
            max_delay: default_max_delay(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: true,
        }
    }
}

impl RetryConfig {
    /// Fixed-delay policy: `attempts` tries spaced `delay` apart, no backoff or jitter
    pub fn fixed(attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: attempts,
            initial_delay: delay,
            max_delay: delay,
            backoff_multiplier: 1.0,
            jitter: false,
        }
    }
}

/// REST API server configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiConfig {
    /// Address to bind the API server (default: 127.0.0.1:8080)
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Enable CORS for browser access (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Serve Swagger UI at /swagger-ui (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Main configuration for the service
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// YouTube Data API client
    #[serde(default)]
    pub youtube: YouTubeConfig,

    /// Pagination caps and concurrency
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// CSV export behavior
    #[serde(default)]
    pub export: ExportConfig,

    /// Object store connection
    #[serde(default)]
    pub storage: StorageConfig,

    /// REST API server
    #[serde(default)]
    pub api: ApiConfig,
}

impl Config {
    /// Build a configuration from environment variables, loading `.env` first
    ///
    /// Recognised variables: `YOUTUBE_API_KEY` (or `APIKEY`), `YOUTUBE_API_BASE_URL`,
    /// `YOUTUBE_PAGE_SIZE`, `PROJECTID`, `BIND_HOST`, `PORT`, `EXPORT_ENABLED`,
    /// `STORAGE_BACKEND`, `BUCKET_NAME`, `FILE_PREFIX`, `GCS_ENDPOINT`,
    /// `GCS_ACCESS_TOKEN`, `EXPORT_RETENTION_HOURS`.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Config::default();

        if let Some(key) = get("YOUTUBE_API_KEY").or_else(|| get("APIKEY")) {
            config.youtube.api_key = key;
        }
        if let Some(url) = get("YOUTUBE_API_BASE_URL") {
            config.youtube.base_url = url;
        }
        if let Some(size) = get("YOUTUBE_PAGE_SIZE") {
            config.youtube.page_size = parse_env("YOUTUBE_PAGE_SIZE", &size)?;
        }

        config.storage.project_id = get("PROJECTID");
        config.storage.access_token = get("GCS_ACCESS_TOKEN");
        if let Some(endpoint) = get("GCS_ENDPOINT") {
            config.storage.endpoint = endpoint;
        }
        if let Some(backend) = get("STORAGE_BACKEND") {
            config.storage.backend = backend.parse()?;
        }

        if let Some(enabled) = get("EXPORT_ENABLED") {
            config.export.enabled = parse_env("EXPORT_ENABLED", &enabled)?;
        }
        if let Some(bucket) = get("BUCKET_NAME") {
            config.export.bucket = bucket;
        }
        if let Some(prefix) = get("FILE_PREFIX") {
            config.export.file_prefix = prefix;
        }
        if let Some(hours) = get("EXPORT_RETENTION_HOURS") {
            let hours: u64 = parse_env("EXPORT_RETENTION_HOURS", &hours)?;
            let secs = hours.checked_mul(3600).ok_or_else(|| {
                Error::config("EXPORT_RETENTION_HOURS", format!("{} hours is out of range", hours))
            })?;
            config.export.retention = Duration::from_secs(secs);
        }

        let host = get("BIND_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = get("PORT").unwrap_or_else(|| default_bind_address().port().to_string());
        config.api.bind_address = format!("{}:{}", host, port).parse().map_err(|e| {
            Error::config("PORT", format!("invalid bind address {}:{}: {}", host, port, e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the service cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.youtube.api_key.trim().is_empty() {
            return Err(Error::config(
                "YOUTUBE_API_KEY",
                "a YouTube Data API key is required",
            ));
        }
        if self.youtube.page_size == 0 {
            return Err(Error::config("YOUTUBE_PAGE_SIZE", "page size must be at least 1"));
        }
        if self.pipeline.max_search_pages == 0 || self.pipeline.max_video_pages == 0 {
            return Err(Error::config("pipeline", "page caps must be at least 1"));
        }
        if self.pipeline.concurrency == 0 {
            return Err(Error::config("pipeline.concurrency", "concurrency must be at least 1"));
        }
        if self.export.close_retry.max_attempts == 0 {
            return Err(Error::config(
                "export.close_retry.max_attempts",
                "at least one close attempt is required",
            ));
        }
        if self.export.enabled && self.export.bucket.trim().is_empty() {
            return Err(Error::config("BUCKET_NAME", "a bucket is required when export is enabled"));
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| Error::config(key, format!("invalid value '{}': {}", value, e)))
}

fn default_youtube_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".into()
}

fn default_page_size() -> u32 {
    50
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_search_retry() -> RetryConfig {
    RetryConfig::default()
}

fn default_max_search_pages() -> usize {
    10
}

fn default_max_video_pages() -> usize {
    10
}

fn default_concurrency() -> usize {
    4
}

fn default_gcs_endpoint() -> String {
    "https://storage.googleapis.com".into()
}

fn default_store_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_bucket() -> String {
    "data-sdy".into()
}

fn default_file_prefix() -> String {
    "youtube-data".into()
}

fn default_retention() -> Duration {
    Duration::from_secs(24 * 3600)
}

fn default_close_retry() -> RetryConfig {
    RetryConfig::fixed(10, Duration::from_secs(1))
}

fn default_true() -> bool {
    true
}

fn default_max_attempts() -> u32 {
    3
}

fn default_initial_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_max_delay() -> Duration {
    Duration::from_secs(60)
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".into()]
}

// Duration serialization helper (as whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
