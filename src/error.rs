//! Error types for youtube-data
//!
//! This module provides error handling for the whole crate, including:
//! - Domain-specific error types (Upstream, Export, Validation, etc.)
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for youtube-data operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for youtube-data
///
/// Per-item upstream failures never reach this type in a request path: the
/// pipeline logs and skips them. Everything here fails the current request
/// only, never the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "YOUTUBE_API_KEY")
        key: Option<String>,
    },

    /// Inbound query parameter missing or malformed
    #[error("{message}")]
    Validation {
        /// The offending query parameter
        field: String,
        /// Human-readable message returned to the caller
        message: String,
    },

    /// External data source call failed
    #[error("upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    /// A paginated feed kept returning page tokens past the configured cap
    #[error("too many pages from {feed}: stopped after {limit} pages")]
    TooManyPages {
        /// Which feed overflowed (e.g., "channel search")
        feed: String,
        /// The page cap that was reached
        limit: usize,
    },

    /// Row export failed
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error for a query parameter
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error tied to a key
    pub fn config(key: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }
}

/// Kind of resource an upstream call was about
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// A `search.list` call
    Search,
    /// A `channels.list` call
    Channel,
    /// A `videos.list` call
    Video,
    /// A `commentThreads.list` call
    CommentThreads,
}

impl std::fmt::Display for Resource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Resource::Search => "search",
            Resource::Channel => "channel",
            Resource::Video => "video",
            Resource::CommentThreads => "comment threads",
        };
        f.write_str(name)
    }
}

/// Errors returned by the external data source client
///
/// Every variant carries the identifier that was being fetched (a channel id,
/// video id, or search term) so that skip logs point at the offending item.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The resource does not exist (404 or an empty `items` array)
    #[error("{resource} {id} not found")]
    NotFound {
        /// Resource kind
        resource: Resource,
        /// Identifier that was requested
        id: String,
    },

    /// API quota or rate limit exhausted (429, or 403 with a quota reason)
    #[error("quota exceeded while fetching {resource} {id}")]
    QuotaExceeded {
        /// Resource kind
        resource: Resource,
        /// Identifier that was requested
        id: String,
    },

    /// Access denied (bad key, comments disabled, private video)
    #[error("access to {resource} {id} forbidden: {message}")]
    Forbidden {
        /// Resource kind
        resource: Resource,
        /// Identifier that was requested
        id: String,
        /// Message from the API error body
        message: String,
    },

    /// Unexpected HTTP status
    #[error("{resource} {id} returned HTTP {status}: {message}")]
    Status {
        /// Resource kind
        resource: Resource,
        /// Identifier that was requested
        id: String,
        /// HTTP status code
        status: u16,
        /// Message from the API error body, or the raw body
        message: String,
    },

    /// Connection, timeout, or body transfer failure
    #[error("transport failure for {resource} {id}: {source}")]
    Transport {
        /// Resource kind
        resource: Resource,
        /// Identifier that was requested
        id: String,
        /// Underlying reqwest error
        #[source]
        source: reqwest::Error,
    },

    /// Response body could not be decoded or was missing required fields
    #[error("could not decode {resource} {id}: {message}")]
    Decode {
        /// Resource kind
        resource: Resource,
        /// Identifier that was requested
        id: String,
        /// What went wrong
        message: String,
    },
}

impl UpstreamError {
    /// Identifier of the item the failing call was about
    pub fn id(&self) -> &str {
        match self {
            UpstreamError::NotFound { id, .. }
            | UpstreamError::QuotaExceeded { id, .. }
            | UpstreamError::Forbidden { id, .. }
            | UpstreamError::Status { id, .. }
            | UpstreamError::Transport { id, .. }
            | UpstreamError::Decode { id, .. } => id,
        }
    }

    /// Whether this is a not-found answer rather than a failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::NotFound { .. })
    }
}

/// Row export errors (serialization, object store write/close, link retrieval)
#[derive(Debug, Error)]
pub enum ExportError {
    /// Row set could not be serialized to CSV
    #[error("failed to serialize rows: {0}")]
    Serialize(String),

    /// Opening the object store writer failed
    #[error("failed to open {object} for writing: {reason}")]
    Open {
        /// Object name
        object: String,
        /// Store error message
        reason: String,
    },

    /// Writing the payload failed
    #[error("failed to write {object}: {reason}")]
    Write {
        /// Object name
        object: String,
        /// Store error message
        reason: String,
    },

    /// Every close attempt failed
    #[error("failed to close {object} after {attempts} attempts: {reason}")]
    CloseExhausted {
        /// Object name
        object: String,
        /// Number of close attempts made
        attempts: u32,
        /// Last store error message
        reason: String,
    },

    /// Object was stored but its access link could not be retrieved
    #[error("stored {object} but failed to retrieve its link: {reason}")]
    Link {
        /// Object name
        object: String,
        /// Store error message
        reason: String,
    },

    /// Export abandoned because the service is shutting down
    #[error("export of {object} cancelled")]
    Cancelled {
        /// Object name
        object: String,
    },
}

/// Error returned by an object store implementation
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP transport failure
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The store answered with an unexpected status
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// Object does not exist
    #[error("object {0} not found")]
    NotFound(String),

    /// Writer used after close or abort
    #[error("writer for {0} is already finished")]
    Finished(String),

    /// Anything else (malformed responses, missing headers)
    #[error("{0}")]
    Other(String),
}

/// API error response format
///
/// This is the standard error response format returned by all API endpoints.
/// It follows a standard format with machine-readable error codes,
/// human-readable messages, and optional contextual details.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "validation_error",
///     "message": "query is required",
///     "details": {
///       "field": "q"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "validation_error", "upstream_error")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    /// Create a "validation error" error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new("validation_error", message)
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
///
/// This trait maps domain errors to appropriate HTTP status codes.
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - Client error (invalid input)
            Error::Validation { .. } => 400,

            // 502 Bad Gateway - External service errors
            Error::Upstream(_) => 502,
            Error::TooManyPages { .. } => 502,

            // 500 Internal Server Error - Server-side issues
            Error::Config { .. } => 500,
            Error::Export(_) => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Validation { .. } => "validation_error",
            Error::Upstream(e) => match e {
                UpstreamError::QuotaExceeded { .. } => "quota_exceeded",
                _ => "upstream_error",
            },
            Error::TooManyPages { .. } => "too_many_pages",
            Error::Export(_) => "export_failed",
            Error::Io(_) => "io_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Validation { field, .. } => Some(serde_json::json!({
                "field": field,
            })),
            Error::Upstream(e) => Some(serde_json::json!({
                "id": e.id(),
            })),
            Error::TooManyPages { feed, limit } => Some(serde_json::json!({
                "feed": feed,
                "limit": limit,
            })),
            Error::Export(ExportError::CloseExhausted {
                object, attempts, ..
            }) => Some(serde_json::json!({
                "object": object,
                "attempts": attempts,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}
