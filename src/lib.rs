//! # youtube-data
//!
//! HTTP service that discovers YouTube channels and comments for a search
//! term, enriches them with statistics and exports the rows as CSV to an
//! object store.
//!
//! ## Overview
//!
//! - [`youtube`] - YouTube Data API v3 client behind the [`youtube::VideoSource`] seam
//! - [`pipeline`] - Pagination, per-item enrichment and filtering
//! - [`export`] - CSV encoding and upload with close retries and retention
//! - [`api`] - REST endpoints, OpenAPI document and Swagger UI
//!
//! ## Quick Start
//!
//! ```no_run
//! use youtube_data::{Config, YouTubeData, run_with_shutdown};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let service = Arc::new(YouTubeData::new(config)?);
//!
//!     // Serve until SIGTERM/SIGINT
//!     run_with_shutdown(service).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// REST API module
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// CSV export to object storage
pub mod export;
/// Derived channel and video metrics
pub mod metrics;
/// Channel and comment discovery
pub mod pipeline;
/// Retry logic with exponential backoff
pub mod retry;
/// Service facade
pub mod service;
/// Core types
pub mod types;
/// YouTube Data API client
pub mod youtube;

// Re-export commonly used types
pub use config::Config;
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use service::YouTubeData;
pub use types::{
    ChannelQuery, ChannelReport, ChannelRow, CommentQuery, CommentReport, CommentRow,
    ExportReceipt, Report, RunStats,
};

/// Serve the REST API until a termination signal arrives, then shut down.
///
/// On the signal the service's shutdown token is cancelled: pending export
/// retries give up and the server stops after draining in-flight requests.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
pub async fn run_with_shutdown(service: std::sync::Arc<YouTubeData>) -> Result<()> {
    tokio::spawn({
        let service = service.clone();
        async move {
            wait_for_signal().await;
            service.shutdown();
        }
    });

    api::start_api_server(service).await
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(
                error = %e,
                "Could not register SIGTERM handler, waiting for SIGINT only"
            );
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(
                error = %e,
                "Could not register SIGINT handler, waiting for SIGTERM only"
            );
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
