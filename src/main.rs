//! youtube-data server binary
//!
//! Reads configuration from the environment (and `.env`), then serves the
//! REST API until SIGTERM/SIGINT.

use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use youtube_data::{Config, YouTubeData, run_with_shutdown};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("youtube_data=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env().inspect_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
    })?;

    let service = Arc::new(YouTubeData::new(config)?);
    run_with_shutdown(service).await?;

    Ok(())
}
