//! Application state for the API server

use crate::{Config, YouTubeData};
use std::sync::Arc;

/// Shared application state accessible to all route handlers
///
/// This struct is cloned for each request (cheap Arc clone) and provides
/// access to the service and its configuration.
#[derive(Clone)]
pub struct AppState {
    /// The discovery service
    pub service: Arc<YouTubeData>,

    /// Configuration (read-only)
    pub config: Arc<Config>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service: Arc<YouTubeData>) -> Self {
        let config = service.config().clone();
        Self { service, config }
    }
}
