//! Enrichment pipeline
//!
//! Turns a search term into filtered, enriched rows:
//!
//! - **Channel discovery** pages through channel search results, fetches
//!   statistics for each candidate, applies the subscriber and age thresholds,
//!   then lists and enriches each surviving channel's videos.
//! - **Comment discovery** takes one page of video search results and fetches
//!   each video's statistics and top-level comments.
//!
//! Top-level search failures fail the run. Per-item failures are logged,
//! counted in [`RunStats::skipped_items`], and the item is skipped. Candidates
//! are enriched with bounded concurrency through an order-preserving buffered
//! stream, so output order always follows the source's ranking.

mod channels;
mod comments;
mod pagination;

use crate::config::{PipelineConfig, RetryConfig};
use crate::types::RunStats;
use crate::youtube::VideoSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Runs discovery queries against a [`VideoSource`]
#[derive(Clone)]
pub struct Pipeline {
    source: Arc<dyn VideoSource>,
    config: PipelineConfig,
    search_retry: RetryConfig,
}

impl Pipeline {
    /// Create a pipeline; `search_retry` applies to top-level search pages only
    pub fn new(
        source: Arc<dyn VideoSource>,
        config: PipelineConfig,
        search_retry: RetryConfig,
    ) -> Self {
        Self {
            source,
            config,
            search_retry,
        }
    }

    fn concurrency(&self) -> usize {
        self.config.concurrency.max(1)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("search_retry", &self.search_retry)
            .finish_non_exhaustive()
    }
}

/// Counters for a single run, shared by its concurrent enrichment futures
#[derive(Debug, Default)]
pub(crate) struct RunCounter {
    api_calls: AtomicU64,
    pages: AtomicU64,
    skipped_items: AtomicU64,
}

impl RunCounter {
    pub(crate) fn call(&self) {
        self.api_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn pages(&self, pages: usize) {
        self.pages.fetch_add(pages as u64, Ordering::Relaxed);
    }

    pub(crate) fn skip(&self) {
        self.skipped_items.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RunStats {
        RunStats {
            api_calls: self.api_calls.load(Ordering::Relaxed),
            pages: self.pages.load(Ordering::Relaxed),
            skipped_items: self.skipped_items.load(Ordering::Relaxed),
        }
    }
}
