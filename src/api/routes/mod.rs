//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`youtube`] - Channel and comment discovery
//! - [`system`] - Health, stats, OpenAPI

use crate::error::{Error, Result};
use crate::types::{ChannelQuery, CommentQuery};
use serde::{Deserialize, Serialize};

mod system;
mod youtube;

// Re-export all handlers so `routes::function_name` continues to work
pub use system::*;
pub use youtube::*;

// ============================================================================
// Query/Request Types (shared across handlers)
// ============================================================================

/// Query parameters for GET /youtube/channels
///
/// Parameters are taken as raw strings so that missing and malformed values
/// produce the documented validation messages.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ChannelSearchParams {
    /// Search term
    pub q: Option<String>,
    /// Minimum subscriber count (inclusive)
    pub subscribers_n: Option<String>,
    /// Minimum channel age in days (inclusive)
    pub days: Option<String>,
}

/// Query parameters for GET /youtube/comments
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CommentSearchParams {
    /// Search term
    pub q: Option<String>,
}

/// Response for GET /stats
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct StatsResponse {
    /// External API calls issued since startup
    pub api_calls: u64,
}

impl ChannelSearchParams {
    /// Validate into a channel query; the first problem found is reported
    pub fn into_query(self) -> Result<ChannelQuery> {
        let term = required_term(self.q)?;
        let min_subscribers = required_count("subscribers_n", self.subscribers_n)?;
        let min_days = required_count("days", self.days)?;
        Ok(ChannelQuery {
            term,
            min_subscribers,
            min_days,
        })
    }
}

impl CommentSearchParams {
    /// Validate into a comment query
    pub fn into_query(self) -> Result<CommentQuery> {
        Ok(CommentQuery {
            term: required_term(self.q)?,
        })
    }
}

fn required_term(q: Option<String>) -> Result<String> {
    match q {
        Some(term) if !term.trim().is_empty() => Ok(term),
        _ => Err(Error::validation("q", "query is required")),
    }
}

fn required_count(field: &str, value: Option<String>) -> Result<u64> {
    let value = value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| Error::validation(field, format!("{} is required", field)))?;
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| Error::validation(field, format!("{} must be a non-negative integer", field)))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    fn params(q: Option<&str>, subs: Option<&str>, days: Option<&str>) -> ChannelSearchParams {
        ChannelSearchParams {
            q: q.map(String::from),
            subscribers_n: subs.map(String::from),
            days: days.map(String::from),
        }
    }

    fn message(result: Result<ChannelQuery>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn valid_channel_params() {
        let query = params(Some("cats"), Some("5000"), Some(" 400 ")).into_query().unwrap();
        assert_eq!(query.term, "cats");
        assert_eq!(query.min_subscribers, 5000);
        assert_eq!(query.min_days, 400);
    }

    #[test]
    fn missing_or_blank_query_is_rejected_first() {
        assert_eq!(message(params(None, None, None).into_query()), "query is required");
        assert_eq!(
            message(params(Some("  "), Some("1"), Some("1")).into_query()),
            "query is required"
        );
    }

    #[test]
    fn counts_must_be_present_and_non_negative() {
        assert_eq!(
            message(params(Some("cats"), None, Some("1")).into_query()),
            "subscribers_n is required"
        );
        assert_eq!(
            message(params(Some("cats"), Some("-5"), Some("1")).into_query()),
            "subscribers_n must be a non-negative integer"
        );
        assert_eq!(
            message(params(Some("cats"), Some("1"), Some("")).into_query()),
            "days is required"
        );
        assert_eq!(
            message(params(Some("cats"), Some("1"), Some("1.5")).into_query()),
            "days must be a non-negative integer"
        );
    }

    #[test]
    fn comment_params_need_a_term() {
        let err = CommentSearchParams { q: None }.into_query().unwrap_err();
        assert_eq!(err.to_string(), "query is required");
        let query = CommentSearchParams {
            q: Some("cats".into()),
        }
        .into_query()
        .unwrap();
        assert_eq!(query.term, "cats");
    }
}
