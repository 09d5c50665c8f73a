//! Derived metrics computed from raw counters and timestamps
//!
//! All functions are pure. They never produce NaN or infinite values: a zero
//! day count yields `None` from [`avg_daily`], and a zero like/dislike total
//! yields a ratio of 0.

use chrono::{DateTime, Utc};

/// Whole days elapsed between `timestamp` and `now`
///
/// Computed as `floor(hours / 24)` and clamped to 0 when `timestamp` lies in
/// the future.
pub fn days_since(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let hours = (now - timestamp).num_hours();
    if hours <= 0 { 0 } else { (hours / 24) as u64 }
}

/// Average of `total` per day, or `None` when `days` is 0
pub fn avg_daily(total: u64, days: u64) -> Option<f64> {
    if days == 0 {
        None
    } else {
        Some(total as f64 / days as f64)
    }
}

/// `likes / (likes + dislikes)`, or 0 when both are 0
pub fn like_ratio(likes: u64, dislikes: u64) -> f64 {
    let total = likes.saturating_add(dislikes);
    if total == 0 {
        0.0
    } else {
        likes as f64 / total as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).single().unwrap_or_default()
    }

    #[test]
    fn days_since_truncates_partial_days() {
        let created = at(2024, 1, 1, 12);
        assert_eq!(days_since(created, created + Duration::hours(23)), 0);
        assert_eq!(days_since(created, created + Duration::hours(24)), 1);
        assert_eq!(days_since(created, created + Duration::hours(47)), 1);
        assert_eq!(days_since(created, created + Duration::days(400)), 400);
    }

    #[test]
    fn days_since_never_negative() {
        let now = at(2024, 1, 1, 0);
        assert_eq!(days_since(now + Duration::days(3), now), 0);
    }

    #[test]
    fn days_since_is_monotonic() {
        let created = at(2020, 6, 15, 8);
        let mut previous = 0;
        for hours in (0..24 * 30).step_by(7) {
            let days = days_since(created, created + Duration::hours(hours));
            assert!(days >= previous, "days went backwards at +{hours}h");
            previous = days;
        }
    }

    #[test]
    fn avg_daily_guards_zero_days() {
        assert_eq!(avg_daily(100, 0), None);
        assert_eq!(avg_daily(0, 0), None);
        assert_eq!(avg_daily(100, 4), Some(25.0));
        assert_eq!(avg_daily(0, 10), Some(0.0));
    }

    #[test]
    fn like_ratio_bounds() {
        assert_eq!(like_ratio(0, 0), 0.0);
        assert_eq!(like_ratio(100, 0), 1.0);
        assert_eq!(like_ratio(0, 5), 0.0);
        assert_eq!(like_ratio(3, 1), 0.75);

        let huge = like_ratio(u64::MAX, u64::MAX);
        assert!(huge.is_finite());
        assert!((0.0..=1.0).contains(&huge));
    }
}
