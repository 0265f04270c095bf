//! Server-reported rate-limit windows.

// ============================================================================
// Imports
// ============================================================================

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::trace;

// ============================================================================
// Constants
// ============================================================================

/// Header carrying the window size.
pub const HEADER_LIMIT: &str = "x-rate-limit-limit";

/// Header carrying the calls left in the window.
pub const HEADER_REMAINING: &str = "x-rate-limit-remaining";

/// Header carrying the window reset, in epoch seconds.
pub const HEADER_RESET: &str = "x-rate-limit-reset";

// ============================================================================
// QuotaSnapshot
// ============================================================================

/// Last known state of one endpoint family's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaSnapshot {
    /// Calls allowed per window.
    pub limit: u32,
    /// Calls left in the current window.
    pub remaining: u32,
    /// When the window resets.
    pub reset_at: DateTime<Utc>,
}

impl QuotaSnapshot {
    /// Creates a snapshot.
    #[inline]
    #[must_use]
    pub fn new(limit: u32, remaining: u32, reset_at: DateTime<Utc>) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Parses the `x-rate-limit-*` response headers.
    ///
    /// Header names match case-insensitively. Returns `None` unless all three
    /// are present and numeric.
    pub fn from_headers<'a, I>(headers: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let (mut limit, mut remaining, mut reset) = (None, None, None);

        for (name, value) in headers {
            let value = value.trim();
            if name.eq_ignore_ascii_case(HEADER_LIMIT) {
                limit = value.parse::<u32>().ok();
            } else if name.eq_ignore_ascii_case(HEADER_REMAINING) {
                remaining = value.parse::<u32>().ok();
            } else if name.eq_ignore_ascii_case(HEADER_RESET) {
                reset = value.parse::<i64>().ok();
            }
        }

        let reset_at = DateTime::from_timestamp(reset?, 0)?;
        Some(Self::new(limit?, remaining?, reset_at))
    }

    /// Returns `true` if no calls are left and the window has not reset by
    /// `now`.
    #[inline]
    #[must_use]
    pub fn is_exhausted_at(&self, now: DateTime<Utc>) -> bool {
        self.remaining == 0 && self.reset_at > now
    }

    /// [`is_exhausted_at`](Self::is_exhausted_at) against the wall clock.
    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.is_exhausted_at(Utc::now())
    }
}

// ============================================================================
// QuotaBook
// ============================================================================

/// Shared table of [`QuotaSnapshot`]s keyed by endpoint family.
///
/// Written by whatever client talks to the API, read by the governor.
#[derive(Debug, Default)]
pub struct QuotaBook {
    entries: RwLock<FxHashMap<String, QuotaSnapshot>>,
}

impl QuotaBook {
    /// Creates an empty book.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the latest snapshot for `family`, replacing any older one.
    pub fn record(&self, family: impl Into<String>, snapshot: QuotaSnapshot) {
        let family = family.into();
        trace!(
            family = %family,
            remaining = snapshot.remaining,
            limit = snapshot.limit,
            "Recorded quota"
        );
        self.entries.write().insert(family, snapshot);
    }

    /// Returns the snapshot for `family`, if any was recorded.
    #[must_use]
    pub fn get(&self, family: &str) -> Option<QuotaSnapshot> {
        self.entries.read().get(family).copied()
    }

    /// Drops the snapshot for `family`.
    pub fn forget(&self, family: &str) {
        self.entries.write().remove(family);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    #[test]
    fn test_from_headers() {
        let headers = [
            ("X-Rate-Limit-Limit", "300"),
            ("x-rate-limit-remaining", " 0 "),
            ("x-rate-limit-reset", "1700000000"),
            ("content-type", "application/json"),
        ];

        let snapshot = QuotaSnapshot::from_headers(headers).expect("snapshot");

        assert_eq!(snapshot.limit, 300);
        assert_eq!(snapshot.remaining, 0);
        assert_eq!(
            snapshot.reset_at,
            Utc.timestamp_opt(1_700_000_000, 0).single().expect("ts")
        );
    }

    #[test]
    fn test_from_headers_requires_all_three() {
        let headers = [("x-rate-limit-limit", "300"), ("x-rate-limit-reset", "1")];
        assert_eq!(QuotaSnapshot::from_headers(headers), None);

        let garbage = [
            ("x-rate-limit-limit", "300"),
            ("x-rate-limit-remaining", "lots"),
            ("x-rate-limit-reset", "1"),
        ];
        assert_eq!(QuotaSnapshot::from_headers(garbage), None);
    }

    #[test]
    fn test_exhaustion_depends_on_reset() {
        let now = Utc::now();
        let later = now + chrono::Duration::minutes(5);
        let earlier = now - chrono::Duration::minutes(5);

        assert!(QuotaSnapshot::new(50, 0, later).is_exhausted_at(now));
        assert!(!QuotaSnapshot::new(50, 0, earlier).is_exhausted_at(now));
        assert!(!QuotaSnapshot::new(50, 1, later).is_exhausted_at(now));
    }

    #[test]
    fn test_book_record_replaces() {
        let book = QuotaBook::new();
        let reset = Utc::now();

        book.record("tweets", QuotaSnapshot::new(50, 10, reset));
        book.record("tweets", QuotaSnapshot::new(50, 9, reset));

        assert_eq!(book.get("tweets").map(|s| s.remaining), Some(9));
        assert_eq!(book.get("users/me"), None);

        book.forget("tweets");
        assert_eq!(book.get("tweets"), None);
    }
}
