//! Rate governor for the official API path.
//!
//! The governor never waits and never queues. It reads the last snapshot the
//! API reported for an endpoint family and either admits the call or rejects
//! it at once with the time the window resets.
//!
//! | Snapshot | Decision |
//! |----------|----------|
//! | none recorded | admit |
//! | `remaining > 0` | admit |
//! | `remaining == 0`, reset passed | admit |
//! | `remaining == 0`, reset ahead | [`Error::RateLimited`] |
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tweetfree::{Governed, Poster, QuotaBook, RateGovernor};
//!
//! let book = Arc::new(QuotaBook::new());
//! let poster = Governed::new(api_client, RateGovernor::new(Arc::clone(&book)));
//! poster.tweet("hello").await?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod quota;

// ============================================================================
// Re-exports
// ============================================================================

pub use quota::{HEADER_LIMIT, HEADER_REMAINING, HEADER_RESET, QuotaBook, QuotaSnapshot};

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::poster::Poster;

// ============================================================================
// Constants
// ============================================================================

/// Endpoint family covering tweet creation, replies included.
pub const TWEETS_FAMILY: &str = "tweets";

/// Message returned to callers rejected by the governor.
pub const RATE_LIMIT_MESSAGE: &str = "Twitter API rate limit exceeded";

// ============================================================================
// RateGovernor
// ============================================================================

/// Admission check against a shared [`QuotaBook`].
#[derive(Debug, Clone)]
pub struct RateGovernor {
    book: Arc<QuotaBook>,
}

impl RateGovernor {
    /// Creates a governor reading `book`.
    #[inline]
    #[must_use]
    pub fn new(book: Arc<QuotaBook>) -> Self {
        Self { book }
    }

    /// Returns the quota book.
    #[inline]
    #[must_use]
    pub fn book(&self) -> &Arc<QuotaBook> {
        &self.book
    }

    /// Admits or rejects a call in `family` against the wall clock.
    ///
    /// # Errors
    ///
    /// [`Error::RateLimited`] if the family's window is exhausted.
    pub fn admit(&self, family: &str) -> Result<()> {
        self.admit_at(family, Utc::now())
    }

    /// Admits or rejects a call in `family` as of `now`.
    ///
    /// # Errors
    ///
    /// [`Error::RateLimited`] if the family's window is exhausted at `now`.
    pub fn admit_at(&self, family: &str, now: DateTime<Utc>) -> Result<()> {
        let Some(snapshot) = self.book.get(family) else {
            debug!(family, "No quota recorded, admitting");
            return Ok(());
        };

        if snapshot.is_exhausted_at(now) {
            warn!(
                family,
                reset_at = %snapshot.reset_at,
                "Rate limit exhausted, rejecting"
            );
            return Err(Error::rate_limited(family, snapshot.reset_at));
        }

        debug!(family, remaining = snapshot.remaining, "Admitted");
        Ok(())
    }
}

// ============================================================================
// RateLimitResponse
// ============================================================================

/// Structured rejection body: `{"error": "...", "resetTime": "<ISO-8601>"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResponse {
    /// Human-readable reason.
    pub error: String,
    /// When the window resets.
    #[serde(serialize_with = "serialize_iso_millis")]
    pub reset_time: DateTime<Utc>,
}

impl RateLimitResponse {
    /// Creates a response resetting at `reset_time`.
    #[must_use]
    pub fn new(reset_time: DateTime<Utc>) -> Self {
        Self {
            error: RATE_LIMIT_MESSAGE.to_string(),
            reset_time,
        }
    }

    /// Builds the response for an [`Error::RateLimited`], `None` for any
    /// other error.
    #[must_use]
    pub fn from_error(err: &Error) -> Option<Self> {
        match err {
            Error::RateLimited { reset_at, .. } => Some(Self::new(*reset_at)),
            _ => None,
        }
    }
}

fn serialize_iso_millis<S: Serializer>(
    time: &DateTime<Utc>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// ============================================================================
// Governed
// ============================================================================

/// A [`Poster`] whose calls are admitted by a [`RateGovernor`] first.
///
/// Rejected calls never reach the wrapped poster.
#[derive(Debug, Clone)]
pub struct Governed<P> {
    inner: P,
    governor: RateGovernor,
}

impl<P: Poster> Governed<P> {
    /// Wraps `inner`.
    #[inline]
    #[must_use]
    pub fn new(inner: P, governor: RateGovernor) -> Self {
        Self { inner, governor }
    }

    /// Returns the wrapped poster.
    #[inline]
    #[must_use]
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

#[async_trait]
impl<P: Poster> Poster for Governed<P> {
    async fn tweet(&self, content: &str) -> Result<()> {
        self.governor.admit(TWEETS_FAMILY)?;
        self.inner.tweet(content).await
    }

    async fn reply(&self, user: &str, item_id: &str, content: &str) -> Result<()> {
        self.governor.admit(TWEETS_FAMILY)?;
        self.inner.reply(user, item_id, content).await
    }
}

// ============================================================================
// Tests
// ============================================================================
