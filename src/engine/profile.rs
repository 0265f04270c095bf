//! Profile page reads.
//!
//! A profile is read, never modified. Every field is a short content read:
//! a counter the layout does not render comes back as `None` instead of
//! failing the whole call. Only the profile header itself is required.

// ============================================================================
// Imports
// ============================================================================

use serde::Serialize;
use tracing::{debug, info};

use super::core::Engine;
use super::operations::require_non_empty;
use super::waiter::WaitFor;
use crate::error::Result;
use crate::locator::LocatorKey;
use crate::surface::Surface;

// ============================================================================
// UserProfile
// ============================================================================

/// Public counters and badges shown on a profile page.
///
/// Counters keep the rendered text (`"1,204"`, `"6.6M"`). The page
/// abbreviates large numbers, so they are not parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    /// Followers counter.
    pub followers: Option<String>,
    /// Following counter.
    pub following: Option<String>,
    /// Join date without the leading "Joined ", for example `March 2006`.
    pub joined: Option<String>,
    /// Post count line from the title bar.
    pub tweet_count: Option<String>,
    /// Whether the verification badge is shown.
    pub verified: bool,
}

// ============================================================================
// Engine - Profile
// ============================================================================

impl<S: Surface> Engine<S> {
    /// Reads the public profile of `user`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`](crate::Error::InvalidArgument) if `user`
    ///   is empty
    /// - authentication errors from the gatekeeper
    /// - [`Error::ElementNotFound`](crate::Error::ElementNotFound) if the
    ///   profile header never renders
    pub async fn user_profile(&self, user: &str) -> Result<UserProfile> {
        require_non_empty("user", user)?;

        let mut state = self.lock().await;
        self.gatekeeper().ensure(&mut *state).await?;

        let surface = &state.surface;
        let timings = self.config().timings();
        surface.navigate(&self.config().profile_url(user)).await?;

        let waiter = self.waiter(surface);
        waiter
            .require(
                LocatorKey::ProfileOverlay,
                WaitFor::present(timings.interact_timeout),
            )
            .await?;

        let quick = timings.content_timeout;
        let mut following = clean(waiter.text_of(LocatorKey::Following, quick).await?);
        if following.is_none() {
            debug!(user, "Following counter missing, trying alternate layout");
            following = clean(waiter.text_of(LocatorKey::FollowingBackup, quick).await?);
        }

        let profile = UserProfile {
            followers: clean(waiter.text_of(LocatorKey::Followers, quick).await?),
            following,
            joined: clean(waiter.text_of(LocatorKey::Joined, quick).await?).map(strip_joined),
            tweet_count: clean(waiter.text_of(LocatorKey::TweetCount, quick).await?),
            verified: waiter
                .wait(LocatorKey::VerifiedBadge, WaitFor::present(quick))
                .await?
                .is_some(),
        };

        info!(user, verified = profile.verified, "Profile read");
        Ok(profile)
    }
}

fn clean(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

fn strip_joined(text: String) -> String {
    match text.strip_prefix("Joined ") {
        Some(date) => date.trim().to_string(),
        None => text,
    }
}

// ============================================================================
// Tests
// ============================================================================
