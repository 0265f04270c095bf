//! Content operations.
//!
//! Each operation runs entirely under the engine lock:
//!
//! | Operation | Page | Steps |
//! |-----------|------|-------|
//! | `tweet` | home | wait composer, click, type, submit |
//! | `tweet_with_link` | home | as `tweet`, link appended after a blank line |
//! | `reply` | status | wait article, click reply box, type, confirm |
//! | `like` | status | wait article, click like |
//! | `retweet` | status | wait article, click retweet, confirm |
//!
//! Success means every step completed locally. Whether the post actually
//! shows up remotely is never checked.

// ============================================================================
// Imports
// ============================================================================

use tokio::time::sleep;
use tracing::info;

use super::core::Engine;
use super::gatekeeper::navigate_if_elsewhere;
use super::waiter::WaitFor;
use crate::error::{Error, Result};
use crate::locator::LocatorKey;
use crate::surface::Surface;

// ============================================================================
// Engine - Operations
// ============================================================================

impl<S: Surface> Engine<S> {
    /// Posts `content` from the home timeline composer.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if `content` is empty
    /// - authentication errors from the gatekeeper
    /// - [`Error::ElementNotFound`] / [`Error::ElementNotInteractable`] if the
    ///   composer does not render or accept input
    pub async fn tweet(&self, content: &str) -> Result<()> {
        require_non_empty("content", content)?;

        let mut state = self.lock().await;
        self.gatekeeper().ensure(&mut *state).await?;

        let surface = &state.surface;
        let timings = self.config().timings();
        navigate_if_elsewhere(surface, &self.config().home_url()).await?;

        self.waiter(surface)
            .require(
                LocatorKey::ComposerArea,
                WaitFor::present(timings.interact_timeout),
            )
            .await?;

        let executor = self.executor(surface);
        executor.click(LocatorKey::Composer).await?;
        executor.type_text(LocatorKey::Composer, content).await?;
        executor.click(LocatorKey::ComposerSubmit).await?;

        sleep(timings.post_settle).await;
        info!(content_len = content.chars().count(), "Tweet submitted");
        Ok(())
    }

    /// Posts `content` followed by a blank line and `link`.
    ///
    /// # Errors
    ///
    /// As [`tweet`](Self::tweet); an empty `link` is also rejected.
    pub async fn tweet_with_link(&self, content: &str, link: &str) -> Result<()> {
        require_non_empty("content", content)?;
        require_non_empty("link", link)?;
        self.tweet(&format!("{content}\n\n{link}")).await
    }

    /// Replies to status `item_id` of `user` with `content`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] if any argument is empty
    /// - authentication errors from the gatekeeper
    /// - [`Error::ElementNotFound`] / [`Error::ElementNotInteractable`] if the
    ///   status or its reply box does not render
    pub async fn reply(&self, user: &str, item_id: &str, content: &str) -> Result<()> {
        require_non_empty("user", user)?;
        require_non_empty("item_id", item_id)?;
        require_non_empty("content", content)?;

        let mut state = self.lock().await;
        self.gatekeeper().ensure(&mut *state).await?;
        let surface = &state.surface;

        self.open_status(surface, user, item_id).await?;

        let executor = self.executor(surface);
        executor.click(LocatorKey::ReplyComposer).await?;
        executor.type_text(LocatorKey::ReplyComposer, content).await?;
        executor.click(LocatorKey::ReplyConfirm).await?;

        sleep(self.config().timings().post_settle).await;
        info!(
            user,
            item_id,
            content_len = content.chars().count(),
            "Reply submitted"
        );
        Ok(())
    }

    /// Likes status `item_id` of `user`.
    ///
    /// # Errors
    ///
    /// As [`reply`](Self::reply).
    pub async fn like(&self, user: &str, item_id: &str) -> Result<()> {
        require_non_empty("user", user)?;
        require_non_empty("item_id", item_id)?;

        let mut state = self.lock().await;
        self.gatekeeper().ensure(&mut *state).await?;
        let surface = &state.surface;

        self.open_status(surface, user, item_id).await?;
        self.executor(surface).click(LocatorKey::Like).await?;

        sleep(self.config().timings().post_settle).await;
        info!(user, item_id, "Liked");
        Ok(())
    }

    /// Retweets status `item_id` of `user`.
    ///
    /// # Errors
    ///
    /// As [`reply`](Self::reply).
    pub async fn retweet(&self, user: &str, item_id: &str) -> Result<()> {
        require_non_empty("user", user)?;
        require_non_empty("item_id", item_id)?;

        let mut state = self.lock().await;
        self.gatekeeper().ensure(&mut *state).await?;
        let surface = &state.surface;

        self.open_status(surface, user, item_id).await?;
        let executor = self.executor(surface);
        executor.click(LocatorKey::Retweet).await?;
        executor.click(LocatorKey::RetweetConfirm).await?;

        sleep(self.config().timings().post_settle).await;
        info!(user, item_id, "Retweeted");
        Ok(())
    }

    async fn open_status(&self, surface: &S, user: &str, item_id: &str) -> Result<()> {
        let url = self.config().status_url(user, item_id);
        surface.navigate(&url).await?;
        self.waiter(surface)
            .require(
                LocatorKey::StatusArticle,
                WaitFor::present(self.config().timings().interact_timeout),
            )
            .await?;
        Ok(())
    }
}

pub(super) fn require_non_empty(name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::invalid_argument(format!("{name} must not be empty")));
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
