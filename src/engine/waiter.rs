//! Bounded polling for page elements.
//!
//! The page renders asynchronously, so every element the automation touches
//! is first awaited here. A wait never blocks forever: it either yields a
//! [`NodeRef`] or reports absence once its deadline has passed.

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use tokio::time::{Instant, sleep_until, timeout_at};
use tracing::{debug, trace};

use crate::config::deadline_after;
use crate::error::{Error, Result};
use crate::locator::{By, LocatorKey};
use crate::surface::{NodeRef, Surface};

// ============================================================================
// WaitFor
// ============================================================================

/// Condition and bound for a wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitFor {
    /// Require the element to be rendered visibly, not only attached.
    pub visible: bool,
    /// Upper bound on the wait.
    pub timeout: Duration,
}

impl WaitFor {
    /// Element attached to the document.
    #[inline]
    #[must_use]
    pub const fn present(timeout: Duration) -> Self {
        Self {
            visible: false,
            timeout,
        }
    }

    /// Element attached and visible.
    #[inline]
    #[must_use]
    pub const fn visible(timeout: Duration) -> Self {
        Self {
            visible: true,
            timeout,
        }
    }
}

// ============================================================================
// ElementWaiter
// ============================================================================

/// Polls a [`Surface`] for a locator until it resolves or time runs out.
pub struct ElementWaiter<'a, S> {
    surface: &'a S,
    poll_interval: Duration,
}

impl<'a, S: Surface> ElementWaiter<'a, S> {
    /// Creates a waiter polling every `poll_interval`.
    #[inline]
    #[must_use]
    pub fn new(surface: &'a S, poll_interval: Duration) -> Self {
        Self {
            surface,
            poll_interval,
        }
    }

    /// Waits for `key` to satisfy `wait`.
    ///
    /// Returns `Ok(None)` only after `wait.timeout` has elapsed. Lookup
    /// failures other than connection loss count as "not there yet".
    ///
    /// # Errors
    ///
    /// Connection-level errors from the surface.
    pub async fn wait(&self, key: LocatorKey, wait: WaitFor) -> Result<Option<NodeRef>> {
        let query = key.query();
        let deadline = deadline_after(wait.timeout);

        trace!(
            locator = %key,
            visible = wait.visible,
            timeout_ms = wait.timeout.as_millis() as u64,
            "Waiting for element"
        );

        loop {
            match timeout_at(deadline, self.lookup(&query, wait.visible)).await {
                Ok(Ok(Some(node))) => {
                    trace!(locator = %key, node = %node, "Element resolved");
                    return Ok(Some(node));
                }
                Ok(Ok(None)) => {}
                Ok(Err(e)) if e.is_connection_error() => return Err(e),
                Ok(Err(e)) => trace!(locator = %key, error = %e, "Lookup failed, retrying"),
                Err(_) => break,
            }

            let now = Instant::now();
            if now >= deadline {
                break;
            }
            let next = now
                .checked_add(self.poll_interval)
                .map_or(deadline, |t| t.min(deadline));
            sleep_until(next).await;
        }

        debug!(
            locator = %key,
            timeout_ms = wait.timeout.as_millis() as u64,
            "Element did not appear"
        );
        Ok(None)
    }

    /// Like [`wait`](Self::wait) but absence is an error.
    ///
    /// # Errors
    ///
    /// [`Error::ElementNotFound`] when the deadline passes.
    pub async fn require(&self, key: LocatorKey, wait: WaitFor) -> Result<NodeRef> {
        self.wait(key, wait)
            .await?
            .ok_or_else(|| Error::element_not_found(key, wait.timeout.as_millis() as u64))
    }

    /// Text content of the visible element behind `key`.
    ///
    /// `None` when the element never shows up or has no readable text.
    ///
    /// # Errors
    ///
    /// Connection-level errors from the surface.
    pub async fn text_of(&self, key: LocatorKey, timeout: Duration) -> Result<Option<String>> {
        let Some(node) = self.wait(key, WaitFor::visible(timeout)).await? else {
            return Ok(None);
        };

        match self.surface.text_content(&node).await {
            Ok(text) => Ok(text),
            Err(e) if e.is_connection_error() => Err(e),
            Err(e) => {
                debug!(locator = %key, error = %e, "Text read failed");
                Ok(None)
            }
        }
    }

    async fn lookup(&self, query: &By, visible: bool) -> Result<Option<NodeRef>> {
        let Some(node) = self.surface.locate(query).await? else {
            return Ok(None);
        };
        if visible && !self.surface.is_visible(&node).await? {
            return Ok(None);
        }
        Ok(Some(node))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::engine::testing::MockSurface;

    const POLL: Duration = Duration::from_millis(100);

    #[tokio::test(start_paused = true)]
    async fn test_absent_element_times_out_after_bound() {
        let surface = MockSurface::new();
        let waiter = ElementWaiter::new(&surface, POLL);

        let start = Instant::now();
        let found = waiter
            .wait(LocatorKey::ComposerArea, WaitFor::present(Duration::from_millis(100)))
            .await
            .expect("wait");

        assert!(found.is_none());
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_present_element_resolves_immediately() {
        let surface = MockSurface::home_timeline();
        let waiter = ElementWaiter::new(&surface, POLL);

        let start = Instant::now();
        let found = waiter
            .wait(LocatorKey::Composer, WaitFor::visible(Duration::from_secs(5)))
            .await
            .expect("wait");

        assert_eq!(found, Some(NodeRef::new("composer")));
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_element_appearing_later_is_found() {
        let surface = MockSurface::new();
        let late = surface.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(350)).await;
            late.with(|s| s.show(LocatorKey::LoginEmail));
        });

        let waiter = ElementWaiter::new(&surface, POLL);
        let start = Instant::now();
        let found = waiter
            .wait(LocatorKey::LoginEmail, WaitFor::present(Duration::from_secs(3)))
            .await
            .expect("wait");

        assert!(found.is_some());
        assert!(start.elapsed() >= Duration::from_millis(350));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_element_is_not_visible() {
        let surface = MockSurface::home_timeline();
        surface.with(|s| {
            s.hidden.insert(LocatorKey::Composer);
        });
        let waiter = ElementWaiter::new(&surface, POLL);

        let visible = waiter
            .wait(LocatorKey::Composer, WaitFor::visible(Duration::from_millis(300)))
            .await
            .expect("wait");
        let present = waiter
            .wait(LocatorKey::Composer, WaitFor::present(Duration::from_millis(300)))
            .await
            .expect("wait");

        assert!(visible.is_none());
        assert!(present.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_require_reports_locator_and_timeout() {
        let surface = MockSurface::new();
        let waiter = ElementWaiter::new(&surface, POLL);

        let err = waiter
            .require(LocatorKey::StatusArticle, WaitFor::present(Duration::from_millis(200)))
            .await
            .expect_err("absent");

        assert!(matches!(
            err,
            Error::ElementNotFound {
                locator: LocatorKey::StatusArticle,
                timeout_ms: 200
            }
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_of_reads_modal_header() {
        let surface = MockSurface::new();
        surface.with(|s| s.set_modal(Some("Sign in to X")));
        let waiter = ElementWaiter::new(&surface, POLL);

        let text = waiter
            .text_of(LocatorKey::ModalHeader, Duration::from_secs(3))
            .await
            .expect("text");
        assert_eq!(text.as_deref(), Some("Sign in to X"));

        surface.with(|s| s.set_modal(None));
        let text = waiter
            .text_of(LocatorKey::ModalHeader, Duration::from_secs(3))
            .await
            .expect("text");
        assert_eq!(text, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_resolves_present_element() {
        let surface = MockSurface::home_timeline();
        let waiter = ElementWaiter::new(&surface, POLL);

        let found = waiter
            .wait(LocatorKey::Composer, WaitFor::visible(Duration::MAX))
            .await
            .expect("wait");

        assert_eq!(found, Some(NodeRef::new("composer")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unbounded_timeout_keeps_polling_absent_element() {
        let surface = MockSurface::new();
        let waiter = ElementWaiter::new(&surface, Duration::MAX);

        let outcome = tokio::time::timeout(
            Duration::from_secs(1),
            waiter.wait(LocatorKey::Composer, WaitFor::present(Duration::MAX)),
        )
        .await;

        assert!(outcome.is_err(), "wait returned before its deadline");
    }
}
