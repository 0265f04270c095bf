//! Type and click actions against resolved elements.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::time::sleep;
use tracing::{debug, trace};

use super::waiter::{ElementWaiter, WaitFor};
use crate::config::Timings;
use crate::error::{Error, Result};
use crate::locator::LocatorKey;
use crate::surface::{NodeRef, Surface};

// ============================================================================
// Action
// ============================================================================

/// A single user interaction with a page element.
///
/// `Debug` prints the text length only, since typed text may be a password.
#[derive(Clone, PartialEq, Eq)]
pub enum Action {
    /// Focus the element and type `text` one character at a time.
    Type {
        /// Target element.
        locator: LocatorKey,
        /// Text to type.
        text: String,
    },
    /// Click the element.
    Click {
        /// Target element.
        locator: LocatorKey,
    },
}

impl Action {
    /// Creates a [`Action::Type`].
    #[inline]
    #[must_use]
    pub fn type_text(locator: LocatorKey, text: impl Into<String>) -> Self {
        Self::Type {
            locator,
            text: text.into(),
        }
    }

    /// Creates a [`Action::Click`].
    #[inline]
    #[must_use]
    pub const fn click(locator: LocatorKey) -> Self {
        Self::Click { locator }
    }

    /// Returns the targeted element.
    #[inline]
    #[must_use]
    pub const fn locator(&self) -> LocatorKey {
        match self {
            Self::Type { locator, .. } | Self::Click { locator } => *locator,
        }
    }
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type { locator, text } => f
                .debug_struct("Type")
                .field("locator", locator)
                .field("text_len", &text.chars().count())
                .finish(),
            Self::Click { locator } => f.debug_struct("Click").field("locator", locator).finish(),
        }
    }
}

// ============================================================================
// ActionExecutor
// ============================================================================

/// Performs [`Action`]s, pacing keystrokes like a person typing.
pub struct ActionExecutor<'a, S> {
    surface: &'a S,
    timings: &'a Timings,
}

impl<'a, S: Surface> ActionExecutor<'a, S> {
    /// Creates an executor over `surface`.
    #[inline]
    #[must_use]
    pub fn new(surface: &'a S, timings: &'a Timings) -> Self {
        Self { surface, timings }
    }

    /// Performs `action`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidArgument`] for a `Type` with empty text
    /// - [`Error::ElementNotInteractable`] if the element never becomes
    ///   visible or the surface rejects the interaction
    /// - connection errors unchanged
    pub async fn execute(&self, action: &Action) -> Result<()> {
        match action {
            Action::Type { locator, text } => self.type_text(*locator, text).await,
            Action::Click { locator } => self.click(*locator).await,
        }
    }

    /// Focuses `locator` and types `text` with the configured pacing.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn type_text(&self, locator: LocatorKey, text: &str) -> Result<()> {
        if text.is_empty() {
            return Err(Error::invalid_argument(format!(
                "nothing to type into {locator}"
            )));
        }

        let node = self.resolve(locator).await?;
        self.surface
            .focus(&node)
            .await
            .map_err(|e| interaction_error(locator, e))?;

        for (i, ch) in text.chars().enumerate() {
            if i > 0 {
                sleep(self.timings.type_delay).await;
            }
            self.surface
                .press_key(ch)
                .await
                .map_err(|e| interaction_error(locator, e))?;
        }

        debug!(locator = %locator, text_len = text.chars().count(), "Typed text");
        Ok(())
    }

    /// Clicks `locator` once it is visible.
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub async fn click(&self, locator: LocatorKey) -> Result<()> {
        let node = self.resolve(locator).await?;
        self.surface
            .click(&node)
            .await
            .map_err(|e| interaction_error(locator, e))?;

        debug!(locator = %locator, "Clicked");
        Ok(())
    }

    async fn resolve(&self, locator: LocatorKey) -> Result<NodeRef> {
        let timeout = self.timings.interact_timeout;
        let waiter = ElementWaiter::new(self.surface, self.timings.poll_interval);

        match waiter.wait(locator, WaitFor::visible(timeout)).await? {
            Some(node) => {
                trace!(locator = %locator, node = %node, "Resolved action target");
                Ok(node)
            }
            None => Err(Error::not_interactable(
                locator,
                format!("not visible within {}ms", timeout.as_millis()),
            )),
        }
    }
}

fn interaction_error(locator: LocatorKey, err: Error) -> Error {
    if err.is_connection_error() {
        err
    } else {
        Error::not_interactable(locator, err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================
