//! Error types for tweetfree.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! All fallible operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use tweetfree::{Error, Result};
//!
//! async fn example(engine: &Engine<FirefoxPage>) -> Result<()> {
//!     match engine.tweet("hello").await {
//!         Err(Error::RateLimited { reset_at, .. }) => println!("retry at {reset_at}"),
//!         other => other?,
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Automation | [`Error::ElementNotFound`], [`Error::ElementNotInteractable`], [`Error::LoginIncomplete`] |
//! | Admission | [`Error::RateLimited`] |
//! | Remote | [`Error::UpstreamFailure`], [`Error::Remote`], [`Error::ScriptError`] |
//! | Configuration | [`Error::Config`], [`Error::InvalidArgument`], [`Error::Profile`] |
//! | Process | [`Error::FirefoxNotFound`], [`Error::ProcessLaunchFailed`] |
//! | Connection | [`Error::Connection`], [`Error::ConnectionTimeout`], [`Error::ConnectionClosed`] |
//! | Protocol | [`Error::Protocol`], [`Error::RequestTimeout`] |
//! | External | [`Error::Io`], [`Error::Json`], [`Error::WebSocket`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

use crate::engine::LoginStage;
use crate::identifiers::RequestId;
use crate::locator::LocatorKey;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
///
/// All fallible operations in this crate return this type.
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
///
/// Each variant includes relevant context for debugging.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Automation Errors
    // ========================================================================
    /// A required locator never resolved.
    ///
    /// Callers may retry or abort; the engine never retries on its own.
    #[error("Element not found: {locator} after {timeout_ms}ms")]
    ElementNotFound {
        /// Locator that was waited for.
        locator: LocatorKey,
        /// Milliseconds waited before giving up.
        timeout_ms: u64,
    },

    /// Element could not be typed into or clicked.
    ///
    /// Returned when the element never resolved for an action, or resolved
    /// but the browser rejected the interaction.
    #[error("Element not interactable: {locator}: {message}")]
    ElementNotInteractable {
        /// Locator the action targeted.
        locator: LocatorKey,
        /// What went wrong.
        message: String,
    },

    /// Login sequence stopped before reaching its terminal state.
    ///
    /// There is no rollback. Re-running the sequence restarts from the modal
    /// check and the platform renders whichever step it expects next.
    #[error("Login incomplete at {stage}: {reason}")]
    LoginIncomplete {
        /// Last stage the sequencer reached.
        stage: LoginStage,
        /// Why it stopped.
        reason: String,
    },

    // ========================================================================
    // Admission Errors
    // ========================================================================
    /// Request rejected before dispatch because the quota window is spent.
    #[error("Rate limit exceeded for {family}, resets at {reset_at}")]
    RateLimited {
        /// Endpoint family whose quota is exhausted.
        family: String,
        /// When the server said the window resets.
        reset_at: DateTime<Utc>,
    },

    // ========================================================================
    // Remote Errors
    // ========================================================================
    /// The platform rejected an action that was already dispatched.
    ///
    /// Browser automation cannot observe this; the variant exists so that
    /// API-mode posters can report it.
    #[error("Upstream failure: {message}")]
    UpstreamFailure {
        /// Description from the upstream service.
        message: String,
    },

    /// Error response returned by the browser's remote end.
    #[error("Remote error {error}: {message}")]
    Remote {
        /// WebDriver error code (e.g. `no such node`).
        error: String,
        /// Human readable message.
        message: String,
    },

    /// JavaScript evaluation threw in the page.
    #[error("Script error: {message}")]
    ScriptError {
        /// Exception text.
        message: String,
    },

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Invalid argument passed to an operation.
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the invalid argument.
        message: String,
    },

    /// Profile error.
    ///
    /// Returned when Firefox profile creation or setup fails.
    #[error("Profile error: {message}")]
    Profile {
        /// Description of the profile error.
        message: String,
    },

    // ========================================================================
    // Process Errors
    // ========================================================================
    /// Firefox binary not found at path.
    #[error("Firefox not found at: {path}")]
    FirefoxNotFound {
        /// Path where Firefox was expected.
        path: PathBuf,
    },

    /// Failed to launch Firefox process.
    #[error("Failed to launch Firefox: {message}")]
    ProcessLaunchFailed {
        /// Description of the launch failure.
        message: String,
    },

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// WebSocket connection failed.
    #[error("Connection failed: {message}")]
    Connection {
        /// Description of the connection error.
        message: String,
    },

    /// Firefox did not announce its BiDi endpoint in time.
    #[error("Connection timeout after {timeout_ms}ms")]
    ConnectionTimeout {
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    /// WebSocket connection closed unexpectedly.
    #[error("Connection closed")]
    ConnectionClosed,

    // ========================================================================
    // Protocol Errors
    // ========================================================================
    /// Protocol violation or unexpected response.
    #[error("Protocol error: {message}")]
    Protocol {
        /// Description of the protocol violation.
        message: String,
    },

    /// Command request timeout.
    #[error("Request {request_id} timed out after {timeout_ms}ms")]
    RequestTimeout {
        /// The request ID that timed out.
        request_id: RequestId,
        /// Milliseconds waited before timeout.
        timeout_ms: u64,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// WebSocket error.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates an element not found error.
    #[inline]
    pub fn element_not_found(locator: LocatorKey, timeout_ms: u64) -> Self {
        Self::ElementNotFound {
            locator,
            timeout_ms,
        }
    }

    /// Creates an element not interactable error.
    #[inline]
    pub fn not_interactable(locator: LocatorKey, message: impl Into<String>) -> Self {
        Self::ElementNotInteractable {
            locator,
            message: message.into(),
        }
    }

    /// Creates a login incomplete error.
    #[inline]
    pub fn login_incomplete(stage: LoginStage, reason: impl Into<String>) -> Self {
        Self::LoginIncomplete {
            stage,
            reason: reason.into(),
        }
    }

    /// Creates a rate limited error.
    #[inline]
    pub fn rate_limited(family: impl Into<String>, reset_at: DateTime<Utc>) -> Self {
        Self::RateLimited {
            family: family.into(),
            reset_at,
        }
    }

    /// Creates an upstream failure error.
    #[inline]
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            message: message.into(),
        }
    }

    /// Creates a remote end error.
    #[inline]
    pub fn remote(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Remote {
            error: error.into(),
            message: message.into(),
        }
    }

    /// Creates a script error.
    #[inline]
    pub fn script_error(message: impl Into<String>) -> Self {
        Self::ScriptError {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid argument error.
    #[inline]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a profile error.
    #[inline]
    pub fn profile(message: impl Into<String>) -> Self {
        Self::Profile {
            message: message.into(),
        }
    }

    /// Creates a Firefox not found error.
    #[inline]
    pub fn firefox_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FirefoxNotFound { path: path.into() }
    }

    /// Creates a process launch failed error.
    #[inline]
    pub fn process_launch_failed(err: IoError) -> Self {
        Self::ProcessLaunchFailed {
            message: err.to_string(),
        }
    }

    /// Creates a connection error.
    #[inline]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a connection timeout error.
    #[inline]
    pub fn connection_timeout(timeout_ms: u64) -> Self {
        Self::ConnectionTimeout { timeout_ms }
    }

    /// Creates a protocol error.
    #[inline]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }

    /// Creates a request timeout error.
    #[inline]
    pub fn request_timeout(request_id: RequestId, timeout_ms: u64) -> Self {
        Self::RequestTimeout {
            request_id,
            timeout_ms,
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a timeout error.
    #[inline]
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Self::ConnectionTimeout { .. } | Self::RequestTimeout { .. }
        )
    }

    /// Returns `true` if this is an element error.
    #[inline]
    #[must_use]
    pub fn is_element_error(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::ElementNotInteractable { .. }
        )
    }

    /// Returns `true` if this is a connection error.
    ///
    /// Connection errors mean the browsing context itself is gone, so the
    /// element waiter stops polling and propagates them.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. }
                | Self::ConnectionTimeout { .. }
                | Self::ConnectionClosed
                | Self::WebSocket(_)
        )
    }

    /// Returns `true` if this error is recoverable.
    ///
    /// Recoverable errors may succeed when the caller retries the whole
    /// operation.
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::ElementNotInteractable { .. }
                | Self::LoginIncomplete { .. }
                | Self::RateLimited { .. }
                | Self::RequestTimeout { .. }
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
