//! Firefox launch options.
//!
//! # Example
//!
//! ```ignore
//! use tweetfree::LaunchOptions;
//!
//! let options = LaunchOptions::new("/usr/bin/firefox")
//!     .with_window_size(1280, 800)
//!     .with_arg("--safe-mode");
//!
//! let args = options.to_args();
//! // ["--remote-debugging-port", "0", "--headless", "--window-size", "1280,800", "--safe-mode"]
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// User agent presented to the site unless overridden.
///
/// A desktop Linux Firefox string, matching the engine that actually renders
/// the page.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:128.0) Gecko/20100101 Firefox/128.0";

/// How long Firefox gets to announce its BiDi endpoint.
pub const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// LaunchOptions
// ============================================================================

/// How to start the Firefox process behind a
/// [`FirefoxPage`](super::FirefoxPage).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Firefox executable. A bare name is looked up on `PATH`.
    pub binary: PathBuf,

    /// Run without a GUI.
    pub headless: bool,

    /// Window dimensions in pixels (width, height).
    pub window_size: Option<(u32, u32)>,

    /// `general.useragent.override`; `None` keeps Firefox's own.
    pub user_agent: Option<String>,

    /// Additional command-line arguments.
    pub extra_args: Vec<String>,

    /// Bound on process start to BiDi endpoint announcement.
    pub startup_timeout: Duration,

    /// Port for `--remote-debugging-port`; `0` lets Firefox pick.
    pub remote_debugging_port: u16,
}

impl Default for LaunchOptions {
    fn default() -> Self {
        Self::new("firefox")
    }
}

// ============================================================================
// Constructors
// ============================================================================

impl LaunchOptions {
    /// Creates headless options for `binary` with the default user agent.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            headless: true,
            window_size: None,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            extra_args: Vec::new(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            remote_debugging_port: 0,
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl LaunchOptions {
    /// Shows the browser window.
    #[inline]
    #[must_use]
    pub fn with_head(mut self) -> Self {
        self.headless = false;
        self
    }

    /// Sets window size in pixels.
    #[inline]
    #[must_use]
    pub fn with_window_size(mut self, width: u32, height: u32) -> Self {
        self.window_size = Some((width, height));
        self
    }

    /// Overrides the user agent.
    #[inline]
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Keeps Firefox's own user agent.
    #[inline]
    #[must_use]
    pub fn without_user_agent(mut self) -> Self {
        self.user_agent = None;
        self
    }

    /// Adds a custom command-line argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Sets the startup timeout.
    #[inline]
    #[must_use]
    pub fn with_startup_timeout(mut self, timeout: Duration) -> Self {
        self.startup_timeout = timeout;
        self
    }

    /// Sets a fixed remote debugging port.
    #[inline]
    #[must_use]
    pub fn with_remote_debugging_port(mut self, port: u16) -> Self {
        self.remote_debugging_port = port;
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl LaunchOptions {
    /// Converts options to Firefox command-line arguments.
    ///
    /// Profile arguments are added by the launcher.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(5 + self.extra_args.len());

        args.push("--remote-debugging-port".to_string());
        args.push(self.remote_debugging_port.to_string());

        if self.headless {
            args.push("--headless".to_string());
        }

        if let Some((width, height)) = self.window_size {
            args.push("--window-size".to_string());
            args.push(format!("{width},{height}"));
        }

        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// - [`Error::FirefoxNotFound`] if `binary` is a path that does not exist
    /// - [`Error::Config`] for zero window dimensions or startup timeout
    pub fn validate(&self) -> Result<()> {
        if self.binary.components().count() > 1 && !self.binary.exists() {
            return Err(Error::firefox_not_found(&self.binary));
        }

        if let Some((width, height)) = self.window_size
            && (width == 0 || height == 0)
        {
            return Err(Error::config(
                "Window dimensions must be greater than zero",
            ));
        }

        if self.startup_timeout.is_zero() {
            return Err(Error::config("Startup timeout must be greater than zero"));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LaunchOptions::default();
        assert_eq!(options.binary, PathBuf::from("firefox"));
        assert!(options.headless);
        assert_eq!(options.user_agent.as_deref(), Some(DEFAULT_USER_AGENT));
        assert_eq!(options.startup_timeout, Duration::from_secs(30));
        assert_eq!(options.remote_debugging_port, 0);
    }

    #[test]
    fn test_default_user_agent_is_firefox() {
        assert!(DEFAULT_USER_AGENT.contains("Gecko/20100101 Firefox/"));
        assert!(!DEFAULT_USER_AGENT.contains("Chrome"));
    }

    #[test]
    fn test_to_args_default() {
        let args = LaunchOptions::default().to_args();
        assert_eq!(args, ["--remote-debugging-port", "0", "--headless"]);
    }

    #[test]
    fn test_to_args_all_options() {
        let args = LaunchOptions::default()
            .with_head()
            .with_window_size(1280, 800)
            .with_remote_debugging_port(9222)
            .with_arg("--custom")
            .to_args();

        assert_eq!(
            args,
            [
                "--remote-debugging-port",
                "9222",
                "--window-size",
                "1280,800",
                "--custom"
            ]
        );
    }

    #[test]
    fn test_validate_bare_binary_name() {
        assert!(LaunchOptions::default().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_binary_path() {
        let err = LaunchOptions::new("/nonexistent/firefox")
            .validate()
            .expect_err("missing");
        assert!(matches!(err, Error::FirefoxNotFound { .. }));
    }

    #[test]
    fn test_validate_zero_window() {
        let err = LaunchOptions::default()
            .with_window_size(0, 600)
            .validate()
            .expect_err("zero width");
        assert!(matches!(err, Error::Config { .. }));
    }

    #[test]
    fn test_validate_zero_timeout() {
        assert!(
            LaunchOptions::default()
                .with_startup_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_without_user_agent() {
        assert!(LaunchOptions::default().without_user_agent().user_agent.is_none());
    }
}
