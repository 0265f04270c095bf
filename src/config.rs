//! Engine configuration.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`EngineConfig`] | Target site and timing knobs |
//! | [`Timings`] | Pacing, poll and settle durations |
//! | [`Credentials`] | Account used by the login sequence |
//! | [`ExecutionMode`] | Browser automation or official API |
//!
//! Loading these from files or flags is the embedding application's job;
//! the `from_env` helpers cover the environment variables the service has
//! always used.

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tokio::time::Instant;
use url::Url;

use crate::error::{Error, Result};

// ============================================================================
// Constants
// ============================================================================

/// Default site root.
pub const DEFAULT_BASE_URL: &str = "https://twitter.com";

/// Environment variable holding the account email.
pub const ENV_EMAIL: &str = "TWITTER_EMAIL";

/// Environment variable holding the account handle.
pub const ENV_USERNAME: &str = "TWITTER_USERNAME";

/// Environment variable holding the account password.
pub const ENV_PASSWORD: &str = "TWITTER_PASSWORD";

/// Environment variable selecting the [`ExecutionMode`].
pub const ENV_MODE: &str = "TWEETFREE_MODE";

// ============================================================================
// Credentials
// ============================================================================

/// Account credentials for the interactive login.
///
/// `Debug` never prints the email or password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account email (first login screen).
    pub email: String,
    /// Account handle (asked by the unusual-activity challenge).
    pub username: String,
    /// Account password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Reads credentials from `TWITTER_EMAIL`, `TWITTER_USERNAME` and
    /// `TWITTER_PASSWORD`.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] naming the first variable that is unset or empty.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            email: required_env(ENV_EMAIL)?,
            username: required_env(ENV_USERNAME)?,
            password: required_env(ENV_PASSWORD)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("email", &"<redacted>")
            .field("password", &"<redacted>")
            .finish()
    }
}

fn required_env(name: &str) -> Result<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::config(format!(
            "{name} must be set to log in without a saved session"
        ))),
    }
}

// ============================================================================
// ExecutionMode
// ============================================================================

/// Which backend serves tweet and reply requests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExecutionMode {
    /// Drive a headless browser.
    #[default]
    Browser,
    /// Forward to the official API client behind the rate governor.
    OfficialApi,
}

impl ExecutionMode {
    /// Reads `TWEETFREE_MODE`, defaulting to [`ExecutionMode::Browser`].
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if the variable holds an unknown mode.
    pub fn from_env() -> Result<Self> {
        match env::var(ENV_MODE) {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }
}

impl FromStr for ExecutionMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "browser" | "automation" => Ok(Self::Browser),
            "api" | "official" | "official-api" => Ok(Self::OfficialApi),
            other => Err(Error::config(format!(
                "unknown execution mode '{other}' (expected 'browser' or 'api')"
            ))),
        }
    }
}

// ============================================================================
// Timings
// ============================================================================

/// Durations the engine waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Pause between typed characters.
    pub type_delay: Duration,
    /// Interval between element polls.
    pub poll_interval: Duration,
    /// Timeout for content reads where a quick "absent" is acceptable.
    pub content_timeout: Duration,
    /// Timeout for elements an action depends on.
    pub interact_timeout: Duration,
    /// Pause after submitting the login form.
    pub login_settle: Duration,
    /// Pause after submitting a post.
    pub post_settle: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            type_delay: Duration::from_millis(30),
            poll_interval: Duration::from_millis(100),
            content_timeout: Duration::from_secs(3),
            interact_timeout: Duration::from_secs(30),
            login_settle: Duration::from_secs(2),
            post_settle: Duration::from_millis(500),
        }
    }
}

/// Used when `now + timeout` does not fit in an [`Instant`].
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Deadline `timeout` from now.
///
/// Saturates at a far deadline instead of overflowing, so a caller may pass
/// `Duration::MAX` to mean "no practical bound".
pub(crate) fn deadline_after(timeout: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(timeout)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}

// ============================================================================
// EngineConfig
// ============================================================================

/// Target site and timing configuration.
///
/// # Example
///
/// ```ignore
/// use std::time::Duration;
/// use tweetfree::EngineConfig;
///
/// let config = EngineConfig::new()
///     .with_base_url("https://x.com")?
///     .with_type_delay(Duration::from_millis(50));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    base_url: Url,
    timings: Timings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base url is valid"),
            timings: Timings::default(),
        }
    }
}

impl EngineConfig {
    /// Creates the default configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the site root.
    ///
    /// # Errors
    ///
    /// [`Error::Config`] if `url` is not an absolute http(s) URL.
    pub fn with_base_url(mut self, url: &str) -> Result<Self> {
        let parsed =
            Url::parse(url).map_err(|e| Error::config(format!("invalid base url '{url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Error::config(format!(
                "base url must be http(s), got '{}'",
                parsed.scheme()
            )));
        }
        self.base_url = parsed;
        Ok(self)
    }

    /// Replaces all timings.
    #[inline]
    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Sets the per-character typing delay.
    #[inline]
    #[must_use]
    pub fn with_type_delay(mut self, delay: Duration) -> Self {
        self.timings.type_delay = delay;
        self
    }

    /// Sets the timeout for elements an action depends on.
    #[inline]
    #[must_use]
    pub fn with_interact_timeout(mut self, timeout: Duration) -> Self {
        self.timings.interact_timeout = timeout;
        self
    }

    /// Returns the timings.
    #[inline]
    #[must_use]
    pub fn timings(&self) -> &Timings {
        &self.timings
    }

    /// Returns the site root.
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Home timeline URL.
    #[must_use]
    pub fn home_url(&self) -> String {
        self.join(&["home"])
    }

    /// Entry point of the login flow.
    #[must_use]
    pub fn login_url(&self) -> String {
        self.join(&["i", "flow", "login"])
    }

    /// Page of a single status.
    #[must_use]
    pub fn status_url(&self, user: &str, item_id: &str) -> String {
        self.join(&[user, "status", item_id])
    }

    /// Profile page of `user`.
    #[must_use]
    pub fn profile_url(&self, user: &str) -> String {
        self.join(&[user])
    }

    fn join(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.clear().extend(segments);
        }
        url.to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
