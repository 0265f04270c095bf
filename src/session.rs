//! Persisted authentication state.
//!
//! A [`Session`] is the cookie jar of a logged-in browsing context. A
//! [`SessionStore`] keeps the latest one across process runs: `save`
//! overwrites, `load` returns whatever was saved last. There is no merging
//! and no history.
//!
//! | Store | Backing |
//! |-------|---------|
//! | [`FileSessionStore`] | JSON file, `cookies.json` by default |
//! | [`MemorySessionStore`] | process memory |

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{Error, Result};
use crate::surface::Cookie;

// ============================================================================
// Constants
// ============================================================================

/// Default session file, relative to the working directory.
pub const DEFAULT_SESSION_FILE: &str = "cookies.json";

/// Environment variable overriding the session file path.
pub const ENV_SESSION_PATH: &str = "TWEETFREE_SESSION_PATH";

// ============================================================================
// Session
// ============================================================================

/// Serialized authenticated browsing state.
///
/// Stored as a bare JSON array of cookies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    cookies: Vec<Cookie>,
}

impl Session {
    /// Creates a session from captured cookies.
    #[inline]
    #[must_use]
    pub fn new(cookies: Vec<Cookie>) -> Self {
        Self { cookies }
    }

    /// Returns the cookies.
    #[inline]
    #[must_use]
    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    /// Returns `true` if the session holds no cookies.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

// ============================================================================
// SessionStore
// ============================================================================

/// Durable slot holding the latest [`Session`].
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Replaces any stored session.
    async fn save(&self, session: &Session) -> Result<()>;

    /// Returns the stored session, or `None` if nothing was saved.
    async fn load(&self) -> Result<Option<Session>>;

    /// Removes the stored session.
    async fn clear(&self) -> Result<()>;
}

// ============================================================================
// FileSessionStore
// ============================================================================

/// Session stored as a JSON file.
///
/// Writes go to a sibling `.tmp` file which is then renamed over the target,
/// so a crash mid-write leaves the previous session intact.
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl Default for FileSessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_FILE)
    }
}

impl FileSessionStore {
    /// Creates a store backed by `path`.
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Uses `TWEETFREE_SESSION_PATH` if set, else `cookies.json`.
    #[must_use]
    pub fn from_env() -> Self {
        match env::var(ENV_SESSION_PATH) {
            Ok(path) if !path.trim().is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }

    /// Returns the backing file path.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| DEFAULT_SESSION_FILE.into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn save(&self, session: &Session) -> Result<()> {
        let json = serde_json::to_vec_pretty(session)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await?;
        }

        let temp = self.temp_path();
        fs::write(&temp, &json).await?;
        fs::rename(&temp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            cookie_count = session.cookies.len(),
            "Saved session"
        );
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved session");
                return Ok(None);
            }
            Err(e) => return Err(Error::Io(e)),
        };

        let session: Session = serde_json::from_slice(&bytes)?;
        debug!(
            path = %self.path.display(),
            cookie_count = session.cookies.len(),
            "Loaded session"
        );
        Ok(Some(session))
    }

    async fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }
}

// ============================================================================
// MemorySessionStore
// ============================================================================

/// Session kept in process memory.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding `session`.
    #[inline]
    #[must_use]
    pub fn with_session(session: Session) -> Self {
        Self {
            slot: Mutex::new(Some(session)),
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock() = Some(session.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot.lock().clone())
    }

    async fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
