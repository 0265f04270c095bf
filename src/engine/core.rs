//! Engine handle and shared state.
//!
//! An [`Engine`] owns one [`Surface`] behind an async mutex. Every public
//! operation holds that mutex for its whole sequence (authenticate,
//! navigate, wait, act), so two operations never interleave keystrokes on
//! the same page. Clones share the surface and the lock.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, trace};

use super::executor::ActionExecutor;
use super::gatekeeper::{AuthPath, Gatekeeper};
use super::waiter::ElementWaiter;
use crate::config::{Credentials, EngineConfig};
use crate::error::Result;
use crate::session::{FileSessionStore, SessionStore};
use crate::surface::Surface;

// ============================================================================
// EngineState
// ============================================================================

/// Mutable engine state, only reachable through the engine lock.
pub struct EngineState<S> {
    /// The page being driven.
    pub(crate) surface: S,
    /// Whether the surface holds an authenticated session.
    pub(crate) authenticated: bool,
}

impl<S> EngineState<S> {
    /// Wraps a fresh, unauthenticated surface.
    #[inline]
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            authenticated: false,
        }
    }

    /// Returns the surface.
    #[inline]
    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Returns `true` once the gatekeeper has authenticated the surface.
    #[inline]
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

// ============================================================================
// Types
// ============================================================================

/// Internal shared state for the engine.
pub(crate) struct EngineInner<S> {
    /// Surface and authentication flag.
    pub state: Mutex<EngineState<S>>,

    /// Site and timing configuration.
    pub config: EngineConfig,

    /// Account used when no saved session exists.
    pub credentials: Option<Credentials>,

    /// Where the session is persisted between runs.
    pub store: Arc<dyn SessionStore>,
}

// ============================================================================
// Engine
// ============================================================================

/// Automation engine posting through a browser [`Surface`].
///
/// # Example
///
/// ```ignore
/// use tweetfree::{Credentials, Engine, FirefoxPage, LaunchOptions};
///
/// let page = FirefoxPage::launch(&LaunchOptions::default()).await?;
/// let engine = Engine::builder(page)
///     .credentials(Credentials::from_env()?)
///     .build();
///
/// engine.tweet("hello").await?;
/// engine.shutdown().await?;
/// ```
pub struct Engine<S> {
    pub(crate) inner: Arc<EngineInner<S>>,
}

impl<S> Clone for Engine<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

// ============================================================================
// Engine - Display
// ============================================================================

impl<S> fmt::Debug for Engine<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("base_url", &self.inner.config.base_url().as_str())
            .field("has_credentials", &self.inner.credentials.is_some())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Engine - Public API
// ============================================================================

impl<S: Surface> Engine<S> {
    /// Creates a builder around `surface`.
    #[inline]
    #[must_use]
    pub fn builder(surface: S) -> EngineBuilder<S> {
        EngineBuilder::new(surface)
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.inner.config
    }

    /// Authenticates the surface if it is not already.
    ///
    /// Operations call this themselves; calling it up front moves the login
    /// cost out of the first post.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`](crate::Error::Config) without a saved session or
    ///   credentials
    /// - [`Error::LoginIncomplete`](crate::Error::LoginIncomplete) if the
    ///   login flow stops short
    pub async fn ensure_authenticated(&self) -> Result<AuthPath> {
        let mut state = self.lock().await;
        self.gatekeeper().ensure(&mut *state).await
    }

    /// Returns `true` once a session has been installed or a login ran.
    pub async fn is_authenticated(&self) -> bool {
        self.lock().await.authenticated
    }

    /// Forgets the current session.
    ///
    /// Clears the stored session and the in-memory flag so the next
    /// operation logs in interactively. Use this when posts start failing
    /// because the installed cookies were revoked remotely.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store cannot be cleared.
    pub async fn reset_session(&self) -> Result<()> {
        let mut state = self.lock().await;
        state.authenticated = false;
        self.inner.store.clear().await?;
        info!("Session reset");
        Ok(())
    }

    /// Closes the surface.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface fails to close cleanly.
    pub async fn shutdown(&self) -> Result<()> {
        let mut state = self.lock().await;
        state.authenticated = false;
        state.surface.close().await?;
        info!("Engine shut down");
        Ok(())
    }
}

// ============================================================================
// Engine - Internal
// ============================================================================

impl<S: Surface> Engine<S> {
    pub(crate) async fn lock(&self) -> MutexGuard<'_, EngineState<S>> {
        let guard = self.inner.state.lock().await;
        trace!("Engine lock acquired");
        guard
    }

    pub(crate) fn gatekeeper(&self) -> Gatekeeper<'_> {
        Gatekeeper {
            config: &self.inner.config,
            credentials: self.inner.credentials.as_ref(),
            store: self.inner.store.as_ref(),
        }
    }

    pub(crate) fn waiter<'a>(&'a self, surface: &'a S) -> ElementWaiter<'a, S> {
        ElementWaiter::new(surface, self.inner.config.timings().poll_interval)
    }

    pub(crate) fn executor<'a>(&'a self, surface: &'a S) -> ActionExecutor<'a, S> {
        ActionExecutor::new(surface, self.inner.config.timings())
    }
}

// ============================================================================
// EngineBuilder
// ============================================================================

/// Builder for an [`Engine`].
///
/// Use [`Engine::builder()`] to create one.
pub struct EngineBuilder<S> {
    surface: S,
    config: EngineConfig,
    credentials: Option<Credentials>,
    store: Option<Arc<dyn SessionStore>>,
}

impl<S: Surface> EngineBuilder<S> {
    /// Creates a builder with default configuration and no credentials.
    #[inline]
    #[must_use]
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            config: EngineConfig::default(),
            credentials: None,
            store: None,
        }
    }

    /// Sets the site and timing configuration.
    #[inline]
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the account used when no saved session exists.
    #[inline]
    #[must_use]
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Sets the session store.
    ///
    /// Defaults to [`FileSessionStore::from_env`].
    #[inline]
    #[must_use]
    pub fn session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the engine. Nothing touches the surface until the first
    /// operation.
    #[must_use]
    pub fn build(self) -> Engine<S> {
        let store = self
            .store
            .unwrap_or_else(|| Arc::new(FileSessionStore::from_env()));

        Engine {
            inner: Arc::new(EngineInner {
                state: Mutex::new(EngineState::new(self.surface)),
                config: self.config,
                credentials: self.credentials,
                store,
            }),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::engine::login::LoginOutcome;
    use crate::engine::testing::{MockSurface, Op};
    use crate::session::{MemorySessionStore, Session};
    use crate::surface::Cookie;

    fn engine(surface: MockSurface, store: Arc<MemorySessionStore>) -> Engine<MockSurface> {
        Engine::builder(surface)
            .config(EngineConfig::new().with_interact_timeout(Duration::from_secs(2)))
            .credentials(Credentials::new("me@example.com", "me", "hunter2"))
            .session_store(store)
            .build()
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_twice_logs_in_once() {
        let surface = MockSurface::signed_out(false);
        let engine = engine(surface.clone(), Arc::new(MemorySessionStore::new()));

        let first = engine.ensure_authenticated().await.expect("first");
        let typed = surface.typed();
        let second = engine.ensure_authenticated().await.expect("second");

        assert_eq!(first, AuthPath::Login(LoginOutcome::LoggedIn { challenged: false }));
        assert_eq!(second, AuthPath::Cached);
        assert_eq!(surface.typed(), typed);
        assert!(engine.is_authenticated().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_ensure_logs_in_once() {
        let surface = MockSurface::signed_out(false);
        let engine = engine(surface.clone(), Arc::new(MemorySessionStore::new()));

        let (a, b) = tokio::join!(engine.ensure_authenticated(), engine.ensure_authenticated());
        let paths = [a.expect("a"), b.expect("b")];

        assert_eq!(paths.iter().filter(|p| **p == AuthPath::Cached).count(), 1);
        assert_eq!(surface.typed(), "me@example.comhunter2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_session_forces_login() {
        let store = Arc::new(MemorySessionStore::with_session(Session::new(vec![
            Cookie::new("auth_token", "stale"),
        ])));
        let surface = MockSurface::signed_out(false);
        let engine = engine(surface.clone(), Arc::clone(&store));

        assert_eq!(
            engine.ensure_authenticated().await.expect("restore"),
            AuthPath::RestoredSession
        );

        engine.reset_session().await.expect("reset");
        assert!(!engine.is_authenticated().await);
        assert_eq!(store.load().await.expect("load"), None);

        surface.with(|s| {
            s.cookies.clear();
            s.set_modal(Some("Sign in to X"));
            s.url = "about:blank".into();
        });
        let path = engine.ensure_authenticated().await.expect("login");
        assert!(matches!(path, AuthPath::Login(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_closes_surface() {
        let surface = MockSurface::home_timeline();
        let engine = engine(surface.clone(), Arc::new(MemorySessionStore::new()));

        engine.shutdown().await.expect("shutdown");
        assert_eq!(surface.log(), vec![Op::Close]);
    }

    #[test]
    fn test_debug_hides_credentials() {
        let engine = engine(MockSurface::new(), Arc::new(MemorySessionStore::new()));
        let debug = format!("{engine:?}");
        assert!(debug.contains("has_credentials: true"));
        assert!(!debug.contains("hunter2"));
    }
}
