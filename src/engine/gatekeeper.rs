//! Authentication check run at the start of every operation.

// ============================================================================
// Imports
// ============================================================================

use tracing::{debug, info, warn};

use super::core::EngineState;
use super::login::{LoginOutcome, LoginSequencer};
use crate::config::{Credentials, EngineConfig};
use crate::error::{Error, Result};
use crate::session::{Session, SessionStore};
use crate::surface::Surface;

// ============================================================================
// AuthPath
// ============================================================================

/// How [`Gatekeeper::ensure`] reached the authenticated state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPath {
    /// The engine was already authenticated; nothing happened.
    Cached,
    /// Cookies from the session store were installed.
    RestoredSession,
    /// The login sequencer ran.
    Login(LoginOutcome),
}

// ============================================================================
// Gatekeeper
// ============================================================================

/// Brings an [`EngineState`] to the authenticated state.
pub(crate) struct Gatekeeper<'a> {
    pub config: &'a EngineConfig,
    pub credentials: Option<&'a Credentials>,
    pub store: &'a dyn SessionStore,
}

impl Gatekeeper<'_> {
    /// Authenticates the surface unless `state` already is.
    ///
    /// Runs with the engine lock held, so at most one login happens per
    /// engine no matter how many operations race for it.
    pub async fn ensure<S: Surface>(&self, state: &mut EngineState<S>) -> Result<AuthPath> {
        if state.authenticated {
            return Ok(AuthPath::Cached);
        }

        let surface = &state.surface;
        let home = self.config.home_url();
        navigate_if_elsewhere(surface, &home).await?;

        let path = match self.load_session().await {
            Some(session) => {
                for cookie in session.cookies() {
                    surface.set_cookie(cookie).await?;
                }
                info!(
                    cookie_count = session.cookies().len(),
                    "Restored saved session"
                );
                AuthPath::RestoredSession
            }
            None => {
                let credentials = self.credentials.ok_or_else(|| {
                    Error::config("no saved session and no credentials configured")
                })?;
                let outcome = LoginSequencer::new(surface, self.config, credentials)
                    .run()
                    .await?;
                if outcome.submitted_credentials() {
                    self.persist(surface).await;
                }
                AuthPath::Login(outcome)
            }
        };

        state.authenticated = true;
        state.surface.navigate(&home).await?;

        debug!(path = ?path, "Authenticated");
        Ok(path)
    }

    async fn load_session(&self) -> Option<Session> {
        match self.store.load().await {
            Ok(Some(session)) if !session.is_empty() => Some(session),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Failed to load saved session, logging in instead");
                None
            }
        }
    }

    async fn persist<S: Surface>(&self, surface: &S) {
        let cookies = match surface.cookies().await {
            Ok(cookies) => cookies,
            Err(e) => {
                warn!(error = %e, "Failed to read cookies after login");
                return;
            }
        };

        let count = cookies.len();
        match self.store.save(&Session::new(cookies)).await {
            Ok(()) => info!(cookie_count = count, "Saved session"),
            Err(e) => warn!(error = %e, "Failed to save session"),
        }
    }
}

/// Navigates to `url` unless the surface is already there.
pub(crate) async fn navigate_if_elsewhere<S: Surface>(surface: &S, url: &str) -> Result<()> {
    if surface.current_url().await? != url {
        surface.navigate(url).await?;
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
