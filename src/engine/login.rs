//! Interactive login as a resumable state machine.
//!
//! ```text
//! Start ─▶ ProbeModal ─┬─▶ AlreadyAuthenticated ─────────────────────────▶ Settled
//!                      └─▶ NeedEmail ─▶ EmailEntered ─▶ ProbeModal2 ─┬─▶ NeedUsernameChallenge ─┐
//!                                                                    └──────────────────────────┤
//!                                                                                               ▼
//!                                       Settled ◀─ Submitted ◀─ PasswordEntered ◀─ PasswordStage
//! ```
//!
//! A step whose element never shows up aborts the run with
//! [`Error::LoginIncomplete`] naming the stage reached. Nothing is rolled
//! back; the next run starts over from `ProbeModal` and re-reads the page.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::executor::{Action, ActionExecutor};
use super::screen::ScreenKind;
use super::waiter::ElementWaiter;
use crate::config::{Credentials, EngineConfig};
use crate::error::{Error, Result};
use crate::locator::LocatorKey;
use crate::surface::Surface;

// ============================================================================
// LoginStage
// ============================================================================

/// Position in the login sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoginStage {
    /// Nothing done yet.
    Start,
    /// Reading the modal header on the current page.
    ProbeModal,
    /// No sign-in modal; nothing to do.
    AlreadyAuthenticated,
    /// Opening the login flow and entering the email.
    NeedEmail,
    /// Email submitted.
    EmailEntered,
    /// Reading the modal header again after the email step.
    ProbeModal2,
    /// Answering the unusual-activity challenge with the handle.
    NeedUsernameChallenge,
    /// Entering the password.
    PasswordStage,
    /// Password typed.
    PasswordEntered,
    /// Login form submitted.
    Submitted,
    /// Terminal state.
    Settled,
}

impl LoginStage {
    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ProbeModal => "probe_modal",
            Self::AlreadyAuthenticated => "already_authenticated",
            Self::NeedEmail => "need_email",
            Self::EmailEntered => "email_entered",
            Self::ProbeModal2 => "probe_modal2",
            Self::NeedUsernameChallenge => "need_username_challenge",
            Self::PasswordStage => "password_stage",
            Self::PasswordEntered => "password_entered",
            Self::Submitted => "submitted",
            Self::Settled => "settled",
        }
    }
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// LoginOutcome
// ============================================================================

/// How a completed login run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    /// The page showed no sign-in modal.
    AlreadyAuthenticated,
    /// Credentials were entered and submitted.
    LoggedIn {
        /// Whether the username challenge was answered.
        challenged: bool,
    },
}

impl LoginOutcome {
    /// Returns `true` if credentials were submitted during this run.
    #[inline]
    #[must_use]
    pub const fn submitted_credentials(self) -> bool {
        matches!(self, Self::LoggedIn { .. })
    }
}

// ============================================================================
// LoginSequencer
// ============================================================================

/// Drives one login attempt on a surface.
pub struct LoginSequencer<'a, S> {
    surface: &'a S,
    config: &'a EngineConfig,
    credentials: &'a Credentials,
    stage: LoginStage,
}

impl<'a, S: Surface> LoginSequencer<'a, S> {
    /// Creates a sequencer at [`LoginStage::Start`].
    #[must_use]
    pub fn new(surface: &'a S, config: &'a EngineConfig, credentials: &'a Credentials) -> Self {
        Self {
            surface,
            config,
            credentials,
            stage: LoginStage::Start,
        }
    }

    /// Returns the stage reached so far.
    #[inline]
    #[must_use]
    pub fn stage(&self) -> LoginStage {
        self.stage
    }

    /// Runs the sequence to [`LoginStage::Settled`].
    ///
    /// # Errors
    ///
    /// - [`Error::LoginIncomplete`] if an expected element is missing or
    ///   rejects input
    /// - connection errors unchanged
    pub async fn run(&mut self) -> Result<LoginOutcome> {
        self.enter(LoginStage::ProbeModal);
        let screen = self.read_screen().await?;

        if !screen.needs_login() {
            if screen == ScreenKind::Unknown {
                warn!("Unrecognized modal on home page, assuming logged in");
            }
            self.enter(LoginStage::AlreadyAuthenticated);
            self.enter(LoginStage::Settled);
            return Ok(LoginOutcome::AlreadyAuthenticated);
        }

        self.enter(LoginStage::NeedEmail);
        let login_url = self.config.login_url();
        self.surface
            .navigate(&login_url)
            .await
            .map_err(|e| self.abort(e))?;
        self.act(Action::type_text(
            LocatorKey::LoginEmail,
            self.credentials.email.as_str(),
        ))
        .await?;
        self.act(Action::click(LocatorKey::LoginNext)).await?;
        self.enter(LoginStage::EmailEntered);

        self.enter(LoginStage::ProbeModal2);
        let challenged = self.read_screen().await? == ScreenKind::UsernameChallenge;
        if challenged {
            self.enter(LoginStage::NeedUsernameChallenge);
            self.act(Action::type_text(
                LocatorKey::ChallengeUsername,
                self.credentials.username.as_str(),
            ))
            .await?;
            self.act(Action::click(LocatorKey::ChallengeNext)).await?;
        }

        self.enter(LoginStage::PasswordStage);
        self.act(Action::type_text(
            LocatorKey::LoginPassword,
            self.credentials.password.as_str(),
        ))
        .await?;
        self.enter(LoginStage::PasswordEntered);

        self.act(Action::click(LocatorKey::LoginSubmit)).await?;
        self.enter(LoginStage::Submitted);

        sleep(self.config.timings().login_settle).await;
        self.enter(LoginStage::Settled);

        info!(challenged, "Login submitted");
        Ok(LoginOutcome::LoggedIn { challenged })
    }

    fn enter(&mut self, stage: LoginStage) {
        debug!(from = %self.stage, to = %stage, "Login stage");
        self.stage = stage;
    }

    async fn read_screen(&self) -> Result<ScreenKind> {
        let timings = self.config.timings();
        let waiter = ElementWaiter::new(self.surface, timings.poll_interval);
        let header = waiter
            .text_of(LocatorKey::ModalHeader, timings.content_timeout)
            .await
            .map_err(|e| self.abort(e))?;

        let screen = ScreenKind::classify(header.as_deref());
        debug!(stage = %self.stage, screen = ?screen, "Classified modal");
        Ok(screen)
    }

    async fn act(&self, action: Action) -> Result<()> {
        ActionExecutor::new(self.surface, self.config.timings())
            .execute(&action)
            .await
            .map_err(|e| self.abort(e))
    }

    fn abort(&self, err: Error) -> Error {
        if err.is_connection_error() {
            return err;
        }
        warn!(stage = %self.stage, error = %err, "Login aborted");
        Error::login_incomplete(self.stage, err.to_string())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use crate::engine::testing::{MockSurface, Op};

    fn credentials() -> Credentials {
        Credentials::new("me@example.com", "me", "hunter2")
    }

    fn config() -> EngineConfig {
        EngineConfig::new().with_interact_timeout(Duration::from_secs(2))
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_modal_terminates_without_steps() {
        let surface = MockSurface::home_timeline();
        let (config, creds) = (config(), credentials());
        let mut login = LoginSequencer::new(&surface, &config, &creds);

        let outcome = login.run().await.expect("login");

        assert_eq!(outcome, LoginOutcome::AlreadyAuthenticated);
        assert_eq!(login.stage(), LoginStage::Settled);
        assert!(surface.actions().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_modal_is_treated_as_authenticated() {
        let surface = MockSurface::home_timeline();
        surface.with(|s| s.set_modal(Some("Welcome back")));
        let (config, creds) = (config(), credentials());

        let outcome = LoginSequencer::new(&surface, &config, &creds)
            .run()
            .await
            .expect("login");

        assert_eq!(outcome, LoginOutcome::AlreadyAuthenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_login_without_challenge() {
        let surface = MockSurface::signed_out(false);
        let (config, creds) = (config(), credentials());

        let outcome = LoginSequencer::new(&surface, &config, &creds)
            .run()
            .await
            .expect("login");

        assert_eq!(outcome, LoginOutcome::LoggedIn { challenged: false });
        assert_eq!(surface.typed(), "me@example.comhunter2");

        let actions = surface.actions();
        assert_eq!(
            actions[0],
            Op::Navigate("https://twitter.com/i/flow/login".into())
        );
        assert_eq!(actions.last(), Some(&Op::Click(LocatorKey::LoginSubmit)));
        assert!(!actions.contains(&Op::Focus(LocatorKey::ChallengeUsername)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_login_with_username_challenge() {
        let surface = MockSurface::signed_out(true);
        let (config, creds) = (config(), credentials());

        let outcome = LoginSequencer::new(&surface, &config, &creds)
            .run()
            .await
            .expect("login");

        assert_eq!(outcome, LoginOutcome::LoggedIn { challenged: true });
        assert_eq!(surface.typed(), "me@example.commehunter2");
        assert!(surface.actions().contains(&Op::Click(LocatorKey::ChallengeNext)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_password_field_aborts_with_stage() {
        let surface = MockSurface::signed_out(false);
        surface.on_click(LocatorKey::LoginNext, |s| {
            s.set_modal(None);
        });
        let (config, creds) = (config(), credentials());
        let mut login = LoginSequencer::new(&surface, &config, &creds);

        let err = login.run().await.expect_err("no password field");

        match err {
            Error::LoginIncomplete { stage, reason } => {
                assert_eq!(stage, LoginStage::PasswordStage);
                assert!(reason.contains("login_password"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(login.stage(), LoginStage::PasswordStage);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_email_field_aborts_at_need_email() {
        let surface = MockSurface::signed_out(false);
        surface.on_navigate(|_, _| {});
        let (config, creds) = (config(), credentials());
        let mut login = LoginSequencer::new(&surface, &config, &creds);

        let err = login.run().await.expect_err("no email field");

        match err {
            Error::LoginIncomplete { stage, reason } => {
                assert_eq!(stage, LoginStage::NeedEmail);
                assert!(reason.contains("login_email"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(login.stage(), LoginStage::NeedEmail);
        assert!(surface.typed().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_modal_read_without_challenge_goes_to_password() {
        for header in ["Sign in to X", "Something went wrong"] {
            let surface = MockSurface::signed_out(false);
            surface.on_click(LocatorKey::LoginNext, move |s| {
                s.remove(LocatorKey::LoginEmail);
                s.remove(LocatorKey::LoginNext);
                s.set_modal(Some(header));
                s.show(LocatorKey::LoginPassword);
                s.show(LocatorKey::LoginSubmit);
            });
            let (config, creds) = (config(), credentials());

            let outcome = LoginSequencer::new(&surface, &config, &creds)
                .run()
                .await
                .expect("login");

            assert_eq!(outcome, LoginOutcome::LoggedIn { challenged: false });
            assert_eq!(surface.typed(), "me@example.comhunter2", "header {header}");
            assert!(!surface.actions().contains(&Op::Focus(LocatorKey::ChallengeUsername)));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_login_settles_after_submit() {
        let surface = MockSurface::signed_out(false);
        let (config, creds) = (config(), credentials());

        let start = tokio::time::Instant::now();
        LoginSequencer::new(&surface, &config, &creds)
            .run()
            .await
            .expect("login");

        assert!(start.elapsed() >= config.timings().login_settle);
    }

    #[test]
    fn test_stage_display_is_snake_case() {
        assert_eq!(LoginStage::EmailEntered.to_string(), "email_entered");
        assert_eq!(LoginStage::ProbeModal2.to_string(), "probe_modal2");
        assert_eq!(
            LoginStage::NeedUsernameChallenge.to_string(),
            "need_username_challenge"
        );
    }
}
