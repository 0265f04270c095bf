//! Browser automation engine.
//!
//! The engine turns "post this" into the clicks and keystrokes a person
//! would make, against whatever [`Surface`](crate::Surface) it was built on.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`Engine`] handle, builder and shared state |
//! | `waiter` | Bounded polling for elements |
//! | `executor` | Type and click actions |
//! | `screen` | Classification of the login modal |
//! | `login` | Multi-step login state machine |
//! | `gatekeeper` | Authentication check before every operation |
//! | `operations` | Tweet, reply, like, retweet |
//! | `profile` | Public profile reads |
//!
//! # Flow
//!
//! ```text
//! Engine::tweet ─▶ lock state ─▶ Gatekeeper::ensure ─▶ (LoginSequencer)
//!               ─▶ navigate ─▶ ElementWaiter / ActionExecutor ─▶ Ok(())
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tweetfree::{Credentials, Engine, FirefoxPage, LaunchOptions};
//!
//! let page = FirefoxPage::launch(&LaunchOptions::new("/usr/bin/firefox")).await?;
//! let engine = Engine::builder(page)
//!     .credentials(Credentials::from_env()?)
//!     .build();
//!
//! engine.tweet("hello").await?;
//! engine.reply("jack", "20", "hi").await?;
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod core;
mod executor;
mod gatekeeper;
mod login;
mod operations;
mod profile;
mod screen;
mod waiter;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use core::{Engine, EngineBuilder, EngineState};
pub use executor::{Action, ActionExecutor};
pub use gatekeeper::AuthPath;
pub use login::{LoginOutcome, LoginSequencer, LoginStage};
pub use profile::UserProfile;
pub use screen::ScreenKind;
pub use waiter::{ElementWaiter, WaitFor};
