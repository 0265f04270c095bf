//! tweetfree - post and reply on Twitter/X by driving a headless browser.
//!
//! The crate automates the same clicks and keystrokes a person makes in the
//! web client, so no API keys are required. A saved cookie session avoids
//! logging in on every start.
//!
//! # Architecture
//!
//! - An [`Engine`] owns one [`Surface`] (a live page) behind an async mutex
//! - Every operation first passes the session gatekeeper, which restores
//!   saved cookies or runs the login sequence
//! - Operations are built from two actions, type and click, on elements
//!   named in the locator table and found by a bounded waiter
//! - [`FirefoxPage`] implements [`Surface`] over WebDriver BiDi
//! - The [`RateGovernor`] guards API-mode posting with recorded quota
//!   headers
//!
//! # Quick Start
//!
//! ```no_run
//! use tweetfree::{Credentials, Engine, FirefoxPage, LaunchOptions, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let page = FirefoxPage::launch(&LaunchOptions::default()).await?;
//!
//!     let engine = Engine::builder(page)
//!         .credentials(Credentials::from_env()?)
//!         .build();
//!
//!     engine.tweet("Hello from a headless browser").await?;
//!     engine.reply("jack", "20", "just setting up my twttr").await?;
//!
//!     engine.shutdown().await
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`engine`] | Waiter, executor, login, gatekeeper, operations and profile reads |
//! | [`locator`] | Element locator table |
//! | [`session`] | Cookie session persistence |
//! | [`governor`] | Quota tracking for API-mode posting |
//! | [`config`] | Timings, URLs, credentials, execution mode |
//! | [`surface`] | The page capability the engine drives |
//! | [`browser`] | Firefox backend for [`Surface`] |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`protocol`] | BiDi message types (internal) |
//! | [`transport`] | WebSocket transport layer (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Firefox backend: launch options, profile and the BiDi page.
pub mod browser;

/// Engine configuration and credentials.
pub mod config;

/// Browser automation engine.
///
/// Use [`Engine::builder()`] to create an engine over a [`Surface`].
pub mod engine;

/// Error types and result aliases.
///
/// All fallible operations return [`Result<T>`] which uses [`Error`].
pub mod error;

/// Rate limit bookkeeping for API-mode posting.
pub mod governor;

/// Type-safe identifiers for protocol entities.
pub mod identifiers;

/// Named element locators.
pub mod locator;

/// The posting contract shared by the browser engine and API clients.
pub mod poster;

/// WebDriver BiDi message types.
///
/// Internal module defining command, response and event structures.
pub mod protocol;

/// Cookie session persistence.
pub mod session;

/// The page capability the engine drives.
pub mod surface;

/// WebSocket transport layer.
///
/// Internal module handling the BiDi connection.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Browser types
pub use browser::{FirefoxPage, LaunchOptions};

// Configuration
pub use config::{Credentials, EngineConfig, ExecutionMode, Timings};

// Engine types
pub use engine::{
    Action, ActionExecutor, AuthPath, ElementWaiter, Engine, EngineBuilder, LoginOutcome,
    LoginSequencer, LoginStage, ScreenKind, UserProfile, WaitFor,
};

// Error types
pub use error::{Error, Result};

// Governor types
pub use governor::{Governed, QuotaBook, QuotaSnapshot, RateGovernor, RateLimitResponse};

// Identifier types
pub use identifiers::{ContextId, RequestId};

// Locators
pub use locator::{By, LocatorKey};

// Posting contract
pub use poster::Poster;

// Session types
pub use session::{FileSessionStore, MemorySessionStore, Session, SessionStore};

// Surface types
pub use surface::{Cookie, NodeRef, Surface};
