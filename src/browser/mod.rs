//! Firefox backend for the [`Surface`](crate::Surface) capability.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`FirefoxPage`] | Top-level browsing context (owns process, profile and socket) |
//! | [`LaunchOptions`] | How the Firefox process is started |
//! | [`Profile`] | Temporary profile with a generated `user.js` |
//!
//! # Example
//!
//! ```no_run
//! use tweetfree::{FirefoxPage, LaunchOptions, Result, Surface};
//!
//! # async fn example() -> Result<()> {
//! let page = FirefoxPage::launch(&LaunchOptions::new("/usr/bin/firefox")).await?;
//!
//! page.navigate("https://twitter.com/home").await?;
//! println!("{}", page.current_url().await?);
//!
//! page.close().await?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Launch options.
pub mod options;

/// Surface implementation over BiDi.
pub mod page;

/// Firefox child process.
mod process;

/// Temporary profile.
pub mod profile;

// ============================================================================
// Re-exports
// ============================================================================

pub use options::{DEFAULT_USER_AGENT, LaunchOptions};
pub use page::FirefoxPage;
pub use profile::{Preference, PreferenceValue, Profile};
