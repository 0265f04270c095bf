//! The page capability the engine drives.
//!
//! [`Surface`] is everything the automation needs from a browser: where the
//! page is, how to move it, how to find an element, and how to act on one.
//! [`FirefoxPage`](crate::browser::FirefoxPage) implements it over WebDriver
//! BiDi; tests implement it in memory.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::locator::By;

// ============================================================================
// NodeRef
// ============================================================================

/// Opaque handle to an element resolved on the current page.
///
/// Only valid until the page re-renders the element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeRef(String);

impl NodeRef {
    /// Wraps a backend handle (BiDi `sharedId`).
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the backend handle.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Cookie
// ============================================================================

/// A browser cookie.
///
/// Field names follow the common cookie-file layout (`expires`, `httpOnly`,
/// `sameSite`) so existing `cookies.json` exports load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cookie {
    /// Cookie name.
    pub name: String,
    /// Cookie value.
    pub value: String,
    /// Domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// Expiry as seconds since the epoch; `None` for session cookies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<f64>,
    /// HttpOnly flag.
    #[serde(rename = "httpOnly", default, skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    /// Secure flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    /// SameSite attribute (`Strict`, `Lax`, `None`).
    #[serde(rename = "sameSite", default, skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
}

impl Cookie {
    /// Creates a new cookie with name and value.
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: None,
            path: None,
            expires: None,
            http_only: None,
            secure: None,
            same_site: None,
        }
    }

    /// Sets the domain.
    #[inline]
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Sets the path.
    #[inline]
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Sets the secure flag.
    #[inline]
    #[must_use]
    pub fn with_secure(mut self, secure: bool) -> Self {
        self.secure = Some(secure);
        self
    }

    /// Sets the expiry timestamp (seconds).
    #[inline]
    #[must_use]
    pub fn with_expires(mut self, expires: f64) -> Self {
        self.expires = Some(expires);
        self
    }
}

// ============================================================================
// Surface
// ============================================================================

/// A live page that can be navigated, queried and acted on.
///
/// Implementations are used behind the engine's mutex, so methods take
/// `&self` and need not coordinate between themselves.
#[async_trait]
pub trait Surface: Send + Sync {
    /// Returns the URL of the current document.
    async fn current_url(&self) -> Result<String>;

    /// Navigates and waits for the document to finish loading.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Resolves the first element matching `query`, if any.
    async fn locate(&self, query: &By) -> Result<Option<NodeRef>>;

    /// Returns `true` if the element has a box and is not hidden by style.
    async fn is_visible(&self, node: &NodeRef) -> Result<bool>;

    /// Returns the element's `textContent`.
    async fn text_content(&self, node: &NodeRef) -> Result<Option<String>>;

    /// Clicks the element's center.
    async fn click(&self, node: &NodeRef) -> Result<()>;

    /// Moves keyboard focus to the element.
    async fn focus(&self, node: &NodeRef) -> Result<()>;

    /// Presses and releases one key on the focused element.
    async fn press_key(&self, key: char) -> Result<()>;

    /// Returns every cookie visible to the browsing context.
    async fn cookies(&self) -> Result<Vec<Cookie>>;

    /// Installs a cookie into the browsing context.
    async fn set_cookie(&self, cookie: &Cookie) -> Result<()>;

    /// Releases the underlying browser.
    async fn close(&self) -> Result<()>;
}

// ============================================================================
// Tests
// ============================================================================
