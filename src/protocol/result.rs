//! Typed command results.

// ============================================================================
// Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;

use crate::identifiers::ContextId;

use super::command::BytesValue;

// ============================================================================
// browsingContext
// ============================================================================

/// Result of `browsingContext.getTree`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetTreeResult {
    /// Top-level contexts.
    pub contexts: Vec<ContextInfo>,
}

/// One browsing context.
#[derive(Debug, Clone, Deserialize)]
pub struct ContextInfo {
    /// Context id.
    pub context: ContextId,
    /// Current document URL.
    pub url: String,
}

/// Result of `browsingContext.locateNodes`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocateNodesResult {
    /// Matched nodes, in document order.
    pub nodes: Vec<NodeValue>,
}

/// A node remote value.
#[derive(Debug, Clone, Deserialize)]
pub struct NodeValue {
    /// Node reference for later commands.
    #[serde(rename = "sharedId")]
    pub shared_id: Option<String>,
}

// ============================================================================
// script
// ============================================================================

/// Result of `script.callFunction`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EvaluateResult {
    /// The function returned.
    Success {
        /// Returned value.
        result: RemoteValue,
    },
    /// The function threw.
    Exception {
        /// Details of the exception.
        #[serde(rename = "exceptionDetails")]
        exception_details: ExceptionDetails,
    },
}

/// Exception summary.
#[derive(Debug, Clone, Deserialize)]
pub struct ExceptionDetails {
    /// Message text.
    #[serde(default)]
    pub text: String,
}

/// A serialized JavaScript value.
///
/// Only the primitive shapes the backend's scripts return are interpreted.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteValue {
    /// `string`, `boolean`, `null`, `undefined`, ...
    #[serde(rename = "type")]
    pub kind: String,
    /// Primitive payload.
    #[serde(default)]
    pub value: Option<Value>,
}

impl RemoteValue {
    /// Returns the boolean payload.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.kind.as_str() {
            "boolean" => self.value.as_ref().and_then(Value::as_bool),
            _ => None,
        }
    }

    /// Returns the string payload.
    #[must_use]
    pub fn as_string(&self) -> Option<String> {
        match self.kind.as_str() {
            "string" => self
                .value
                .as_ref()
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

// ============================================================================
// storage
// ============================================================================

/// Result of `storage.getCookies`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetCookiesResult {
    /// Matching cookies.
    pub cookies: Vec<StoredCookie>,
}

/// A cookie as the browser reports it.
#[derive(Debug, Clone, Deserialize)]
pub struct StoredCookie {
    /// Name.
    pub name: String,
    /// Value.
    pub value: BytesValue,
    /// Domain.
    pub domain: String,
    /// Path.
    pub path: String,
    /// HttpOnly flag.
    #[serde(rename = "httpOnly")]
    pub http_only: bool,
    /// Secure flag.
    pub secure: bool,
    /// `strict`, `lax` or `none`.
    #[serde(rename = "sameSite")]
    pub same_site: String,
    /// Expiry, absent for session cookies.
    #[serde(default)]
    pub expiry: Option<u64>,
}

// ============================================================================
// Tests
// ============================================================================
