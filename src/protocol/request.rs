//! Request and Response message types.
//!
//! BiDi correlates replies to commands by a numeric `id` chosen by the
//! client.

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::identifiers::RequestId;

use super::Command;

// ============================================================================
// Request
// ============================================================================

/// A command sent to the browser.
///
/// # Format
///
/// ```json
/// { "id": 1, "method": "module.methodName", "params": { ... } }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// Correlation id.
    pub id: RequestId,

    /// Method and params.
    #[serde(flatten)]
    pub command: Command,
}

impl Request {
    /// Creates a request with a fresh id.
    #[inline]
    #[must_use]
    pub fn new(command: Command) -> Self {
        Self {
            id: RequestId::next(),
            command,
        }
    }
}

// ============================================================================
// Response
// ============================================================================

/// Reply type discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    /// Command succeeded.
    Success,
    /// Command failed.
    Error,
}

/// A reply to a [`Request`].
///
/// Success:
/// ```json
/// { "type": "success", "id": 1, "result": { ... } }
/// ```
///
/// Error:
/// ```json
/// { "type": "error", "id": 1, "error": "no such node", "message": "..." }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Response {
    /// Matches the request `id`.
    pub id: RequestId,

    /// Reply type.
    #[serde(rename = "type")]
    pub response_type: ResponseType,

    /// Result data (if success).
    #[serde(default)]
    pub result: Option<Value>,

    /// Error code (if error).
    #[serde(default)]
    pub error: Option<String>,

    /// Error message (if error).
    #[serde(default)]
    pub message: Option<String>,
}

impl Response {
    /// Extracts the result value.
    ///
    /// # Errors
    ///
    /// [`Error::Remote`] carrying the browser's error code and message.
    pub fn into_result(self) -> Result<Value> {
        match self.response_type {
            ResponseType::Success => Ok(self.result.unwrap_or(Value::Null)),
            ResponseType::Error => {
                let code = self.error.unwrap_or_else(|| "unknown error".to_string());
                let message = self.message.unwrap_or_default();
                Err(Error::remote(code, message))
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
