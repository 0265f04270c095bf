//! Unsolicited browser events.
//!
//! The backend subscribes to nothing, but Firefox may still emit events
//! (for example during `session.new`). They are parsed so the event loop
//! can log and drop them instead of reporting a malformed message.

use serde::Deserialize;
use serde_json::Value;

/// A BiDi event.
///
/// ```json
/// { "type": "event", "method": "module.eventName", "params": { ... } }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Event {
    /// Event name.
    pub method: String,

    /// Event payload.
    #[serde(default)]
    pub params: Value,
}
