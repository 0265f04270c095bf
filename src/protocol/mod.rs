//! WebDriver BiDi message types.
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | `Request` | Local → Browser | Command request |
//! | `Response` | Browser → Local | Command reply |
//! | `Event` | Browser → Local | Notification, logged and dropped |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Commands by BiDi module |
//! | `event` | Event type |
//! | `request` | Request and Response types |
//! | `result` | Typed command results |

// ============================================================================
// Submodules
// ============================================================================

/// Commands by BiDi module.
pub mod command;

/// Event type.
pub mod event;

/// Request and Response types.
pub mod request;

/// Typed command results.
pub mod result;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{
    BrowsingContextCommand, BytesValue, Command, InputCommand, InputSource, PartialCookie,
    PartitionDescriptor, ReadinessState, ScriptCommand, SessionCommand, SharedReference,
    StorageCommand, Target,
};
pub use event::Event;
pub use request::{Request, Response, ResponseType};
pub use result::{
    EvaluateResult, GetCookiesResult, GetTreeResult, LocateNodesResult, RemoteValue, StoredCookie,
};
