//! WebSocket transport to the browser's BiDi endpoint.
//!
//! ```text
//! FirefoxPage ──send(Command)──▶ Connection ──mpsc──▶ event loop ──ws──▶ Firefox
//!             ◀──Result<Value>──            ◀─oneshot─            ◀─ws──
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// WebSocket connection and event loop.
pub mod connection;

// ============================================================================
// Re-exports
// ============================================================================

pub use connection::{Connection, DEFAULT_COMMAND_TIMEOUT};
