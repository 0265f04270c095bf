//! WebDriver BiDi commands used by the Firefox backend.
//!
//! Commands follow the BiDi `module.methodName` format and serialize as
//! `{"method": "...", "params": {...}}`, flattened into a [`Request`].
//!
//! | Module | Commands |
//! |--------|----------|
//! | `session` | `new`, `end` |
//! | `browsingContext` | `getTree`, `navigate`, `locateNodes` |
//! | `script` | `callFunction` |
//! | `input` | `performActions` |
//! | `storage` | `getCookies`, `setCookie` |
//!
//! [`Request`]: super::Request

// ============================================================================
// Imports
// ============================================================================

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifiers::ContextId;
use crate::locator::By;

// ============================================================================
// Command Wrapper
// ============================================================================

/// All commands the backend sends.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Command {
    /// Session module commands.
    Session(SessionCommand),
    /// BrowsingContext module commands.
    BrowsingContext(BrowsingContextCommand),
    /// Script module commands.
    Script(ScriptCommand),
    /// Input module commands.
    Input(InputCommand),
    /// Storage module commands.
    Storage(StorageCommand),
}

impl Command {
    /// Returns the BiDi method name, for logging.
    #[must_use]
    pub fn method(&self) -> &'static str {
        match self {
            Self::Session(SessionCommand::New { .. }) => "session.new",
            Self::Session(SessionCommand::End {}) => "session.end",
            Self::BrowsingContext(BrowsingContextCommand::GetTree { .. }) => {
                "browsingContext.getTree"
            }
            Self::BrowsingContext(BrowsingContextCommand::Navigate { .. }) => {
                "browsingContext.navigate"
            }
            Self::BrowsingContext(BrowsingContextCommand::LocateNodes { .. }) => {
                "browsingContext.locateNodes"
            }
            Self::Script(ScriptCommand::CallFunction { .. }) => "script.callFunction",
            Self::Input(InputCommand::PerformActions { .. }) => "input.performActions",
            Self::Storage(StorageCommand::GetCookies { .. }) => "storage.getCookies",
            Self::Storage(StorageCommand::SetCookie { .. }) => "storage.setCookie",
        }
    }
}

// ============================================================================
// Session Commands
// ============================================================================

/// Session lifecycle.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum SessionCommand {
    /// Start a BiDi session.
    #[serde(rename = "session.new")]
    New {
        /// Requested capabilities.
        capabilities: Value,
    },

    /// End the session; Firefox exits afterwards.
    #[serde(rename = "session.end")]
    End {},
}

// ============================================================================
// BrowsingContext Commands
// ============================================================================

/// Navigation and element lookup.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum BrowsingContextCommand {
    /// List open browsing contexts.
    #[serde(rename = "browsingContext.getTree")]
    GetTree {
        /// How many levels of child frames to include.
        #[serde(rename = "maxDepth")]
        max_depth: u32,
    },

    /// Navigate a context.
    #[serde(rename = "browsingContext.navigate")]
    Navigate {
        /// Target context.
        context: ContextId,
        /// Destination.
        url: String,
        /// Readiness to wait for before replying.
        wait: ReadinessState,
    },

    /// Find nodes matching a locator.
    #[serde(rename = "browsingContext.locateNodes")]
    LocateNodes {
        /// Target context.
        context: ContextId,
        /// Query; serializes as `{"type": "xpath"|"css", "value": ...}`.
        locator: By,
        /// Upper bound on returned nodes.
        #[serde(rename = "maxNodeCount")]
        max_node_count: u32,
    },
}

/// Document readiness a navigation waits for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadinessState {
    /// Reply immediately.
    None,
    /// DOM parsed.
    Interactive,
    /// Load event fired.
    Complete,
}

// ============================================================================
// Script Commands
// ============================================================================

/// JavaScript evaluation.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum ScriptCommand {
    /// Call a function with node arguments.
    #[serde(rename = "script.callFunction")]
    CallFunction {
        /// Function source.
        #[serde(rename = "functionDeclaration")]
        function_declaration: String,
        /// Whether to await a returned promise.
        #[serde(rename = "awaitPromise")]
        await_promise: bool,
        /// Realm to run in.
        target: Target,
        /// Node arguments.
        arguments: Vec<SharedReference>,
    },
}

/// Script target: the default realm of a context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    /// Context whose realm is used.
    pub context: ContextId,
}

/// Reference to a node returned by an earlier command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedReference {
    /// Node id, valid until the node is discarded.
    #[serde(rename = "sharedId")]
    pub shared_id: String,
}

// ============================================================================
// Input Commands
// ============================================================================

/// Synthesized user input.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum InputCommand {
    /// Perform a batch of input actions.
    #[serde(rename = "input.performActions")]
    PerformActions {
        /// Target context.
        context: ContextId,
        /// One entry per input source.
        actions: Vec<InputSource>,
    },
}

/// An input device and its action sequence.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum InputSource {
    /// Keyboard.
    Key {
        /// Source id.
        id: String,
        /// Key actions.
        actions: Vec<KeyAction>,
    },
    /// Mouse.
    Pointer {
        /// Source id.
        id: String,
        /// Device parameters.
        parameters: PointerParameters,
        /// Pointer actions.
        actions: Vec<PointerAction>,
    },
}

impl InputSource {
    /// Press and release `key` on the keyboard.
    #[must_use]
    pub fn key_press(key: char) -> Self {
        let value = key_value(key);
        Self::Key {
            id: "keyboard".to_string(),
            actions: vec![
                KeyAction::KeyDown {
                    value: value.clone(),
                },
                KeyAction::KeyUp { value },
            ],
        }
    }

    /// Move the mouse to the center of `element`, then press and release the
    /// left button.
    #[must_use]
    pub fn click(element: SharedReference) -> Self {
        Self::Pointer {
            id: "mouse".to_string(),
            parameters: PointerParameters {
                pointer_type: "mouse".to_string(),
            },
            actions: vec![
                PointerAction::PointerMove {
                    x: 0,
                    y: 0,
                    origin: Origin::Element { element },
                },
                PointerAction::PointerDown { button: 0 },
                PointerAction::PointerUp { button: 0 },
            ],
        }
    }
}

/// Keyboard action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum KeyAction {
    /// Key pressed.
    KeyDown {
        /// Key value.
        value: String,
    },
    /// Key released.
    KeyUp {
        /// Key value.
        value: String,
    },
}

/// Pointer device parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointerParameters {
    /// `mouse`, `pen` or `touch`.
    #[serde(rename = "pointerType")]
    pub pointer_type: String,
}

/// Pointer action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerAction {
    /// Move relative to `origin`.
    PointerMove {
        /// X offset.
        x: i32,
        /// Y offset.
        y: i32,
        /// What the offset is relative to.
        origin: Origin,
    },
    /// Button pressed.
    PointerDown {
        /// Button index.
        button: u32,
    },
    /// Button released.
    PointerUp {
        /// Button index.
        button: u32,
    },
}

/// Origin of a pointer move.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Origin {
    /// Center of an element.
    Element {
        /// The element.
        element: SharedReference,
    },
}

/// Key value for a typed character. Newlines press Enter.
fn key_value(key: char) -> String {
    match key {
        '\n' | '\r' => "\u{E007}".to_string(),
        '\t' => "\u{E004}".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Storage Commands
// ============================================================================

/// Cookie access.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum StorageCommand {
    /// Read cookies visible to a partition.
    #[serde(rename = "storage.getCookies")]
    GetCookies {
        /// Partition to read.
        partition: PartitionDescriptor,
    },

    /// Write one cookie.
    #[serde(rename = "storage.setCookie")]
    SetCookie {
        /// The cookie.
        cookie: PartialCookie,
        /// Partition to write to.
        partition: PartitionDescriptor,
    },
}

/// Storage partition selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PartitionDescriptor {
    /// The partition a context's top-level document uses.
    Context {
        /// The context.
        context: ContextId,
    },
}

/// Cookie value encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BytesValue {
    /// UTF-8 text.
    String {
        /// The text.
        value: String,
    },
    /// Base64 bytes.
    Base64 {
        /// The encoded bytes.
        value: String,
    },
}

/// Cookie to write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartialCookie {
    /// Name.
    pub name: String,
    /// Value.
    pub value: BytesValue,
    /// Domain.
    pub domain: String,
    /// Path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    /// HttpOnly flag.
    #[serde(rename = "httpOnly", skip_serializing_if = "Option::is_none")]
    pub http_only: Option<bool>,
    /// Secure flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure: Option<bool>,
    /// `strict`, `lax` or `none`.
    #[serde(rename = "sameSite", skip_serializing_if = "Option::is_none")]
    pub same_site: Option<String>,
    /// Expiry, seconds since the epoch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry: Option<u64>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn ctx() -> ContextId {
        ContextId::new("ctx-1")
    }

    #[test]
    fn test_navigate_serialization() {
        let cmd = Command::BrowsingContext(BrowsingContextCommand::Navigate {
            context: ctx(),
            url: "https://twitter.com/home".into(),
            wait: ReadinessState::Complete,
        });

        assert_eq!(
            serde_json::to_value(&cmd).expect("serialize"),
            json!({
                "method": "browsingContext.navigate",
                "params": {
                    "context": "ctx-1",
                    "url": "https://twitter.com/home",
                    "wait": "complete"
                }
            })
        );
        assert_eq!(cmd.method(), "browsingContext.navigate");
    }

    #[test]
    fn test_locate_nodes_carries_locator() {
        let cmd = Command::BrowsingContext(BrowsingContextCommand::LocateNodes {
            context: ctx(),
            locator: By::XPath("//div".into()),
            max_node_count: 1,
        });

        let json = serde_json::to_value(&cmd).expect("serialize");
        assert_eq!(json["params"]["locator"], json!({"type": "xpath", "value": "//div"}));
        assert_eq!(json["params"]["maxNodeCount"], 1);
    }

    #[test]
    fn test_session_end_has_empty_params() {
        let cmd = Command::Session(SessionCommand::End {});
        assert_eq!(
            serde_json::to_value(&cmd).expect("serialize"),
            json!({"method": "session.end", "params": {}})
        );
    }

    #[test]
    fn test_key_press_maps_newline_to_enter() {
        let source = InputSource::key_press('\n');
        let json = serde_json::to_value(&source).expect("serialize");

        assert_eq!(json["type"], "key");
        assert_eq!(json["actions"][0], json!({"type": "keyDown", "value": "\u{E007}"}));
        assert_eq!(json["actions"][1], json!({"type": "keyUp", "value": "\u{E007}"}));
    }

    #[test]
    fn test_click_moves_to_element_origin() {
        let source = InputSource::click(SharedReference {
            shared_id: "node-7".into(),
        });
        let json = serde_json::to_value(&source).expect("serialize");

        assert_eq!(json["parameters"]["pointerType"], "mouse");
        assert_eq!(
            json["actions"][0]["origin"],
            json!({"type": "element", "element": {"sharedId": "node-7"}})
        );
        assert_eq!(json["actions"][1], json!({"type": "pointerDown", "button": 0}));
        assert_eq!(json["actions"][2], json!({"type": "pointerUp", "button": 0}));
    }

    #[test]
    fn test_set_cookie_skips_unset_fields() {
        let cmd = Command::Storage(StorageCommand::SetCookie {
            cookie: PartialCookie {
                name: "ct0".into(),
                value: BytesValue::String {
                    value: "abc".into(),
                },
                domain: ".twitter.com".into(),
                path: None,
                http_only: None,
                secure: Some(true),
                same_site: None,
                expiry: None,
            },
            partition: PartitionDescriptor::Context { context: ctx() },
        });

        let json = serde_json::to_value(&cmd).expect("serialize");
        let cookie = &json["params"]["cookie"];
        assert_eq!(cookie["value"], json!({"type": "string", "value": "abc"}));
        assert_eq!(cookie["secure"], true);
        assert!(cookie.get("path").is_none());
        assert_eq!(
            json["params"]["partition"],
            json!({"type": "context", "context": "ctx-1"})
        );
    }
}
