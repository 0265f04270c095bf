//! Firefox page driven over WebDriver BiDi.
//!
//! | Surface method | BiDi command |
//! |----------------|--------------|
//! | `current_url` | `browsingContext.getTree` |
//! | `navigate` | `browsingContext.navigate` (wait `complete`) |
//! | `locate` | `browsingContext.locateNodes` |
//! | `is_visible`, `text_content`, `focus` | `script.callFunction` |
//! | `click`, `press_key` | `input.performActions` |
//! | `cookies`, `set_cookie` | `storage.getCookies`, `storage.setCookie` |
//! | `close` | `session.end` |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Value, from_value, json};
use tokio::sync::Mutex;
use tracing::{debug, info};
use url::Url;

use crate::error::{Error, Result};
use crate::identifiers::ContextId;
use crate::locator::By;
use crate::protocol::{
    BrowsingContextCommand, BytesValue, Command, EvaluateResult, GetCookiesResult, GetTreeResult,
    InputCommand, InputSource, LocateNodesResult, PartialCookie, PartitionDescriptor,
    ReadinessState, RemoteValue, ScriptCommand, SessionCommand, SharedReference, StorageCommand,
    StoredCookie, Target,
};
use crate::surface::{Cookie, NodeRef, Surface};
use crate::transport::Connection;

use super::options::LaunchOptions;
use super::process::FirefoxProcess;
use super::profile::Profile;

// ============================================================================
// Scripts
// ============================================================================

const VISIBLE_SCRIPT: &str = "el => !!(el.offsetWidth || el.offsetHeight || \
                              el.getClientRects().length) && \
                              getComputedStyle(el).visibility !== 'hidden'";

const TEXT_SCRIPT: &str = "el => el.textContent";

const FOCUS_SCRIPT: &str = "el => { el.focus(); }";

const SCROLL_SCRIPT: &str = "el => el.scrollIntoView({block: 'center', inline: 'center'})";

// ============================================================================
// FirefoxPage
// ============================================================================

/// The top-level browsing context of a Firefox session.
///
/// Owns the Firefox process and profile when created with
/// [`launch`](Self::launch); both are released by [`Surface::close`] or on
/// drop.
pub struct FirefoxPage {
    connection: Connection,
    context: ContextId,
    process: Mutex<Option<FirefoxProcess>>,
    _profile: Option<Profile>,
}

impl FirefoxPage {
    /// Starts Firefox with a temporary profile and opens a BiDi session.
    ///
    /// # Errors
    ///
    /// - [`Error::FirefoxNotFound`] or [`Error::Config`] for invalid options
    /// - [`Error::Profile`] if the profile cannot be written
    /// - [`Error::ProcessLaunchFailed`] or [`Error::ConnectionTimeout`] if
    ///   Firefox does not come up
    /// - any transport error from opening the session
    pub async fn launch(options: &LaunchOptions) -> Result<Self> {
        options.validate()?;

        let profile = Profile::new_temp()?;
        profile.write_prefs(&Profile::prefs_for(options))?;

        let mut process = FirefoxProcess::launch(options, &profile).await?;

        match Self::open_session(&process.session_url()).await {
            Ok((connection, context)) => {
                info!(pid = process.pid(), %context, "Firefox page ready");
                Ok(Self {
                    connection,
                    context,
                    process: Mutex::new(Some(process)),
                    _profile: Some(profile),
                })
            }
            Err(e) => {
                process.kill().await;
                Err(e)
            }
        }
    }

    /// Opens a session on an already running Firefox.
    ///
    /// `url` is the session endpoint, e.g. `ws://127.0.0.1:9222/session`.
    /// [`Surface::close`] ends the session but leaves the browser running.
    ///
    /// # Errors
    ///
    /// Any transport error from opening the session.
    pub async fn connect(url: &str) -> Result<Self> {
        let (connection, context) = Self::open_session(url).await?;
        info!(%context, "Attached to Firefox page");

        Ok(Self {
            connection,
            context,
            process: Mutex::new(None),
            _profile: None,
        })
    }

    /// Returns the browsing context driven by this page.
    #[inline]
    #[must_use]
    pub fn context(&self) -> &ContextId {
        &self.context
    }

    async fn open_session(url: &str) -> Result<(Connection, ContextId)> {
        let connection = Connection::connect(url).await?;

        let session = connection
            .send(Command::Session(SessionCommand::New {
                capabilities: json!({}),
            }))
            .await?;
        debug!(session_id = ?session.get("sessionId"), "BiDi session created");

        let tree: GetTreeResult = parse(
            connection
                .send(Command::BrowsingContext(BrowsingContextCommand::GetTree {
                    max_depth: 0,
                }))
                .await?,
        )?;

        let context = tree
            .contexts
            .into_iter()
            .next()
            .map(|info| info.context)
            .ok_or_else(|| Error::protocol("Browser has no top-level browsing context"))?;

        Ok((connection, context))
    }

    async fn call_function(&self, declaration: &str, node: &NodeRef) -> Result<RemoteValue> {
        let value = self
            .connection
            .send(Command::Script(ScriptCommand::CallFunction {
                function_declaration: declaration.to_string(),
                await_promise: false,
                target: Target {
                    context: self.context.clone(),
                },
                arguments: vec![reference(node)],
            }))
            .await?;

        match parse::<EvaluateResult>(value)? {
            EvaluateResult::Success { result } => Ok(result),
            EvaluateResult::Exception { exception_details } => {
                Err(Error::script_error(exception_details.text))
            }
        }
    }

    async fn perform(&self, source: InputSource) -> Result<()> {
        self.connection
            .send(Command::Input(InputCommand::PerformActions {
                context: self.context.clone(),
                actions: vec![source],
            }))
            .await?;
        Ok(())
    }

    fn partition(&self) -> PartitionDescriptor {
        PartitionDescriptor::Context {
            context: self.context.clone(),
        }
    }
}

impl fmt::Debug for FirefoxPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirefoxPage")
            .field("context", &self.context)
            .field("pending", &self.connection.pending_count())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Surface
// ============================================================================

#[async_trait]
impl Surface for FirefoxPage {
    async fn current_url(&self) -> Result<String> {
        let tree: GetTreeResult = parse(
            self.connection
                .send(Command::BrowsingContext(BrowsingContextCommand::GetTree {
                    max_depth: 0,
                }))
                .await?,
        )?;

        tree.contexts
            .into_iter()
            .find(|info| info.context == self.context)
            .map(|info| info.url)
            .ok_or_else(|| Error::protocol(format!("Browsing context {} is gone", self.context)))
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!(url, "Navigating");
        self.connection
            .send(Command::BrowsingContext(BrowsingContextCommand::Navigate {
                context: self.context.clone(),
                url: url.to_string(),
                wait: ReadinessState::Complete,
            }))
            .await?;
        Ok(())
    }

    async fn locate(&self, query: &By) -> Result<Option<NodeRef>> {
        let result: LocateNodesResult = parse(
            self.connection
                .send(Command::BrowsingContext(
                    BrowsingContextCommand::LocateNodes {
                        context: self.context.clone(),
                        locator: query.clone(),
                        max_node_count: 1,
                    },
                ))
                .await?,
        )?;

        Ok(result
            .nodes
            .first()
            .and_then(|node| node.shared_id.as_deref())
            .map(NodeRef::new))
    }

    async fn is_visible(&self, node: &NodeRef) -> Result<bool> {
        let value = self.call_function(VISIBLE_SCRIPT, node).await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn text_content(&self, node: &NodeRef) -> Result<Option<String>> {
        let value = self.call_function(TEXT_SCRIPT, node).await?;
        Ok(value.as_string())
    }

    async fn click(&self, node: &NodeRef) -> Result<()> {
        // Pointer moves fail for targets outside the viewport.
        self.call_function(SCROLL_SCRIPT, node).await?;
        self.perform(InputSource::click(reference(node))).await
    }

    async fn focus(&self, node: &NodeRef) -> Result<()> {
        self.call_function(FOCUS_SCRIPT, node).await?;
        Ok(())
    }

    async fn press_key(&self, key: char) -> Result<()> {
        self.perform(InputSource::key_press(key)).await
    }

    async fn cookies(&self) -> Result<Vec<Cookie>> {
        let result: GetCookiesResult = parse(
            self.connection
                .send(Command::Storage(StorageCommand::GetCookies {
                    partition: self.partition(),
                }))
                .await?,
        )?;

        Ok(result.cookies.into_iter().filter_map(from_stored).collect())
    }

    async fn set_cookie(&self, cookie: &Cookie) -> Result<()> {
        let domain = match &cookie.domain {
            Some(domain) => domain.clone(),
            None => current_host(&self.current_url().await?)?,
        };

        self.connection
            .send(Command::Storage(StorageCommand::SetCookie {
                cookie: to_partial(cookie, domain),
                partition: self.partition(),
            }))
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if let Err(e) = self
            .connection
            .send(Command::Session(SessionCommand::End {}))
            .await
        {
            debug!(error = %e, "session.end failed");
        }
        self.connection.shutdown();

        if let Some(mut process) = self.process.lock().await.take() {
            process.kill().await;
        }

        info!(context = %self.context, "Firefox page closed");
        Ok(())
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn parse<T: DeserializeOwned>(value: Value) -> Result<T> {
    from_value(value).map_err(|e| Error::protocol(format!("Unexpected result shape: {e}")))
}

fn reference(node: &NodeRef) -> SharedReference {
    SharedReference {
        shared_id: node.as_str().to_string(),
    }
}

fn current_host(url: &str) -> Result<String> {
    Url::parse(url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .ok_or_else(|| {
            Error::invalid_argument(format!(
                "cookie has no domain and the current page ({url}) has no host"
            ))
        })
}

fn to_partial(cookie: &Cookie, domain: String) -> PartialCookie {
    PartialCookie {
        name: cookie.name.clone(),
        value: BytesValue::String {
            value: cookie.value.clone(),
        },
        domain,
        path: cookie.path.clone(),
        http_only: cookie.http_only,
        secure: cookie.secure,
        same_site: cookie.same_site.as_deref().map(str::to_ascii_lowercase),
        expiry: cookie
            .expires
            .filter(|expires| *expires > 0.0)
            .map(|expires| expires as u64),
    }
}

fn from_stored(stored: StoredCookie) -> Option<Cookie> {
    let value = match stored.value {
        BytesValue::String { value } => value,
        BytesValue::Base64 { .. } => {
            debug!(name = %stored.name, "Skipping binary cookie");
            return None;
        }
    };

    Some(Cookie {
        name: stored.name,
        value,
        domain: Some(stored.domain),
        path: Some(stored.path),
        expires: stored.expiry.map(|expiry| expiry as f64),
        http_only: Some(stored.http_only),
        secure: Some(stored.secure),
        same_site: Some(stored.same_site),
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use futures_util::{SinkExt, StreamExt};
    use parking_lot::Mutex as SyncMutex;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;
    use tokio_tungstenite::tungstenite::Message;

    use super::*;

    type Log = Arc<SyncMutex<Vec<Value>>>;

    /// Canned BiDi replies keyed by method.
    fn reply(request: &Value) -> Value {
        let params = &request["params"];
        match request["method"].as_str().unwrap_or_default() {
            "session.new" => json!({"sessionId": "s-1", "capabilities": {}}),
            "browsingContext.getTree" => json!({"contexts": [
                {"context": "ctx-1", "url": "https://twitter.com/home", "children": null}
            ]}),
            "browsingContext.navigate" => json!({"navigation": "nav-1", "url": params["url"]}),
            "browsingContext.locateNodes" => {
                if params["locator"]["value"].as_str().unwrap_or_default().contains("present") {
                    json!({"nodes": [{"type": "node", "sharedId": "n-1"}]})
                } else {
                    json!({"nodes": []})
                }
            }
            "script.callFunction" => {
                let declaration = params["functionDeclaration"].as_str().unwrap_or_default();
                if declaration == VISIBLE_SCRIPT {
                    json!({"type": "success", "realm": "r", "result": {"type": "boolean", "value": true}})
                } else if declaration == TEXT_SCRIPT {
                    json!({"type": "success", "realm": "r", "result": {"type": "string", "value": "Sign in to X"}})
                } else if declaration == FOCUS_SCRIPT || declaration == SCROLL_SCRIPT {
                    json!({"type": "success", "realm": "r", "result": {"type": "undefined"}})
                } else {
                    json!({"type": "exception", "realm": "r", "exceptionDetails": {"text": "ReferenceError"}})
                }
            }
            "storage.getCookies" => json!({"partitionKey": {}, "cookies": [
                {"name": "auth_token", "value": {"type": "string", "value": "tok"},
                 "domain": ".twitter.com", "path": "/", "size": 12, "httpOnly": true,
                 "secure": true, "sameSite": "none", "expiry": 1800000000},
                {"name": "bin", "value": {"type": "base64", "value": "AAE="},
                 "domain": ".twitter.com", "path": "/", "size": 5, "httpOnly": false,
                 "secure": false, "sameSite": "lax"}
            ]}),
            "storage.setCookie" => json!({"partitionKey": {}}),
            _ => json!({}),
        }
    }

    async fn fake_firefox() -> (String, Log) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        let log: Log = Arc::default();
        let server_log = Arc::clone(&log);

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.expect("accept");
            let mut ws = accept_async(stream).await.expect("handshake");

            while let Some(Ok(Message::Text(text))) = ws.next().await {
                let request: Value = serde_json::from_str(&text).expect("json");
                let response = json!({
                    "type": "success",
                    "id": request["id"],
                    "result": reply(&request),
                });
                server_log.lock().push(request);
                ws.send(Message::Text(response.to_string().into()))
                    .await
                    .expect("send");
            }
        });

        (format!("ws://{addr}/session"), log)
    }

    fn methods(log: &Log) -> Vec<String> {
        log.lock()
            .iter()
            .map(|request| request["method"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    fn last(log: &Log) -> Value {
        log.lock().last().cloned().expect("a request")
    }

    #[tokio::test]
    async fn test_connect_opens_session_and_picks_context() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        assert_eq!(page.context().as_str(), "ctx-1");
        assert_eq!(methods(&log), ["session.new", "browsingContext.getTree"]);
    }

    #[tokio::test]
    async fn test_navigate_and_current_url() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        page.navigate("https://twitter.com/home").await.expect("navigate");
        let request = last(&log);
        assert_eq!(request["params"]["wait"], "complete");
        assert_eq!(request["params"]["context"], "ctx-1");

        assert_eq!(
            page.current_url().await.expect("url"),
            "https://twitter.com/home"
        );
    }

    #[tokio::test]
    async fn test_locate() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        let found = page
            .locate(&By::XPath("//div[@id='present']".into()))
            .await
            .expect("locate");
        assert_eq!(found, Some(NodeRef::new("n-1")));
        assert_eq!(last(&log)["params"]["maxNodeCount"], 1);

        let missing = page
            .locate(&By::Css("#absent".into()))
            .await
            .expect("locate");
        assert_eq!(missing, None);
    }

    #[tokio::test]
    async fn test_scripts_pass_node_argument() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");
        let node = NodeRef::new("n-1");

        assert!(page.is_visible(&node).await.expect("visible"));
        assert_eq!(
            last(&log)["params"]["arguments"],
            json!([{"sharedId": "n-1"}])
        );

        assert_eq!(
            page.text_content(&node).await.expect("text").as_deref(),
            Some("Sign in to X")
        );

        page.focus(&node).await.expect("focus");
        assert_eq!(last(&log)["params"]["functionDeclaration"], FOCUS_SCRIPT);
    }

    #[tokio::test]
    async fn test_script_exception_is_script_error() {
        let (url, _log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        let err = page
            .call_function("el => missing()", &NodeRef::new("n-1"))
            .await
            .expect_err("exception");
        assert!(matches!(err, Error::ScriptError { .. }));
    }

    #[tokio::test]
    async fn test_click_and_key_press_actions() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        page.click(&NodeRef::new("n-1")).await.expect("click");
        let click = last(&log);
        assert_eq!(click["method"], "input.performActions");
        assert_eq!(click["params"]["actions"][0]["type"], "pointer");
        assert_eq!(
            click["params"]["actions"][0]["actions"][0]["origin"]["element"]["sharedId"],
            "n-1"
        );

        page.press_key('a').await.expect("key");
        let key = last(&log);
        assert_eq!(key["params"]["actions"][0]["type"], "key");
        assert_eq!(key["params"]["actions"][0]["actions"][0]["value"], "a");
    }

    #[tokio::test]
    async fn test_click_scrolls_target_into_view_first() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        page.click(&NodeRef::new("n-1")).await.expect("click");

        let requests = log.lock().clone();
        let [.., scroll, click] = requests.as_slice() else {
            panic!("expected a scroll and a click");
        };
        assert_eq!(scroll["method"], "script.callFunction");
        assert_eq!(scroll["params"]["functionDeclaration"], SCROLL_SCRIPT);
        assert_eq!(scroll["params"]["arguments"], json!([{"sharedId": "n-1"}]));
        assert_eq!(click["method"], "input.performActions");
    }

    #[tokio::test]
    async fn test_cookies_skip_binary_values() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        let cookies = page.cookies().await.expect("cookies");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "auth_token");
        assert_eq!(cookies[0].value, "tok");
        assert_eq!(cookies[0].expires, Some(1_800_000_000.0));
        assert_eq!(
            last(&log)["params"]["partition"],
            json!({"type": "context", "context": "ctx-1"})
        );
    }

    #[tokio::test]
    async fn test_set_cookie_defaults_domain_to_current_host() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        let mut cookie = Cookie::new("ct0", "abc").with_path("/");
        cookie.same_site = Some("Lax".into());
        page.set_cookie(&cookie).await.expect("set cookie");

        let request = last(&log);
        assert_eq!(request["method"], "storage.setCookie");
        let sent = &request["params"]["cookie"];
        assert_eq!(sent["domain"], "twitter.com");
        assert_eq!(sent["sameSite"], "lax");
        assert_eq!(sent["value"], json!({"type": "string", "value": "abc"}));
        assert!(sent.get("expiry").is_none());
    }

    #[tokio::test]
    async fn test_close_ends_session() {
        let (url, log) = fake_firefox().await;
        let page = FirefoxPage::connect(&url).await.expect("connect");

        page.close().await.expect("close");
        assert_eq!(methods(&log).last().map(String::as_str), Some("session.end"));
    }

    #[test]
    fn test_to_partial_drops_non_positive_expiry() {
        let session = Cookie::new("a", "b").with_expires(-1.0);
        assert_eq!(to_partial(&session, "x.com".into()).expiry, None);

        let persistent = Cookie::new("a", "b").with_expires(1_700_000_000.9);
        assert_eq!(
            to_partial(&persistent, "x.com".into()).expiry,
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_current_host() {
        assert_eq!(
            current_host("https://twitter.com/home").expect("host"),
            "twitter.com"
        );
        assert!(current_host("about:blank").is_err());
    }
}
