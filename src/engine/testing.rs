//! In-memory [`Surface`] for engine tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{Error, Result};
use crate::locator::{By, LocatorKey};
use crate::surface::{Cookie, NodeRef, Surface};

// ============================================================================
// Op
// ============================================================================

/// Observable side effect recorded by [`MockSurface`].
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Op {
    Navigate(String),
    Found(LocatorKey),
    Click(LocatorKey),
    Focus(LocatorKey),
    Key(char),
    SetCookie(String),
    ReadCookies,
    Close,
}

type ClickHook = Box<dyn Fn(&mut MockState) + Send>;
type NavigateHook = Box<dyn Fn(&str, &mut MockState) + Send>;

// ============================================================================
// MockState
// ============================================================================

#[derive(Default)]
pub(crate) struct MockState {
    pub url: String,
    pub present: FxHashSet<LocatorKey>,
    pub hidden: FxHashSet<LocatorKey>,
    pub texts: FxHashMap<LocatorKey, String>,
    pub cookies: Vec<Cookie>,
    pub reject_clicks: FxHashSet<LocatorKey>,
    pub log: Vec<Op>,
    on_click: FxHashMap<LocatorKey, ClickHook>,
    on_navigate: Option<NavigateHook>,
}

impl MockState {
    pub fn show(&mut self, key: LocatorKey) {
        self.present.insert(key);
    }

    pub fn remove(&mut self, key: LocatorKey) {
        self.present.remove(&key);
    }

    /// Renders `key` with `text` as its content.
    pub fn set_text(&mut self, key: LocatorKey, text: &str) {
        self.present.insert(key);
        self.texts.insert(key, text.to_string());
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.iter().any(|c| c.name == name)
    }

    /// Renders the composer, a status article and its controls.
    pub fn show_timeline(&mut self) {
        for key in [
            LocatorKey::ComposerArea,
            LocatorKey::Composer,
            LocatorKey::ComposerSubmit,
            LocatorKey::StatusArticle,
            LocatorKey::ReplyComposer,
            LocatorKey::ReplyConfirm,
            LocatorKey::Like,
            LocatorKey::Retweet,
            LocatorKey::RetweetConfirm,
        ] {
            self.present.insert(key);
        }
    }

    pub fn set_modal(&mut self, text: Option<&str>) {
        match text {
            Some(text) => {
                self.present.insert(LocatorKey::ModalHeader);
                self.texts.insert(LocatorKey::ModalHeader, text.to_string());
            }
            None => {
                self.present.remove(&LocatorKey::ModalHeader);
                self.texts.remove(&LocatorKey::ModalHeader);
            }
        }
    }
}

// ============================================================================
// MockSurface
// ============================================================================

/// Scriptable page. Clones share state so tests keep a handle after the
/// surface moves into an engine.
#[derive(Clone, Default)]
pub(crate) struct MockSurface {
    state: Arc<Mutex<MockState>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A home timeline with the composer rendered and no modal.
    pub fn home_timeline() -> Self {
        let surface = Self::new();
        surface.with(|s| {
            s.url = "https://twitter.com/home".into();
            s.show_timeline();
        });
        surface
    }

    /// A signed-out home page whose login flow completes, optionally
    /// through the username challenge. Submitting sets `auth_token` and
    /// reveals the home timeline.
    pub fn signed_out(challenge: bool) -> Self {
        let surface = Self::new();
        surface.with(|s| {
            s.url = "about:blank".into();
            s.set_modal(Some("Sign in to X"));
        });

        surface.on_navigate(|url, s| {
            if url.ends_with("/i/flow/login") {
                s.show(LocatorKey::LoginEmail);
                s.show(LocatorKey::LoginNext);
            } else if url.ends_with("/home") && s.has_cookie("auth_token") {
                s.set_modal(None);
                s.show_timeline();
            }
        });

        surface.on_click(LocatorKey::LoginNext, move |s| {
            s.remove(LocatorKey::LoginEmail);
            s.remove(LocatorKey::LoginNext);
            if challenge {
                s.set_modal(Some("Enter your phone number or username"));
                s.show(LocatorKey::ChallengeUsername);
                s.show(LocatorKey::ChallengeNext);
            } else {
                s.set_modal(None);
                s.show(LocatorKey::LoginPassword);
                s.show(LocatorKey::LoginSubmit);
            }
        });

        surface.on_click(LocatorKey::ChallengeNext, |s| {
            s.set_modal(None);
            s.remove(LocatorKey::ChallengeUsername);
            s.remove(LocatorKey::ChallengeNext);
            s.show(LocatorKey::LoginPassword);
            s.show(LocatorKey::LoginSubmit);
        });

        surface.on_click(LocatorKey::LoginSubmit, |s| {
            s.remove(LocatorKey::LoginPassword);
            s.remove(LocatorKey::LoginSubmit);
            s.cookies.push(Cookie::new("auth_token", "fresh").with_domain(".twitter.com"));
            s.show_timeline();
        });

        surface
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock())
    }

    pub fn on_click(&self, key: LocatorKey, hook: impl Fn(&mut MockState) + Send + 'static) {
        self.state.lock().on_click.insert(key, Box::new(hook));
    }

    pub fn on_navigate(&self, hook: impl Fn(&str, &mut MockState) + Send + 'static) {
        self.state.lock().on_navigate = Some(Box::new(hook));
    }

    pub fn log(&self) -> Vec<Op> {
        self.state.lock().log.clone()
    }

    /// Typed characters, in order.
    pub fn typed(&self) -> String {
        self.log()
            .into_iter()
            .filter_map(|op| match op {
                Op::Key(c) => Some(c),
                _ => None,
            })
            .collect()
    }

    /// Log without `Found` lookups.
    pub fn actions(&self) -> Vec<Op> {
        self.log()
            .into_iter()
            .filter(|op| !matches!(op, Op::Found(_)))
            .collect()
    }

    fn key_for_query(query: &By) -> Option<LocatorKey> {
        LocatorKey::ALL.into_iter().find(|k| k.query() == *query)
    }

    fn key_for_node(node: &NodeRef) -> Result<LocatorKey> {
        LocatorKey::ALL
            .into_iter()
            .find(|k| k.name() == node.as_str())
            .ok_or_else(|| Error::remote("no such node", node.to_string()))
    }
}

#[async_trait]
impl Surface for MockSurface {
    async fn current_url(&self) -> Result<String> {
        Ok(self.state.lock().url.clone())
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.url = url.to_string();
        state.log.push(Op::Navigate(url.to_string()));
        if let Some(hook) = state.on_navigate.take() {
            hook(url, &mut state);
            state.on_navigate = Some(hook);
        }
        Ok(())
    }

    async fn locate(&self, query: &By) -> Result<Option<NodeRef>> {
        let mut state = self.state.lock();
        let found = Self::key_for_query(query).filter(|k| state.present.contains(k));
        if let Some(key) = found {
            state.log.push(Op::Found(key));
        }
        Ok(found.map(|k| NodeRef::new(k.name())))
    }

    async fn is_visible(&self, node: &NodeRef) -> Result<bool> {
        let key = Self::key_for_node(node)?;
        Ok(!self.state.lock().hidden.contains(&key))
    }

    async fn text_content(&self, node: &NodeRef) -> Result<Option<String>> {
        let key = Self::key_for_node(node)?;
        Ok(self.state.lock().texts.get(&key).cloned())
    }

    async fn click(&self, node: &NodeRef) -> Result<()> {
        let key = Self::key_for_node(node)?;
        let mut state = self.state.lock();
        if state.reject_clicks.contains(&key) {
            return Err(Error::remote("element click intercepted", key.name()));
        }
        state.log.push(Op::Click(key));
        if let Some(hook) = state.on_click.remove(&key) {
            hook(&mut state);
            state.on_click.insert(key, hook);
        }
        Ok(())
    }

    async fn focus(&self, node: &NodeRef) -> Result<()> {
        let key = Self::key_for_node(node)?;
        self.state.lock().log.push(Op::Focus(key));
        Ok(())
    }

    async fn press_key(&self, key: char) -> Result<()> {
        self.state.lock().log.push(Op::Key(key));
        Ok(())
    }

    async fn cookies(&self) -> Result<Vec<Cookie>> {
        let mut state = self.state.lock();
        state.log.push(Op::ReadCookies);
        Ok(state.cookies.clone())
    }

    async fn set_cookie(&self, cookie: &Cookie) -> Result<()> {
        let mut state = self.state.lock();
        state.log.push(Op::SetCookie(cookie.name.clone()));
        state.cookies.push(cookie.clone());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.state.lock().log.push(Op::Close);
        Ok(())
    }
}
