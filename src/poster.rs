//! Backend-neutral posting interface.
//!
//! [`Engine`] posts through a browser; an official API client can implement
//! the same trait and sit behind [`Governed`](crate::Governed) so it is
//! checked against the rate governor first.

use async_trait::async_trait;

use crate::engine::Engine;
use crate::error::Result;
use crate::surface::Surface;

/// Something that can tweet and reply.
#[async_trait]
pub trait Poster: Send + Sync {
    /// Posts `content`.
    async fn tweet(&self, content: &str) -> Result<()>;

    /// Replies to status `item_id` of `user` with `content`.
    async fn reply(&self, user: &str, item_id: &str, content: &str) -> Result<()>;
}

#[async_trait]
impl<S: Surface + 'static> Poster for Engine<S> {
    async fn tweet(&self, content: &str) -> Result<()> {
        Engine::tweet(self, content).await
    }

    async fn reply(&self, user: &str, item_id: &str, content: &str) -> Result<()> {
        Engine::reply(self, user, item_id, content).await
    }
}

// ============================================================================
// Tests
// ============================================================================
