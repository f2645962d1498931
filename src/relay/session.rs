//! Per-stream session bookkeeping.

use tracing::debug;

use crate::cache::CacheKey;

/// Lifecycle of one streaming session.
///
/// `Admitted → AwaitingBackend → Streaming → {Completed | Cancelled |
/// BackendError}`. Cancellation and backend failure are reachable from both
/// `AwaitingBackend` and `Streaming`; `Completed` from `AwaitingBackend`
/// covers backends that end an empty stream without emitting a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Admitted,
    AwaitingBackend,
    Streaming,
    Completed,
    Cancelled,
    BackendError,
}

impl SessionState {
    /// Whether the session has reached a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::BackendError
        )
    }
}

/// Ephemeral state for one streaming request.
///
/// Owned exclusively by the relay task serving that connection; destroyed
/// when the stream ends or the client disconnects. Accumulates the full
/// content for post-hoc cache population, which happens only on
/// [`SessionState::Completed`].
pub(crate) struct StreamSession {
    key: CacheKey,
    state: SessionState,
    chunks: usize,
    content: String,
}

impl StreamSession {
    pub(crate) fn new(key: CacheKey) -> Self {
        Self {
            key,
            state: SessionState::Admitted,
            chunks: 0,
            content: String::new(),
        }
    }

    fn transition(&mut self, next: SessionState) {
        debug!(key = %self.key, from = ?self.state, to = ?next, chunks = self.chunks, "stream session transition");
        self.state = next;
    }

    /// Cache miss confirmed; the backend stream is being opened.
    pub(crate) fn backend_requested(&mut self) {
        self.transition(SessionState::AwaitingBackend);
    }

    /// A chunk arrived from the backend.
    pub(crate) fn chunk(&mut self, token: &str) {
        if self.state == SessionState::AwaitingBackend {
            self.transition(SessionState::Streaming);
        }
        self.chunks += 1;
        self.content.push_str(token);
    }

    /// Backend signalled end-of-stream.
    pub(crate) fn completed(&mut self) {
        self.transition(SessionState::Completed);
    }

    /// Client disconnected.
    pub(crate) fn cancelled(&mut self) {
        self.transition(SessionState::Cancelled);
    }

    /// Backend failed or exceeded its deadline.
    pub(crate) fn backend_error(&mut self) {
        self.transition(SessionState::BackendError);
    }

    pub(crate) fn state(&self) -> SessionState {
        self.state
    }

    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks
    }

    /// Consume the session, yielding the cache key and assembled content.
    pub(crate) fn finish(self) -> (CacheKey, String) {
        (self.key, self.content)
    }
}
