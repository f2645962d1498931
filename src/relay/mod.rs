//! Inference relay: limiter → cache → backend orchestration.
//!
//! [`InferenceRelay`] drives one request through admission, cache lookup,
//! the backend call, and cache population. The streaming variant forwards
//! backend chunks through a bounded channel, which doubles as the
//! disconnect detector: when the client drops the stream the channel
//! closes, the relay task drops the backend stream (cooperative
//! cancellation), and no cache entry is written.
//!
//! # Ordering and buffering
//!
//! Chunks are delivered in the order received from the backend. The only
//! buffering is the bounded forwarding channel, which also provides
//! backpressure: a fast backend blocks when the client falls behind.

mod session;

pub use session::SessionState;

use std::sync::Arc;
use std::time::{Duration, Instant};

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::backend::{ChunkStream, CompletionBackend};
use crate::cache::{CacheLookup, ResponseCache};
use crate::limiter::{Admission, RateLimiter};
use crate::telemetry;
use crate::types::{CompletionResult, InferenceRequest, Principal, StreamEvent};
use crate::{GatewayError, Result};
use session::StreamSession;

/// Default number of chunks buffered between the relay and the client.
pub const DEFAULT_STREAM_BUFFER: usize = 64;

/// Orchestrates a single request through the admission and response
/// pipeline.
pub struct InferenceRelay {
    limiter: RateLimiter,
    cache: ResponseCache,
    backend: Arc<dyn CompletionBackend>,
    backend_timeout: Duration,
    stream_buffer: usize,
}

impl InferenceRelay {
    pub fn new(
        limiter: RateLimiter,
        cache: ResponseCache,
        backend: Arc<dyn CompletionBackend>,
        backend_timeout: Duration,
        stream_buffer: usize,
    ) -> Self {
        Self {
            limiter,
            cache,
            backend,
            backend_timeout,
            stream_buffer: stream_buffer.max(1),
        }
    }

    /// Non-streaming completion.
    ///
    /// Returns the result and whether it was served from cache. Denied
    /// admission surfaces as [`GatewayError::RateLimited`] without the
    /// backend being contacted; backend errors propagate uncached.
    pub async fn complete(
        &self,
        principal: &Principal,
        request: &InferenceRequest,
    ) -> Result<(CompletionResult, bool)> {
        let start = Instant::now();
        let outcome = self.complete_inner(principal, request).await;
        record_request("complete", outcome.is_ok(), start);
        outcome
    }

    async fn complete_inner(
        &self,
        principal: &Principal,
        request: &InferenceRequest,
    ) -> Result<(CompletionResult, bool)> {
        if let Admission::Denied { retry_after } = self.limiter.admit(principal).await {
            return Err(GatewayError::RateLimited { retry_after });
        }

        let key = match self.cache.lookup(request).await {
            CacheLookup::Hit(result) => {
                debug!(backend = self.backend.name(), "served from cache");
                return Ok((result, true));
            }
            CacheLookup::Miss(key) => key,
        };

        let result = tokio::time::timeout(self.backend_timeout, self.backend.complete(request))
            .await
            .map_err(|_| GatewayError::Timeout {
                deadline: self.backend_timeout,
            })??;

        self.cache.store(&key, &result).await;
        Ok((result, false))
    }

    /// Streaming completion.
    ///
    /// On a cache hit the full stored result is replayed as a single chunk
    /// followed by [`StreamEvent::Done`], so callers see one interface
    /// whether served live or from cache. On a miss the backend stream is
    /// opened under the call deadline and forwarded chunk by chunk;
    /// dropping the returned stream cancels the backend.
    pub async fn stream(
        &self,
        principal: &Principal,
        request: &InferenceRequest,
    ) -> Result<ChunkStream> {
        let start = Instant::now();
        let outcome = self.stream_inner(principal, request).await;
        record_request("stream", outcome.is_ok(), start);
        outcome
    }

    async fn stream_inner(
        &self,
        principal: &Principal,
        request: &InferenceRequest,
    ) -> Result<ChunkStream> {
        if let Admission::Denied { retry_after } = self.limiter.admit(principal).await {
            return Err(GatewayError::RateLimited { retry_after });
        }

        let key = match self.cache.lookup(request).await {
            CacheLookup::Hit(result) => {
                debug!(backend = self.backend.name(), "replaying cached result");
                return Ok(replay_stream(result));
            }
            CacheLookup::Miss(key) => key,
        };

        // One deadline covers both opening the stream and draining it.
        let deadline = tokio::time::Instant::now() + self.backend_timeout;
        let backend_stream = tokio::time::timeout_at(deadline, self.backend.stream(request))
            .await
            .map_err(|_| GatewayError::Timeout {
                deadline: self.backend_timeout,
            })??;

        let mut session = StreamSession::new(key);
        session.backend_requested();

        let (tx, rx) = mpsc::channel(self.stream_buffer);
        let cache = self.cache.clone();
        let model = request.model.clone();
        let timeout = self.backend_timeout;
        tokio::spawn(async move {
            relay_chunks(backend_stream, tx, session, cache, model, deadline, timeout).await;
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }
}

/// Synthesize a replay sequence from a stored result.
fn replay_stream(result: CompletionResult) -> ChunkStream {
    Box::pin(futures_util::stream::iter(vec![
        Ok(StreamEvent::Token(result.text)),
        Ok(StreamEvent::Done),
    ]))
}

/// Forward backend chunks to the client until a terminal state.
///
/// Terminal states and their effects:
/// - backend end-of-stream → `Completed`, cache stored exactly once,
///   `Done` forwarded;
/// - client disconnect (channel closed) → `Cancelled`, backend stream
///   dropped, no cache store;
/// - backend error or deadline exceeded → `BackendError`, error
///   forwarded, no cache store.
async fn relay_chunks(
    mut backend: ChunkStream,
    tx: mpsc::Sender<Result<StreamEvent>>,
    mut session: StreamSession,
    cache: ResponseCache,
    model: String,
    deadline: tokio::time::Instant,
    timeout: Duration,
) {
    loop {
        let event = tokio::select! {
            _ = tx.closed() => {
                session.cancelled();
                metrics::counter!(telemetry::STREAMS_CANCELLED_TOTAL).increment(1);
                return;
            }
            _ = tokio::time::sleep_until(deadline) => {
                session.backend_error();
                let _ = tx.send(Err(GatewayError::Timeout { deadline: timeout })).await;
                return;
            }
            event = backend.next() => event,
        };

        match event {
            Some(Ok(StreamEvent::Token(token))) => {
                session.chunk(&token);
                metrics::counter!(telemetry::STREAM_CHUNKS_TOTAL).increment(1);
                if tx.send(Ok(StreamEvent::Token(token))).await.is_err() {
                    // Receiver dropped mid-send; dropping `backend` here is
                    // the cancellation signal to the provider.
                    session.cancelled();
                    metrics::counter!(telemetry::STREAMS_CANCELLED_TOTAL).increment(1);
                    return;
                }
            }
            Some(Ok(StreamEvent::Done)) | None => {
                session.completed();
                debug!(chunks = session.chunk_count(), "stream completed");
                let (key, content) = session.finish();
                cache.store(&key, &CompletionResult::new(content, model)).await;
                let _ = tx.send(Ok(StreamEvent::Done)).await;
                return;
            }
            Some(Err(e)) => {
                session.backend_error();
                let _ = tx.send(Err(e)).await;
                return;
            }
        }
    }
}

fn record_request(operation: &'static str, ok: bool, start: Instant) {
    let status = if ok { "ok" } else { "error" };
    metrics::counter!(
        telemetry::REQUESTS_TOTAL,
        "operation" => operation,
        "status" => status
    )
    .increment(1);
    metrics::histogram!(telemetry::REQUEST_DURATION_SECONDS, "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}
