//! Backend capability trait.
//!
//! The concrete completion client (hosted API, self-hosted inference
//! server) lives behind [`CompletionBackend`]. The relay and cache are
//! provider-agnostic; swapping providers means swapping one trait object
//! handed to [`GatewayBuilder::backend()`](crate::gateway::GatewayBuilder::backend).

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::Stream;

use crate::Result;
use crate::types::{CompletionResult, InferenceRequest, StreamEvent};

/// A cancellable, ordered sequence of streaming events.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Provider capability: single-shot and streaming completion.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Backend name for logging/debugging.
    fn name(&self) -> &str;

    /// Single-shot completion.
    async fn complete(&self, request: &InferenceRequest) -> Result<CompletionResult>;

    /// Streaming completion.
    ///
    /// Implementations must yield [`StreamEvent::Token`] chunks in
    /// generation order, terminated by [`StreamEvent::Done`] or an error.
    /// Dropping the returned stream is the cancellation signal: the
    /// implementation must stop producing and release its resources.
    async fn stream(&self, request: &InferenceRequest) -> Result<ChunkStream>;
}
