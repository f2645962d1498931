//! Heimdallr - admission-controlled gateway core for AI inference backends
//!
//! This crate implements the request admission and response pipeline of an
//! AI API gateway: a sliding-window rate limiter over a shared key-value
//! store, a content-addressed response cache, and a streaming relay with
//! cooperative cancellation. Identity verification, the HTTP framework,
//! and the concrete backend client stay behind traits
//! ([`Authenticator`], [`CompletionBackend`], [`KvStore`]) so the core is
//! transport- and provider-agnostic.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use heimdallr::{
//!     BearerTokenAuthenticator, Heimdallr, InferenceRequest, Outcome, RawRequest,
//! };
//!
//! #[tokio::main]
//! async fn main() -> heimdallr::Result<()> {
//!     let gateway = Heimdallr::builder()
//!         .backend(Arc::new(MyBackend::from_env()?))
//!         .authenticator(Arc::new(
//!             BearerTokenAuthenticator::new().token("sk-test", "u1"),
//!         ))
//!         .rate_limit(60, Duration::from_secs(60))
//!         .build()?;
//!
//!     let request = RawRequest::with_token(
//!         InferenceRequest::new("What is the capital of France?", "m1"),
//!         "sk-test",
//!     );
//!     match gateway.handle_complete(&request).await {
//!         Outcome::Served { result, from_cache } => {
//!             println!("{} (cached: {from_cache})", result.text)
//!         }
//!         other => eprintln!("{other:?}"),
//!     }
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod gateway;
pub mod limiter;
pub mod relay;
pub mod store;
pub mod telemetry;
pub mod types;

// Re-export main types at crate root
pub use auth::{Authenticator, BearerTokenAuthenticator};
pub use backend::{ChunkStream, CompletionBackend};
pub use cache::{CacheKey, CacheLookup, ResponseCache, fingerprint};
pub use config::GatewayConfig;
pub use error::{GatewayError, Result};
pub use gateway::{Gateway, GatewayBuilder, Heimdallr};
pub use limiter::{Admission, Clock, RateLimiter, SystemClock};
pub use relay::{InferenceRelay, SessionState};
pub use store::{KvStore, MemoryStore};

// Re-export all types
pub use types::{CompletionResult, InferenceRequest, Outcome, Principal, RawRequest, StreamEvent};
