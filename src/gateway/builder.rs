//! Builder for configuring gateway instances

use std::sync::Arc;
use std::time::Duration;

use super::Gateway;
use crate::auth::Authenticator;
use crate::backend::CompletionBackend;
use crate::cache::ResponseCache;
use crate::config::GatewayConfig;
use crate::limiter::{Clock, RateLimiter, SystemClock};
use crate::relay::InferenceRelay;
use crate::store::{KvStore, MemoryStore};
use crate::{GatewayError, Result};

/// Main entry point for creating gateway instances.
pub struct Heimdallr;

impl Heimdallr {
    /// Create a new builder for configuring the gateway.
    pub fn builder() -> GatewayBuilder {
        GatewayBuilder::new()
    }
}

/// Builder for configuring gateway instances.
///
/// A backend and an authenticator are required; the store defaults to the
/// bundled [`MemoryStore`] and timing knobs default to [`GatewayConfig`]
/// defaults (60 requests / 60 s window, 1 h cache TTL, 30 s backend
/// deadline).
pub struct GatewayBuilder {
    backend: Option<Arc<dyn CompletionBackend>>,
    authenticator: Option<Arc<dyn Authenticator>>,
    store: Option<Arc<dyn KvStore>>,
    clock: Option<Arc<dyn Clock>>,
    config: GatewayConfig,
}

impl GatewayBuilder {
    pub fn new() -> Self {
        Self {
            backend: None,
            authenticator: None,
            store: None,
            clock: None,
            config: GatewayConfig::default(),
        }
    }

    /// Set the completion backend (required).
    pub fn backend(mut self, backend: Arc<dyn CompletionBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the authentication collaborator (required).
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Set the shared key-value store. Defaults to [`MemoryStore`].
    pub fn store(mut self, store: Arc<dyn KvStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Override the limiter's clock (tests).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Apply a full configuration, replacing any knobs set so far.
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the rate limit: `max_requests` per `window`.
    pub fn rate_limit(mut self, max_requests: u64, window: Duration) -> Self {
        self.config.rate_limit.max_requests = max_requests;
        self.config.rate_limit.window_secs = window.as_secs();
        self
    }

    /// Set the response cache TTL.
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache.ttl_secs = ttl.as_secs();
        self
    }

    /// Set the overall deadline for each backend call.
    pub fn backend_timeout(mut self, timeout: Duration) -> Self {
        self.config.backend.timeout_secs = timeout.as_secs();
        self
    }

    /// Set the number of chunks buffered between relay and client.
    pub fn stream_buffer(mut self, size: usize) -> Self {
        self.config.backend.stream_buffer = size;
        self
    }

    /// Build the gateway.
    pub fn build(self) -> Result<Gateway> {
        let backend = self
            .backend
            .ok_or_else(|| GatewayError::Configuration("no completion backend configured".into()))?;
        let authenticator = self
            .authenticator
            .ok_or_else(|| GatewayError::Configuration("no authenticator configured".into()))?;

        let store = self.store.unwrap_or_else(|| Arc::new(MemoryStore::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        let limiter = RateLimiter::with_clock(
            store.clone(),
            clock,
            self.config.rate_limit.window(),
            self.config.rate_limit.max_requests,
        );
        let cache = ResponseCache::new(store, self.config.cache.ttl());
        let relay = InferenceRelay::new(
            limiter,
            cache,
            backend,
            self.config.backend.timeout(),
            self.config.backend.stream_buffer,
        );

        Ok(Gateway::new(authenticator, relay))
    }
}

impl Default for GatewayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
