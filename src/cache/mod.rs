//! Content-addressed response cache over the shared store.
//!
//! Each completion request is reduced to a deterministic SHA-256
//! fingerprint of its normalized parameters; identical logical requests
//! collide, any sampling-parameter difference separates them. Entries are
//! JSON-encoded [`CompletionResult`]s with a configurable TTL; expiry is
//! the only invalidation — coherence with live model behaviour is out of
//! scope, staleness is bounded purely by TTL.
//!
//! Keys are principal-independent: identical prompts share one entry
//! across callers.
//!
//! # Store-failure policy
//!
//! Fail open: a failed lookup is a miss, a failed store is skipped. Both
//! are logged and counted; a missed cache is a performance loss, not a
//! correctness loss.

use std::sync::Arc;
use std::time::Duration;

use sha2::{Digest, Sha256};
use tracing::warn;

use crate::store::KvStore;
use crate::telemetry;
use crate::types::{CompletionResult, InferenceRequest};

/// Fixed-length fingerprint identifying one logical request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Hex digest, without the store namespace prefix.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespaced key used against the shared store.
    fn storage_key(&self) -> String {
        format!("cache:{}", self.0)
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a cache lookup.
///
/// A miss carries the computed key so the caller can populate the entry
/// after a successful backend call without hashing twice.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Hit(CompletionResult),
    Miss(CacheKey),
}

/// Compute the fingerprint for a request.
///
/// Normalization: prompt trimmed of surrounding whitespace, model
/// lowercased, temperature rounded to four decimal places. Fields are
/// NUL-separated so adjacent fields cannot be confused. The streaming flag
/// is deliberately excluded — a completed stream and a one-shot call with
/// the same parameters share an entry.
pub fn fingerprint(request: &InferenceRequest) -> CacheKey {
    let mut hasher = Sha256::new();
    hasher.update(request.prompt.trim().as_bytes());
    hasher.update([0]);
    hasher.update(request.model.to_lowercase().as_bytes());
    hasher.update([0]);
    hasher.update(request.max_tokens.to_string().as_bytes());
    hasher.update([0]);
    hasher.update(format!("{:.4}", request.temperature).as_bytes());
    CacheKey(format!("{:x}", hasher.finalize()))
}

/// Response cache facade over the shared store.
#[derive(Clone)]
pub struct ResponseCache {
    store: Arc<dyn KvStore>,
    ttl: Duration,
}

impl ResponseCache {
    /// Create a cache writing entries with the given TTL.
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// Look up a prior result for `request`.
    ///
    /// Store failures and undecodable entries are treated as misses.
    pub async fn lookup(&self, request: &InferenceRequest) -> CacheLookup {
        let key = fingerprint(request);
        let raw = match self.store.get(&key.storage_key()).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "cache lookup failed, treating as miss");
                metrics::counter!(telemetry::CACHE_ERRORS_TOTAL).increment(1);
                return CacheLookup::Miss(key);
            }
        };

        match raw {
            Some(raw) => match serde_json::from_str::<CompletionResult>(&raw) {
                Ok(result) => {
                    metrics::counter!(telemetry::CACHE_HITS_TOTAL).increment(1);
                    CacheLookup::Hit(result)
                }
                Err(e) => {
                    warn!(key = %key, error = %e, "undecodable cache entry, treating as miss");
                    metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                    CacheLookup::Miss(key)
                }
            },
            None => {
                metrics::counter!(telemetry::CACHE_MISSES_TOTAL).increment(1);
                CacheLookup::Miss(key)
            }
        }
    }

    /// Store `result` under `key`.
    ///
    /// Failures are logged and swallowed; the caller has already produced
    /// the result and must not fail because caching did.
    pub async fn store(&self, key: &CacheKey, result: &CompletionResult) {
        let raw = match serde_json::to_string(result) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(key = %key, error = %e, "failed to encode cache entry");
                return;
            }
        };
        if let Err(e) = self
            .store
            .set_with_expiry(&key.storage_key(), raw, self.ttl)
            .await
        {
            warn!(key = %key, error = %e, "cache store failed, proceeding without caching");
            metrics::counter!(telemetry::CACHE_ERRORS_TOTAL).increment(1);
        }
    }
}
