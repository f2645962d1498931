//! Key-value store adapter.
//!
//! The rate limiter and response cache share one network-accessible store
//! (Redis or similar in multi-instance deployments). The gateway depends on
//! three operations only, expressed by [`KvStore`]; everything the adapter
//! needs for correctness is that `increment_with_expiry` is atomic at the
//! store — no application-level read-modify-write is permitted for counters.
//!
//! [`MemoryStore`] is the bundled in-process implementation, used by tests
//! and single-instance deployments. A distributed adapter (e.g. redis
//! `INCR`/`EXPIRE`/`SET EX`) plugs in through the same trait via
//! [`GatewayBuilder::store()`](crate::gateway::GatewayBuilder::store).

mod memory;

pub use memory::MemoryStore;

use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// Atomic operations over the shared store.
///
/// All methods may suspend on network I/O. Errors are surfaced as
/// [`GatewayError::Store`](crate::GatewayError::Store); the *policy* for a
/// failed store call belongs to the caller (the limiter fails closed, the
/// cache fails open).
#[async_trait]
pub trait KvStore: Send + Sync {
    /// Atomically increment the counter at `key`, returning the
    /// post-increment value. The first increment of a key sets its expiry
    /// to `ttl` from now; later increments must not extend it.
    async fn increment_with_expiry(&self, key: &str, ttl: Duration) -> Result<u64>;

    /// Fetch the value at `key`. Expired or absent keys return `None`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set `key` to `value`, expiring after `ttl`. Overwrites any
    /// existing value (last writer wins).
    async fn set_with_expiry(&self, key: &str, value: String, ttl: Duration) -> Result<()>;
}
