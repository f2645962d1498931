//! In-process [`KvStore`] implementation backed by moka.
//!
//! Counters are `Arc<AtomicU64>` values mutated in place, so increments are
//! atomic without a cache-level write. Per-entry expiry comes from moka's
//! [`Expiry`] policy, reading the TTL recorded in each slot at creation
//! time — the first write of a key fixes its expiry, matching the
//! `increment_with_expiry` contract.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;

use super::KvStore;
use crate::{GatewayError, Result};

/// Default maximum number of live slots.
const DEFAULT_MAX_ENTRIES: u64 = 100_000;

/// One stored value together with its time-to-live.
#[derive(Clone)]
enum Slot {
    Counter { value: Arc<AtomicU64>, ttl: Duration },
    Blob { value: Arc<str>, ttl: Duration },
}

impl Slot {
    fn ttl(&self) -> Duration {
        match self {
            Slot::Counter { ttl, .. } | Slot::Blob { ttl, .. } => *ttl,
        }
    }
}

/// Expiry policy that reads each slot's own TTL.
struct SlotExpiry;

impl Expiry<String, Slot> for SlotExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &Slot,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl())
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Slot,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        // Overwrites restart the clock with the new value's TTL.
        Some(value.ttl())
    }
}

/// Bundled single-process store.
///
/// Shared-nothing deployments of a single gateway instance can use this
/// directly; multi-instance deployments need a network-backed adapter so
/// rate-limit counters do not drift per process.
pub struct MemoryStore {
    slots: Cache<String, Slot>,
}

impl MemoryStore {
    /// Create a store with the default capacity.
    pub fn new() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }

    /// Create a store bounded to `max` live entries.
    pub fn with_max_entries(max: u64) -> Self {
        let slots = Cache::builder()
            .max_capacity(max)
            .expire_after(SlotExpiry)
            .build();
        Self { slots }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn increment_with_expiry(&self, key: &str, ttl: Duration) -> Result<u64> {
        let slot = self
            .slots
            .entry(key.to_string())
            .or_insert_with(async {
                Slot::Counter {
                    value: Arc::new(AtomicU64::new(0)),
                    ttl,
                }
            })
            .await
            .into_value();

        match slot {
            Slot::Counter { value, .. } => Ok(value.fetch_add(1, Ordering::SeqCst) + 1),
            Slot::Blob { .. } => Err(GatewayError::Store(format!(
                "key {key:?} holds a non-counter value"
            ))),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).await.map(|slot| match slot {
            Slot::Blob { value, .. } => value.to_string(),
            Slot::Counter { value, .. } => value.load(Ordering::SeqCst).to_string(),
        }))
    }

    async fn set_with_expiry(&self, key: &str, value: String, ttl: Duration) -> Result<()> {
        self.slots
            .insert(
                key.to_string(),
                Slot::Blob {
                    value: value.into(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }
}
