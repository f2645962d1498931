//! Sliding-window rate limiter over the shared store.
//!
//! Fixed-bucket approximation: wall-clock time is divided into windows of
//! duration `W`; each request atomically increments the counter for
//! `(principal, bucket)` and is denied once the count exceeds the limit.
//! Bucket boundaries cause a hard reset rather than a true sliding average —
//! an accepted approximation, not an error.
//!
//! The limiter keeps no state beyond the store and is safe for unbounded
//! concurrent invocation.
//!
//! # Store-failure policy
//!
//! Fail closed: a store outage yields `Denied` with a short retry hint.
//! Unlimited admission would defeat the limiter's purpose, and failing open
//! would let a single dependency outage become a denial-of-service
//! amplifier.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};

use crate::store::KvStore;
use crate::telemetry;
use crate::types::Principal;

/// Retry hint returned while the store is unreachable.
const STORE_FAILURE_RETRY: Duration = Duration::from_secs(1);

/// Wall-clock source, injectable for deterministic window tests.
pub trait Clock: Send + Sync {
    /// Time elapsed since the unix epoch.
    fn now(&self) -> Duration;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// Admission decision for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Request may proceed.
    Allowed,
    /// Over the limit for the current window; retry after the hint.
    Denied { retry_after: Duration },
}

impl Admission {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Admission::Allowed)
    }
}

/// Per-principal sliding-window admission control.
pub struct RateLimiter {
    store: Arc<dyn KvStore>,
    clock: Arc<dyn Clock>,
    window: Duration,
    limit: u64,
}

impl RateLimiter {
    /// Create a limiter allowing `limit` requests per `window` per
    /// principal. Windows shorter than one second are rounded up.
    pub fn new(store: Arc<dyn KvStore>, window: Duration, limit: u64) -> Self {
        Self::with_clock(store, Arc::new(SystemClock), window, limit)
    }

    /// Create a limiter with an explicit clock.
    pub fn with_clock(
        store: Arc<dyn KvStore>,
        clock: Arc<dyn Clock>,
        window: Duration,
        limit: u64,
    ) -> Self {
        Self {
            store,
            clock,
            window: window.max(Duration::from_secs(1)),
            limit,
        }
    }

    /// Decide admission for one request by `principal`.
    ///
    /// Infallible by design: every path resolves to an [`Admission`], with
    /// store failures mapped to a fail-closed denial.
    pub async fn admit(&self, principal: &Principal) -> Admission {
        let now = self.clock.now();
        let window_secs = self.window.as_secs();
        let bucket = now.as_secs() / window_secs;
        let key = format!("rate:{}:{}", principal.as_str(), bucket);

        match self.store.increment_with_expiry(&key, self.window).await {
            Ok(count) if count <= self.limit => {
                debug!(principal = %principal, count, limit = self.limit, "admitted");
                Admission::Allowed
            }
            Ok(count) => {
                // Time left until the next bucket opens.
                let window_end = Duration::from_secs((bucket + 1) * window_secs);
                let retry_after = window_end.saturating_sub(now);
                metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
                debug!(
                    principal = %principal,
                    count,
                    limit = self.limit,
                    retry_after_ms = retry_after.as_millis() as u64,
                    "denied: over limit"
                );
                Admission::Denied { retry_after }
            }
            Err(e) => {
                warn!(principal = %principal, error = %e, "rate-limit store unavailable, failing closed");
                metrics::counter!(telemetry::RATE_LIMITED_TOTAL).increment(1);
                Admission::Denied {
                    retry_after: STORE_FAILURE_RETRY,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Manually advanced clock for deterministic bucket tests.
    struct ManualClock(AtomicU64);

    impl ManualClock {
        fn at(secs: u64) -> Arc<Self> {
            Arc::new(Self(AtomicU64::new(secs)))
        }

        fn advance(&self, secs: u64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> Duration {
            Duration::from_secs(self.0.load(Ordering::SeqCst))
        }
    }

    fn limiter(clock: Arc<ManualClock>, window_secs: u64, limit: u64) -> RateLimiter {
        RateLimiter::with_clock(
            Arc::new(MemoryStore::new()),
            clock,
            Duration::from_secs(window_secs),
            limit,
        )
    }

    #[tokio::test]
    async fn allows_up_to_limit_then_denies() {
        let clock = ManualClock::at(1_000);
        let limiter = limiter(clock, 60, 3);
        let principal = Principal::new("u1");

        for _ in 0..3 {
            assert!(limiter.admit(&principal).await.is_allowed());
        }
        assert!(!limiter.admit(&principal).await.is_allowed());
    }

    #[tokio::test]
    async fn denial_reports_remaining_window_time() {
        // 1_030 is 10s into the [1_020, 1_080) bucket for a 60s window.
        let clock = ManualClock::at(1_030);
        let limiter = limiter(clock, 60, 1);
        let principal = Principal::new("u1");

        limiter.admit(&principal).await;
        match limiter.admit(&principal).await {
            Admission::Denied { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(50));
            }
            Admission::Allowed => panic!("expected denial"),
        }
    }

    #[tokio::test]
    async fn fresh_window_resets_the_counter() {
        let clock = ManualClock::at(1_000);
        let limiter = limiter(clock.clone(), 60, 1);
        let principal = Principal::new("u1");

        assert!(limiter.admit(&principal).await.is_allowed());
        assert!(!limiter.admit(&principal).await.is_allowed());

        clock.advance(60);
        assert!(limiter.admit(&principal).await.is_allowed());
    }

    #[tokio::test]
    async fn principals_are_limited_independently() {
        let clock = ManualClock::at(1_000);
        let limiter = limiter(clock, 60, 1);

        assert!(limiter.admit(&Principal::new("u1")).await.is_allowed());
        assert!(limiter.admit(&Principal::new("u2")).await.is_allowed());
        assert!(!limiter.admit(&Principal::new("u1")).await.is_allowed());
    }
}
