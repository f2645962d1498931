//! Tests for the sliding-window rate limiter, including the fail-closed
//! store-outage policy.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use heimdallr::limiter::{Admission, Clock, RateLimiter};
use heimdallr::store::{KvStore, MemoryStore};
use heimdallr::types::Principal;
use heimdallr::{GatewayError, Result};

// ============================================================================
// Test doubles
// ============================================================================

/// Manually advanced clock for deterministic window tests.
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

/// Store whose every operation fails, simulating an outage.
struct FailingStore;

#[async_trait]
impl KvStore for FailingStore {
    async fn increment_with_expiry(&self, _key: &str, _ttl: Duration) -> Result<u64> {
        Err(GatewayError::Store("connection refused".into()))
    }

    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(GatewayError::Store("connection refused".into()))
    }

    async fn set_with_expiry(&self, _key: &str, _value: String, _ttl: Duration) -> Result<()> {
        Err(GatewayError::Store("connection refused".into()))
    }
}

fn limiter_with_clock(clock: Arc<ManualClock>, window_secs: u64, limit: u64) -> RateLimiter {
    RateLimiter::with_clock(
        Arc::new(MemoryStore::new()),
        clock,
        Duration::from_secs(window_secs),
        limit,
    )
}

// ============================================================================
// Window semantics
// ============================================================================

#[tokio::test]
async fn exactly_limit_allowed_then_denied() {
    let clock = ManualClock::at(10_000);
    let limiter = limiter_with_clock(clock, 60, 5);
    let principal = Principal::new("u1");

    for i in 0..5 {
        assert!(
            limiter.admit(&principal).await.is_allowed(),
            "request {i} should be admitted"
        );
    }
    assert!(!limiter.admit(&principal).await.is_allowed());
}

#[tokio::test]
async fn three_requests_at_limit_two() {
    // Limit 2 per window, three requests in quick succession.
    let clock = ManualClock::at(10_000);
    let limiter = limiter_with_clock(clock, 60, 2);
    let principal = Principal::new("u1");

    assert_eq!(limiter.admit(&principal).await, Admission::Allowed);
    assert_eq!(limiter.admit(&principal).await, Admission::Allowed);
    match limiter.admit(&principal).await {
        Admission::Denied { retry_after } => assert!(retry_after > Duration::ZERO),
        Admission::Allowed => panic!("third request should be denied"),
    }
}

#[tokio::test]
async fn request_after_window_expiry_is_allowed() {
    let clock = ManualClock::at(10_000);
    let limiter = limiter_with_clock(clock.clone(), 60, 1);
    let principal = Principal::new("u1");

    assert!(limiter.admit(&principal).await.is_allowed());
    assert!(!limiter.admit(&principal).await.is_allowed());

    clock.advance(61);
    assert!(limiter.admit(&principal).await.is_allowed());
}

#[tokio::test]
async fn retry_after_matches_remaining_bucket_time() {
    // 10_020 opens a fresh 60s bucket; 15s in, 45s remain.
    let clock = ManualClock::at(10_020);
    let limiter = limiter_with_clock(clock.clone(), 60, 1);
    let principal = Principal::new("u1");

    limiter.admit(&principal).await;
    clock.advance(15);
    match limiter.admit(&principal).await {
        Admission::Denied { retry_after } => {
            assert_eq!(retry_after, Duration::from_secs(45));
        }
        Admission::Allowed => panic!("expected denial"),
    }
}

#[tokio::test]
async fn principals_do_not_share_budgets() {
    let clock = ManualClock::at(10_000);
    let limiter = limiter_with_clock(clock, 60, 1);

    assert!(limiter.admit(&Principal::new("u1")).await.is_allowed());
    assert!(limiter.admit(&Principal::new("u2")).await.is_allowed());
    assert!(!limiter.admit(&Principal::new("u1")).await.is_allowed());
    assert!(!limiter.admit(&Principal::new("u2")).await.is_allowed());
}

// ============================================================================
// Store-failure policy
// ============================================================================

#[tokio::test]
async fn store_outage_fails_closed() {
    let limiter = RateLimiter::new(Arc::new(FailingStore), Duration::from_secs(60), 100);
    let principal = Principal::new("u1");

    match limiter.admit(&principal).await {
        Admission::Denied { retry_after } => {
            // Short hint, not a full window.
            assert!(retry_after <= Duration::from_secs(5));
        }
        Admission::Allowed => panic!("store outage must not admit traffic"),
    }
}

#[tokio::test]
async fn concurrent_admissions_never_exceed_limit() {
    let clock = ManualClock::at(10_000);
    let limiter = Arc::new(limiter_with_clock(clock, 60, 10));
    let principal = Principal::new("u1");

    let mut handles = Vec::new();
    for _ in 0..25 {
        let limiter = limiter.clone();
        let principal = principal.clone();
        handles.push(tokio::spawn(
            async move { limiter.admit(&principal).await },
        ));
    }

    let mut allowed = 0;
    for handle in handles {
        if handle.await.unwrap().is_allowed() {
            allowed += 1;
        }
    }
    assert_eq!(allowed, 10);
}
