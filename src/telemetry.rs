//! Telemetry metric name constants.
//!
//! Centralised metric names for heimdallr operations. Consumers install
//! their own `metrics` recorder (e.g. prometheus, statsd); without a
//! recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `heimdallr_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `operation` — pipeline entry invoked ("complete" | "stream")
//! - `status` — outcome: "ok" or "error"

/// Total requests dispatched through the relay.
///
/// Labels: `operation`, `status` ("ok" | "error").
pub const REQUESTS_TOTAL: &str = "heimdallr_requests_total";

/// Request duration in seconds.
///
/// Labels: `operation`.
///
/// For `operation="complete"` this spans admission to final outcome. For
/// `operation="stream"` it covers setup only (admission through stream
/// handoff), not the lifetime of the relayed stream — the two operations
/// are not comparable like for like.
pub const REQUEST_DURATION_SECONDS: &str = "heimdallr_request_duration_seconds";

/// Total requests denied by the rate limiter.
pub const RATE_LIMITED_TOTAL: &str = "heimdallr_rate_limited_total";

/// Total response-cache hits.
pub const CACHE_HITS_TOTAL: &str = "heimdallr_cache_hits_total";

/// Total response-cache misses. Expired entries count as misses.
pub const CACHE_MISSES_TOTAL: &str = "heimdallr_cache_misses_total";

/// Total store failures observed by the cache (fail-open path).
pub const CACHE_ERRORS_TOTAL: &str = "heimdallr_cache_errors_total";

/// Total chunks forwarded to streaming clients.
pub const STREAM_CHUNKS_TOTAL: &str = "heimdallr_stream_chunks_total";

/// Total streaming sessions terminated by client disconnect.
pub const STREAMS_CANCELLED_TOTAL: &str = "heimdallr_streams_cancelled_total";
