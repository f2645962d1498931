//! Response, streaming event, and pipeline outcome types

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Result of a completion call, as delivered to the caller and as stored
/// in the response cache.
///
/// Cached entries are never mutated, only replaced or expired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionResult {
    /// Completion text.
    pub text: String,

    /// Model that produced the text.
    pub model: String,

    /// Creation time, seconds since the unix epoch.
    pub created_at: u64,
}

impl CompletionResult {
    /// Create a result stamped with the current wall-clock time.
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        Self {
            text: text.into(),
            model: model.into(),
            created_at,
        }
    }
}

/// Events emitted during a streaming completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum StreamEvent {
    /// Incremental content chunk.
    #[serde(rename = "token")]
    Token(String),

    /// End-of-stream marker. Always the final event of a session that
    /// completes normally.
    #[serde(rename = "done")]
    Done,
}

/// Final outcome of one pipeline invocation.
///
/// This is the tagged result the HTTP layer translates into a response:
/// `Served` → 200, `RateLimited` → 429 with a `Retry-After` header,
/// `Unauthorized` → 401, `BackendFailed` → 502/504.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Request served, either live or from the response cache.
    Served {
        result: CompletionResult,
        from_cache: bool,
    },

    /// Admission denied; the client should retry after the given interval.
    RateLimited { retry_after: Duration },

    /// Authentication failed.
    Unauthorized,

    /// Backend call errored or exceeded its deadline.
    BackendFailed { detail: String },
}

impl Outcome {
    /// Whether this outcome carries a served result.
    pub fn is_served(&self) -> bool {
        matches!(self, Outcome::Served { .. })
    }
}
