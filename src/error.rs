//! Heimdallr error types

use std::time::Duration;

/// Heimdallr error types
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    // Admission errors
    #[error("authentication failed")]
    Unauthorized,

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    // Shared-store errors
    #[error("key-value store error: {0}")]
    Store(String),

    // Backend errors
    #[error("backend error: {0}")]
    Backend(String),

    #[error("backend call exceeded deadline of {deadline:?}")]
    Timeout { deadline: Duration },

    // Streaming errors
    #[error("stream error: {0}")]
    Stream(String),

    /// Client-initiated termination of a streaming session.
    ///
    /// A terminal state, not a failure: the relay stops forwarding, cancels
    /// the backend stream, and skips cache population.
    #[error("cancelled by client")]
    Cancelled,

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Retry hint carried by `RateLimited`, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            GatewayError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether this error represents client-initiated cancellation rather
    /// than a real failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, GatewayError::Cancelled)
    }

    /// Whether this error should surface as `BackendFailed` at the pipeline
    /// boundary (backend-reported errors, timeouts, and mid-stream failures).
    pub fn is_backend_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::Backend(_) | GatewayError::Timeout { .. } | GatewayError::Stream(_)
        )
    }
}

/// Result type alias for Heimdallr operations
pub type Result<T> = std::result::Result<T, GatewayError>;
