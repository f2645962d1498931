//! Configuration surface consumed by the gateway core.
//!
//! Values, not mechanism: the embedding application decides where the file
//! lives; [`GatewayConfig::load`] parses TOML with per-field defaults, so a
//! partial file (or none at all via [`Default`]) is always valid:
//!
//! ```toml
//! [rate_limit]
//! window_secs = 60
//! max_requests = 60
//!
//! [cache]
//! ttl_secs = 3600
//!
//! [backend]
//! timeout_secs = 30
//! stream_buffer = 64
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::{GatewayError, Result};

/// Gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl GatewayConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            GatewayError::Configuration(format!("failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            GatewayError::Configuration(format!("failed to parse config file {path:?}: {e}"))
        })
    }
}

/// Admission control configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    /// Window duration in seconds (default: 60).
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// Maximum requests per principal per window (default: 60).
    #[serde(default = "default_max_requests")]
    pub max_requests: u64,
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
        }
    }
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> u64 {
    60
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Entry time-to-live in seconds (default: 3600).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    3600
}

/// Backend call configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Overall deadline per backend call in seconds (default: 30).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Chunks buffered between relay and client (default: 64).
    #[serde(default = "default_stream_buffer")]
    pub stream_buffer: usize,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            stream_buffer: default_stream_buffer(),
        }
    }
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_stream_buffer() -> usize {
    crate::relay::DEFAULT_STREAM_BUFFER
}
