//! Inbound request types: caller identity and completion parameters.

use serde::{Deserialize, Serialize};

use crate::{GatewayError, Result};

/// Identifier for the caller, derived from authentication.
///
/// Used as the rate-limit key. Immutable for the lifetime of a request.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Raw inbound request envelope, as handed over by the HTTP layer.
///
/// The gateway itself only reads `body`; the credential fields are passed
/// opaquely to the [`Authenticator`](crate::auth::Authenticator).
#[derive(Debug, Clone)]
pub struct RawRequest {
    /// Bearer credential extracted from the transport, if any.
    pub bearer_token: Option<String>,
    /// Remote peer address, for authenticators that identify by origin.
    pub client_addr: Option<String>,
    /// Parsed completion parameters.
    pub body: InferenceRequest,
}

impl RawRequest {
    /// An envelope with no credentials attached.
    pub fn anonymous(body: InferenceRequest) -> Self {
        Self {
            bearer_token: None,
            client_addr: None,
            body,
        }
    }

    /// An envelope carrying a bearer token.
    pub fn with_token(body: InferenceRequest, token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
            client_addr: None,
            body,
        }
    }

    /// Set the remote peer address.
    pub fn client_addr(mut self, addr: impl Into<String>) -> Self {
        self.client_addr = Some(addr.into());
        self
    }
}

fn default_max_tokens() -> usize {
    1024
}

fn default_temperature() -> f32 {
    0.7
}

/// Validated parameters for one completion call.
///
/// Constructed once per inbound request and immutable thereafter. The same
/// type serves both the one-shot and streaming paths; `stream` selects the
/// delivery mode and does not affect the cache fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceRequest {
    /// Prompt text.
    pub prompt: String,

    /// Model identifier, as understood by the backend.
    pub model: String,

    /// Maximum number of tokens to generate.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Sampling temperature (0.0 to 2.0).
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Whether the caller wants incremental delivery.
    #[serde(default)]
    pub stream: bool,
}

impl InferenceRequest {
    /// Create a request with default sampling parameters.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            stream: false,
        }
    }

    /// Set max tokens.
    pub fn max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Request incremental delivery.
    pub fn streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Validate parameter ranges.
    ///
    /// The HTTP layer is expected to call this before handing the request
    /// to the pipeline, so invalid parameters never reach admission.
    pub fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(GatewayError::InvalidInput("prompt is empty".into()));
        }
        if self.model.trim().is_empty() {
            return Err(GatewayError::InvalidInput("model is empty".into()));
        }
        if self.max_tokens == 0 {
            return Err(GatewayError::InvalidInput("max_tokens must be > 0".into()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(GatewayError::InvalidInput(format!(
                "temperature {} outside [0.0, 2.0]",
                self.temperature
            )));
        }
        Ok(())
    }
}
