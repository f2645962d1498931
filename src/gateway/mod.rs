//! Gateway pipeline: the single entry point for inbound requests.

mod builder;

pub use builder::{Heimdallr, GatewayBuilder};

use std::sync::Arc;

use tracing::debug;

use crate::auth::Authenticator;
use crate::backend::ChunkStream;
use crate::relay::InferenceRelay;
use crate::types::{Outcome, RawRequest};
use crate::{GatewayError, Result};

/// Composes authentication → rate limiter → inference relay.
///
/// Owns no state beyond the wired components; every inbound request passes
/// through [`handle_complete`](Gateway::handle_complete) or
/// [`handle_stream`](Gateway::handle_stream).
pub struct Gateway {
    auth: Arc<dyn Authenticator>,
    relay: InferenceRelay,
}

impl Gateway {
    pub(crate) fn new(auth: Arc<dyn Authenticator>, relay: InferenceRelay) -> Self {
        Self { auth, relay }
    }

    /// Handle a non-streaming request end to end.
    ///
    /// Always resolves to an [`Outcome`]; the error taxonomy is folded into
    /// the tagged result so the HTTP layer maps variants to status codes
    /// without inspecting error internals.
    pub async fn handle_complete(&self, request: &RawRequest) -> Outcome {
        let principal = match self.auth.authenticate(request).await {
            Ok(principal) => principal,
            Err(e) => {
                debug!(error = %e, "authentication failed");
                return Outcome::Unauthorized;
            }
        };

        match self.relay.complete(&principal, &request.body).await {
            Ok((result, from_cache)) => Outcome::Served { result, from_cache },
            Err(GatewayError::RateLimited { retry_after }) => Outcome::RateLimited { retry_after },
            Err(GatewayError::Unauthorized) => Outcome::Unauthorized,
            Err(e) => Outcome::BackendFailed {
                detail: e.to_string(),
            },
        }
    }

    /// Handle a streaming request.
    ///
    /// Admission failures (`Unauthorized`, `RateLimited`) are returned as
    /// typed errors before any chunk flows; once a stream is returned,
    /// mid-flight failures arrive as `Err` items on the stream itself.
    /// Dropping the stream cancels the backend call.
    pub async fn handle_stream(&self, request: &RawRequest) -> Result<ChunkStream> {
        let principal = self.auth.authenticate(request).await?;
        self.relay.stream(&principal, &request.body).await
    }
}
