//! Authentication collaborator.
//!
//! Identity verification is deliberately a thin seam: the pipeline calls
//! [`Authenticator::authenticate`] exactly once per request, before
//! admission, and only ever sees the resulting [`Principal`]. Token formats
//! and verification mechanics (JWT, introspection endpoints, mTLS identity)
//! live behind this trait in the embedding application.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::types::{Principal, RawRequest};
use crate::{GatewayError, Result};

/// Resolves an inbound request to a caller identity.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate the request.
    ///
    /// Returns [`GatewayError::Unauthorized`] when the credential is
    /// missing, unknown, or expired. Never retried by the pipeline.
    async fn authenticate(&self, request: &RawRequest) -> Result<Principal>;
}

/// Static bearer-token authenticator.
///
/// Maps exact token strings to principals. Suitable for tests and small
/// single-tenant deployments; production setups implement
/// [`Authenticator`] against their identity provider instead.
#[derive(Debug, Default)]
pub struct BearerTokenAuthenticator {
    tokens: HashMap<String, Principal>,
}

impl BearerTokenAuthenticator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a token → principal mapping.
    pub fn token(mut self, token: impl Into<String>, principal: impl Into<String>) -> Self {
        self.tokens
            .insert(token.into(), Principal::new(principal.into()));
        self
    }
}

#[async_trait]
impl Authenticator for BearerTokenAuthenticator {
    async fn authenticate(&self, request: &RawRequest) -> Result<Principal> {
        let token = request
            .bearer_token
            .as_deref()
            .ok_or(GatewayError::Unauthorized)?;
        self.tokens
            .get(token)
            .cloned()
            .ok_or(GatewayError::Unauthorized)
    }
}
