// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractor for the verified caller.
//!
//! [`require_auth`](super::middleware::require_auth) inserts a
//! [`VerifiedIdentity`] into the request extensions. Handlers behind it take
//! the identity as an argument:
//!
//! ```rust,ignore
//! async fn my_handler(identity: VerifiedIdentity) -> impl IntoResponse {
//!     // identity.subject is the provider's user id
//! }
//! ```

use std::fmt;

use axum::{extract::FromRequestParts, http::request::Parts};

use super::AuthError;

/// Caller identity derived from a verified bearer token.
#[derive(Clone)]
pub struct VerifiedIdentity {
    /// `sub` claim
    pub subject: String,
    /// Raw bearer token, forwarded to the provider for self-service calls
    pub token: String,
}

impl fmt::Debug for VerifiedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerifiedIdentity")
            .field("subject", &self.subject)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl<S> FromRequestParts<S> for VerifiedIdentity
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<VerifiedIdentity>()
            .cloned()
            .ok_or(AuthError::MissingIdentity)
    }
}
