// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Bearer token verification for the protected routes.
//!
//! ## Auth Flow
//!
//! 1. Client logs in through `/login` and receives provider-issued tokens
//! 2. Client sends `Authorization: Bearer <access token>`
//! 3. Gateway:
//!    - Fetches the provider JWKS via HTTPS
//!    - Verifies JWT signature and expiry (and issuer, when configured)
//!    - Extracts `sub` as the caller's subject
//!
//! ## Notes
//!
//! - Key set is fetched per request unless a cache TTL is configured
//! - `exp` and `nbf` are enforced without clock-skew leeway

pub mod error;
pub mod extractor;
pub mod jwks;
pub mod middleware;
pub mod verifier;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::AuthError;
pub use extractor::VerifiedIdentity;
pub use jwks::JwksManager;
pub use middleware::{require_auth, AuthConfig};
pub use verifier::TokenVerifier;
