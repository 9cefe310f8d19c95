// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Authentication error type.
///
/// Every verification failure maps to 401. Only a failure to obtain the
/// signing keys themselves is a server error.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No authorization header present
    #[error("Authorization header is required")]
    MissingAuthHeader,
    /// Authorization header is not `Bearer <token>`
    #[error("Invalid authorization header format (expected 'Bearer <token>')")]
    InvalidAuthHeader,
    /// Token does not have the three-segment JWT shape, or a segment is undecodable
    #[error("Token is malformed")]
    MalformedToken,
    /// Header `kid` is missing or not present in the key set
    #[error("No matching key found in key set")]
    UnknownKey,
    /// Signature did not verify against the located key
    #[error("Token signature is invalid")]
    InvalidSignature,
    /// `exp` is in the past
    #[error("Token has expired")]
    TokenExpired,
    /// `iss` does not match the configured issuer
    #[error("Token issuer is invalid")]
    InvalidIssuer,
    /// `nbf` is in the future
    #[error("Token is not yet valid")]
    TokenNotYetValid,
    /// `sub` claim absent or not a string
    #[error("Token subject not found")]
    MissingSubject,
    /// Handler requires a verified identity but none was attached
    #[error("Unauthorized")]
    MissingIdentity,
    /// Key set could not be retrieved
    #[error("Failed to fetch signing keys: {0}")]
    KeyFetch(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnknownKey => "unknown_key",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidIssuer => "invalid_issuer",
            AuthError::TokenNotYetValid => "token_not_yet_valid",
            AuthError::MissingSubject => "missing_subject",
            AuthError::MissingIdentity => "unauthorized",
            AuthError::KeyFetch(_) => "key_fetch_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::KeyFetch(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to return to clients.
    fn public_message(&self) -> String {
        match self {
            AuthError::KeyFetch(_) => "Failed to fetch signing keys".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        if let AuthError::KeyFetch(detail) = &self {
            error!(error = %detail, "signing key fetch failed");
        }
        let status = self.status_code();
        let body = Json(AuthErrorBody {
            error: self.public_message(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
