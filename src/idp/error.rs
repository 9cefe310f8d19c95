// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Provider exception → HTTP status mapping.

use axum::http::StatusCode;

/// Known provider exception kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    InvalidPassword,
    InvalidParameter,
    UsernameExists,
    NotAuthorized,
    UserNotFound,
    UserNotConfirmed,
    AliasExists,
    /// Anything else, including transport failures
    Unrecognized,
}

/// Exception type names as reported by the provider.
const EXCEPTION_TABLE: &[(&str, ProviderErrorKind)] = &[
    ("InvalidPasswordException", ProviderErrorKind::InvalidPassword),
    ("InvalidParameterException", ProviderErrorKind::InvalidParameter),
    ("UsernameExistsException", ProviderErrorKind::UsernameExists),
    ("NotAuthorizedException", ProviderErrorKind::NotAuthorized),
    ("UserNotFoundException", ProviderErrorKind::UserNotFound),
    ("UserNotConfirmedException", ProviderErrorKind::UserNotConfirmed),
    ("AliasExistsException", ProviderErrorKind::AliasExists),
];

impl ProviderErrorKind {
    /// Look up a provider exception type.
    ///
    /// Accepts bare names (`UsernameExistsException`), namespaced ones
    /// (`com.amazonaws.cognito#UsernameExistsException`) and the header form
    /// (`UsernameExistsException:http://internal.amazon.com/...`).
    pub fn from_exception(raw: &str) -> Self {
        let name = raw.rsplit('#').next().unwrap_or(raw);
        let name = name.split(':').next().unwrap_or(name).trim();

        EXCEPTION_TABLE
            .iter()
            .find(|(exception, _)| *exception == name)
            .map(|(_, kind)| *kind)
            .unwrap_or(ProviderErrorKind::Unrecognized)
    }

    pub fn status(self) -> StatusCode {
        match self {
            ProviderErrorKind::InvalidPassword | ProviderErrorKind::InvalidParameter => {
                StatusCode::BAD_REQUEST
            }
            ProviderErrorKind::UsernameExists | ProviderErrorKind::AliasExists => {
                StatusCode::CONFLICT
            }
            ProviderErrorKind::NotAuthorized => StatusCode::UNAUTHORIZED,
            ProviderErrorKind::UserNotFound => StatusCode::NOT_FOUND,
            ProviderErrorKind::UserNotConfirmed => StatusCode::FORBIDDEN,
            ProviderErrorKind::Unrecognized => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing message.
    pub fn message(self) -> &'static str {
        match self {
            ProviderErrorKind::InvalidPassword => "Invalid password",
            ProviderErrorKind::InvalidParameter => "Invalid parameter",
            ProviderErrorKind::UsernameExists => "Username already exists",
            ProviderErrorKind::NotAuthorized => "Not authorized",
            ProviderErrorKind::UserNotFound => "User not found",
            ProviderErrorKind::UserNotConfirmed => "User not confirmed",
            ProviderErrorKind::AliasExists => "Alias exists",
            ProviderErrorKind::Unrecognized => "Internal error",
        }
    }
}

/// A failed provider call.
///
/// `detail` carries the provider's own message (or the transport error) for
/// logs; it is never sent to clients.
#[derive(Debug, thiserror::Error)]
#[error("{}: {}", .kind.message(), .detail)]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub detail: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, detail: impl Into<String>) -> Self {
        Self {
            kind,
            detail: detail.into(),
        }
    }

    /// Error reported by the provider as an exception type + message.
    pub fn from_exception(exception: &str, message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::from_exception(exception), message)
    }

    pub fn unrecognized(detail: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Unrecognized, detail)
    }

    pub fn status(&self) -> StatusCode {
        self.kind.status()
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        Self::unrecognized(format!("provider request failed: {e}"))
    }
}
