// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Identity Provider Adapter
//!
//! One async operation per user-facing action. Each call is forwarded to the
//! provider exactly once; failures come back as [`ProviderError`] carrying the
//! HTTP status and message to show the client.

pub mod cognito;
pub mod error;

#[cfg(test)]
pub(crate) mod test_support;

use async_trait::async_trait;

pub use cognito::CognitoClient;
pub use error::{ProviderError, ProviderErrorKind};

use crate::models::{
    CodeDeliveryDetails, ConfirmationRequest, LoginRequest, LoginResult, PasswordChangeRequest,
    PasswordResetRequest, RegistrationRequest,
};

/// Operations forwarded to the hosted user pool.
#[async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Create an unconfirmed user; returns where the confirmation code went.
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<CodeDeliveryDetails, ProviderError>;

    async fn confirm_registration(&self, request: &ConfirmationRequest)
        -> Result<(), ProviderError>;

    async fn resend_confirmation_code(
        &self,
        email: &str,
    ) -> Result<CodeDeliveryDetails, ProviderError>;

    /// Username + password authentication (no refresh or custom flows).
    async fn login(&self, request: &LoginRequest) -> Result<LoginResult, ProviderError>;

    async fn forgot_password(&self, email: &str) -> Result<CodeDeliveryDetails, ProviderError>;

    async fn confirm_forgot_password(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), ProviderError>;

    /// Change the password of the user owning `access_token`.
    async fn change_password(
        &self,
        access_token: &str,
        request: &PasswordChangeRequest,
    ) -> Result<(), ProviderError>;
}
