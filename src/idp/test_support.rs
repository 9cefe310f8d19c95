// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-process identity provider for handler tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{IdentityProvider, ProviderError, ProviderErrorKind};
use crate::models::{
    CodeDeliveryDetails, ConfirmationRequest, LoginRequest, LoginResult, PasswordChangeRequest,
    PasswordResetRequest, RegistrationRequest,
};

/// Answers every call with canned data, or with `failure` when set.
/// Each call is recorded as `(operation, key)` where `key` is the email or
/// access token it was made with.
#[derive(Default)]
pub struct StubProvider {
    failure: Option<ProviderErrorKind>,
    pub calls: Mutex<Vec<(&'static str, String)>>,
}

impl StubProvider {
    pub fn failing(kind: ProviderErrorKind) -> Self {
        Self {
            failure: Some(kind),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(&'static str, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, operation: &'static str, key: &str) -> Result<(), ProviderError> {
        self.calls.lock().unwrap().push((operation, key.to_string()));
        match self.failure {
            Some(kind) => Err(ProviderError::new(kind, format!("stubbed {operation} failure"))),
            None => Ok(()),
        }
    }
}

pub fn delivery() -> CodeDeliveryDetails {
    CodeDeliveryDetails {
        destination: Some("u***@e***.com".to_string()),
        delivery_medium: Some("EMAIL".to_string()),
        attribute_name: Some("email".to_string()),
    }
}

pub fn tokens() -> LoginResult {
    LoginResult {
        access_token: Some("access".to_string()),
        id_token: Some("id".to_string()),
        refresh_token: Some("refresh".to_string()),
        token_type: Some("Bearer".to_string()),
        expires_in: Some(3600),
    }
}

#[async_trait]
impl IdentityProvider for StubProvider {
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<CodeDeliveryDetails, ProviderError> {
        self.record("register", &request.email)?;
        Ok(delivery())
    }

    async fn confirm_registration(
        &self,
        request: &ConfirmationRequest,
    ) -> Result<(), ProviderError> {
        self.record("confirm_registration", &request.email)
    }

    async fn resend_confirmation_code(
        &self,
        email: &str,
    ) -> Result<CodeDeliveryDetails, ProviderError> {
        self.record("resend_confirmation_code", email)?;
        Ok(delivery())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResult, ProviderError> {
        self.record("login", &request.email)?;
        Ok(tokens())
    }

    async fn forgot_password(&self, email: &str) -> Result<CodeDeliveryDetails, ProviderError> {
        self.record("forgot_password", email)?;
        Ok(delivery())
    }

    async fn confirm_forgot_password(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), ProviderError> {
        self.record("confirm_forgot_password", &request.email)
    }

    async fn change_password(
        &self,
        access_token: &str,
        _request: &PasswordChangeRequest,
    ) -> Result<(), ProviderError> {
        self.record("change_password", access_token)
    }
}
