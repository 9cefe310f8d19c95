// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies for the REST API. Nothing here is persisted;
//! each value lives for a single request.
//!
//! ## Model Categories
//!
//! - **Requests**: sign-up, confirmation, login and password flows
//! - **Provider results**: code delivery details and the login token bundle
//! - **Envelopes**: the `{ "data": ... }` wrapper used for successful responses

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// =============================================================================
// Validation
// =============================================================================

/// Field-level checks run after the body has been deserialized.
pub trait Validate {
    /// Returns a client-facing message on the first failing field.
    fn validate(&self) -> Result<(), String>;
}

fn require(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{field} must not be empty"));
    }
    Ok(())
}

// =============================================================================
// Request Models
// =============================================================================

/// Request body for `POST /signup`.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct RegistrationRequest {
    /// Display name stored as the `name` attribute.
    pub name: String,
    /// Email; also used as the username.
    pub email: String,
    pub password: String,
}

impl Validate for RegistrationRequest {
    fn validate(&self) -> Result<(), String> {
        require("name", &self.name)?;
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

/// Request body for `POST /login`.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), String> {
        require("email", &self.email)?;
        require("password", &self.password)
    }
}

/// Request body for `POST /confirm`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ConfirmationRequest {
    pub email: String,
    /// Code delivered by the provider after sign-up.
    pub confirmation_code: String,
}

impl Validate for ConfirmationRequest {
    fn validate(&self) -> Result<(), String> {
        require("email", &self.email)?;
        require("confirmation_code", &self.confirmation_code)
    }
}

/// Request body for `POST /resend-confirm` and `POST /forgot-password`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmailRequest {
    pub email: String,
}

impl Validate for EmailRequest {
    fn validate(&self) -> Result<(), String> {
        require("email", &self.email)
    }
}

/// Request body for `POST /confirm-forgot`.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordResetRequest {
    pub email: String,
    /// Code delivered by `POST /forgot-password`.
    pub confirmation_code: String,
    pub new_password: String,
}

impl Validate for PasswordResetRequest {
    fn validate(&self) -> Result<(), String> {
        require("email", &self.email)?;
        require("confirmation_code", &self.confirmation_code)?;
        require("new_password", &self.new_password)
    }
}

/// Request body for `POST /password`.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
pub struct PasswordChangeRequest {
    pub previous_password: String,
    pub proposed_password: String,
}

impl Validate for PasswordChangeRequest {
    fn validate(&self) -> Result<(), String> {
        require("previous_password", &self.previous_password)?;
        require("proposed_password", &self.proposed_password)
    }
}

// =============================================================================
// Provider Results
// =============================================================================

/// Where a confirmation or reset code was sent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct CodeDeliveryDetails {
    /// Masked destination, e.g. `u***@e***.com`.
    pub destination: Option<String>,
    /// `EMAIL` or `SMS`.
    pub delivery_medium: Option<String>,
    /// Attribute the code was sent to, e.g. `email`.
    pub attribute_name: Option<String>,
}

/// Tokens issued by the provider on login, passed through verbatim.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LoginResult {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Usually `Bearer`.
    pub token_type: Option<String>,
    /// Access token lifetime in seconds.
    pub expires_in: Option<i64>,
}

// =============================================================================
// Envelopes
// =============================================================================

/// `{ "data": CodeDeliveryDetails }`
#[derive(Debug, Serialize, ToSchema)]
pub struct DeliveryEnvelope {
    pub data: CodeDeliveryDetails,
}

/// `{ "data": LoginResult }`
#[derive(Debug, Serialize, ToSchema)]
pub struct LoginEnvelope {
    pub data: LoginResult,
}

/// `{ "data": "<subject>" }`
#[derive(Debug, Serialize, ToSchema)]
pub struct SubjectEnvelope {
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_fields_fail_validation() {
        let request = RegistrationRequest {
            name: "Ada".into(),
            email: "   ".into(),
            password: "pw".into(),
        };
        assert_eq!(request.validate().unwrap_err(), "email must not be empty");

        let request = PasswordChangeRequest {
            previous_password: "old".into(),
            proposed_password: String::new(),
        };
        assert_eq!(
            request.validate().unwrap_err(),
            "proposed_password must not be empty"
        );
    }

    #[test]
    fn confirmation_request_uses_snake_case_fields() {
        let request: PasswordResetRequest = serde_json::from_str(
            r#"{"email":"a@b.c","confirmation_code":"123456","new_password":"n3w"}"#,
        )
        .unwrap();
        assert_eq!(request.confirmation_code, "123456");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn login_result_serializes_all_token_fields() {
        let json = serde_json::to_value(LoginEnvelope {
            data: LoginResult {
                access_token: Some("a".into()),
                expires_in: Some(3600),
                ..Default::default()
            },
        })
        .unwrap();

        let data = json["data"].as_object().unwrap();
        for field in ["access_token", "id_token", "refresh_token", "token_type", "expires_in"] {
            assert!(data.contains_key(field), "missing {field}");
        }
        assert_eq!(data["expires_in"], 3600);
        assert!(data["id_token"].is_null());
    }
}
