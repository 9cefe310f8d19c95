// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cognito user pool client over the `AWSCognitoIdentityProviderService`
//! JSON 1.1 protocol.
//!
//! The operations used here are the public app-client calls; they are
//! authorized by the app client id (plus `SecretHash` when the client has a
//! secret), so requests are not SigV4-signed.

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64ct::{Base64, Encoding};
use hmac::{Hmac, Mac};
use reqwest::{header::CONTENT_TYPE, Client};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use sha2::Sha256;
use tracing::debug;

use super::{IdentityProvider, ProviderError};
use crate::config::AppConfig;
use crate::models::{
    CodeDeliveryDetails, ConfirmationRequest, LoginRequest, LoginResult, PasswordChangeRequest,
    PasswordResetRequest, RegistrationRequest,
};

const TARGET_PREFIX: &str = "AWSCognitoIdentityProviderService";
const AMZ_JSON: &str = "application/x-amz-json-1.1";
const AMZ_TARGET: &str = "x-amz-target";
const AMZN_ERROR_TYPE: &str = "x-amzn-errortype";
/// The only login flow this gateway supports.
const USER_PASSWORD_AUTH: &str = "USER_PASSWORD_AUTH";

type HmacSha256 = Hmac<Sha256>;

#[derive(Debug, Clone)]
pub struct CognitoClient {
    endpoint: String,
    client_id: String,
    client_secret: Option<String>,
    http: Client,
}

impl CognitoClient {
    pub fn new(
        http: Client,
        endpoint: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            client_id: client_id.into(),
            client_secret,
            http,
        }
    }

    pub fn from_config(http: Client, config: &AppConfig) -> Self {
        Self::new(
            http,
            config.cognito_endpoint(),
            config.cognito.client_id.clone(),
            config.cognito.client_secret.clone(),
        )
    }

    /// `SecretHash` for `username`, when the app client has a secret.
    fn secret_hash(&self, username: &str) -> Result<Option<String>, ProviderError> {
        self.client_secret
            .as_deref()
            .map(|secret| secret_hash(secret, username, &self.client_id))
            .transpose()
    }

    /// Invoke `operation` with `input`, decoding the success body as `O`.
    async fn call<I, O>(&self, operation: &'static str, input: &I) -> Result<O, ProviderError>
    where
        I: Serialize + Sync,
        O: DeserializeOwned,
    {
        debug!(operation, "calling identity provider");

        let body = serde_json::to_vec(input)
            .map_err(|e| ProviderError::unrecognized(format!("failed to encode {operation}: {e}")))?;

        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, AMZ_JSON)
            .header(AMZ_TARGET, format!("{TARGET_PREFIX}.{operation}"))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let header_type = response
            .headers()
            .get(AMZN_ERROR_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await?;

        if !status.is_success() {
            let error: ErrorBody = serde_json::from_slice(&bytes).unwrap_or_default();
            let exception = error.error_type.or(header_type).unwrap_or_default();
            let message = error
                .message
                .unwrap_or_else(|| format!("HTTP {status} from {operation}"));
            return Err(ProviderError::from_exception(&exception, message));
        }

        let payload: &[u8] = if bytes.is_empty() { b"{}" } else { &bytes };
        serde_json::from_slice(payload).map_err(|e| {
            ProviderError::unrecognized(format!("invalid {operation} response: {e}"))
        })
    }
}

/// Base64(HMAC-SHA256(client_secret, username ‖ client_id)).
pub fn secret_hash(
    client_secret: &str,
    username: &str,
    client_id: &str,
) -> Result<String, ProviderError> {
    let mut mac = HmacSha256::new_from_slice(client_secret.as_bytes())
        .map_err(|e| ProviderError::unrecognized(format!("invalid client secret: {e}")))?;
    mac.update(username.as_bytes());
    mac.update(client_id.as_bytes());
    Ok(Base64::encode_string(&mac.finalize().into_bytes()))
}

#[async_trait]
impl IdentityProvider for CognitoClient {
    async fn register(
        &self,
        request: &RegistrationRequest,
    ) -> Result<CodeDeliveryDetails, ProviderError> {
        let input = SignUpInput {
            client_id: &self.client_id,
            username: &request.email,
            password: &request.password,
            user_attributes: vec![
                AttributeType {
                    name: "name",
                    value: &request.name,
                },
                AttributeType {
                    name: "email",
                    value: &request.email,
                },
            ],
            secret_hash: self.secret_hash(&request.email)?,
        };
        let output: DeliveryOutput = self.call("SignUp", &input).await?;
        Ok(output.into_details())
    }

    async fn confirm_registration(
        &self,
        request: &ConfirmationRequest,
    ) -> Result<(), ProviderError> {
        let input = ConfirmSignUpInput {
            client_id: &self.client_id,
            username: &request.email,
            confirmation_code: &request.confirmation_code,
            secret_hash: self.secret_hash(&request.email)?,
        };
        let _: EmptyOutput = self.call("ConfirmSignUp", &input).await?;
        Ok(())
    }

    async fn resend_confirmation_code(
        &self,
        email: &str,
    ) -> Result<CodeDeliveryDetails, ProviderError> {
        let input = UsernameInput {
            client_id: &self.client_id,
            username: email,
            secret_hash: self.secret_hash(email)?,
        };
        let output: DeliveryOutput = self.call("ResendConfirmationCode", &input).await?;
        Ok(output.into_details())
    }

    async fn login(&self, request: &LoginRequest) -> Result<LoginResult, ProviderError> {
        let mut auth_parameters = BTreeMap::from([
            ("USERNAME", request.email.clone()),
            ("PASSWORD", request.password.clone()),
        ]);
        if let Some(hash) = self.secret_hash(&request.email)? {
            auth_parameters.insert("SECRET_HASH", hash);
        }

        let input = InitiateAuthInput {
            auth_flow: USER_PASSWORD_AUTH,
            client_id: &self.client_id,
            auth_parameters,
        };
        let output: InitiateAuthOutput = self.call("InitiateAuth", &input).await?;

        match output.authentication_result {
            Some(result) => Ok(LoginResult {
                access_token: result.access_token,
                id_token: result.id_token,
                refresh_token: result.refresh_token,
                token_type: result.token_type,
                expires_in: result.expires_in,
            }),
            None => Err(ProviderError::unrecognized(format!(
                "unsupported authentication challenge {}",
                output.challenge_name.as_deref().unwrap_or("<none>")
            ))),
        }
    }

    async fn forgot_password(&self, email: &str) -> Result<CodeDeliveryDetails, ProviderError> {
        let input = UsernameInput {
            client_id: &self.client_id,
            username: email,
            secret_hash: self.secret_hash(email)?,
        };
        let output: DeliveryOutput = self.call("ForgotPassword", &input).await?;
        Ok(output.into_details())
    }

    async fn confirm_forgot_password(
        &self,
        request: &PasswordResetRequest,
    ) -> Result<(), ProviderError> {
        let input = ConfirmForgotPasswordInput {
            client_id: &self.client_id,
            username: &request.email,
            confirmation_code: &request.confirmation_code,
            password: &request.new_password,
            secret_hash: self.secret_hash(&request.email)?,
        };
        let _: EmptyOutput = self.call("ConfirmForgotPassword", &input).await?;
        Ok(())
    }

    async fn change_password(
        &self,
        access_token: &str,
        request: &PasswordChangeRequest,
    ) -> Result<(), ProviderError> {
        let input = ChangePasswordInput {
            access_token,
            previous_password: &request.previous_password,
            proposed_password: &request.proposed_password,
        };
        let _: EmptyOutput = self.call("ChangePassword", &input).await?;
        Ok(())
    }
}

// =============================================================================
// Wire types
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct AttributeType<'a> {
    name: &'static str,
    value: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct SignUpInput<'a> {
    client_id: &'a str,
    username: &'a str,
    password: &'a str,
    user_attributes: Vec<AttributeType<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_hash: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmSignUpInput<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_hash: Option<String>,
}

/// Shared by `ResendConfirmationCode` and `ForgotPassword`.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct UsernameInput<'a> {
    client_id: &'a str,
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_hash: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ConfirmForgotPasswordInput<'a> {
    client_id: &'a str,
    username: &'a str,
    confirmation_code: &'a str,
    password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    secret_hash: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthInput<'a> {
    auth_flow: &'static str,
    client_id: &'a str,
    auth_parameters: BTreeMap<&'static str, String>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct ChangePasswordInput<'a> {
    access_token: &'a str,
    previous_password: &'a str,
    proposed_password: &'a str,
}

#[derive(Deserialize)]
struct EmptyOutput {}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase", default)]
struct WireDelivery {
    destination: Option<String>,
    delivery_medium: Option<String>,
    attribute_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DeliveryOutput {
    #[serde(default)]
    code_delivery_details: Option<WireDelivery>,
}

impl DeliveryOutput {
    fn into_details(self) -> CodeDeliveryDetails {
        let wire = self.code_delivery_details.unwrap_or_default();
        CodeDeliveryDetails {
            destination: wire.destination,
            delivery_medium: wire.delivery_medium,
            attribute_name: wire.attribute_name,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InitiateAuthOutput {
    #[serde(default)]
    authentication_result: Option<AuthenticationResult>,
    #[serde(default)]
    challenge_name: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct AuthenticationResult {
    access_token: Option<String>,
    expires_in: Option<i64>,
    id_token: Option<String>,
    refresh_token: Option<String>,
    token_type: Option<String>,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(rename = "__type")]
    error_type: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}
