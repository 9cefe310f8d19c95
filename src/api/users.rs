// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Account endpoints.
//!
//! Each handler validates its body, forwards the request to the identity
//! provider once and shapes the result. Provider failures come back with the
//! mapped status and `{"error": message}`.

use axum::{
    extract::{FromRequest, Request, State},
    http::StatusCode,
    Json,
};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::{
    auth::VerifiedIdentity,
    error::ApiError,
    idp::ProviderError,
    models::{
        ConfirmationRequest, DeliveryEnvelope, EmailRequest, LoginEnvelope, LoginRequest,
        PasswordChangeRequest, PasswordResetRequest, RegistrationRequest, SubjectEnvelope,
        Validate,
    },
    state::AppState,
};

/// JSON body that has also passed [`Validate`]. Rejects with 400.
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate().map_err(ApiError::bad_request)?;
        Ok(Self(value))
    }
}

/// Log a failed provider call and convert it for the client.
fn provider_failure(action: &'static str, user: &str, e: ProviderError) -> ApiError {
    if e.status().is_server_error() {
        error!(action, user, error = %e, "identity provider call failed");
    } else {
        warn!(action, user, error = %e, "identity provider rejected request");
    }
    e.into()
}

/// Register a new user.
///
/// The user stays unconfirmed until the delivered code is submitted to
/// `/confirm`.
#[utoipa::path(
    post,
    path = "/signup",
    tag = "Accounts",
    request_body = RegistrationRequest,
    responses(
        (status = 200, description = "Confirmation code sent", body = DeliveryEnvelope),
        (status = 400, description = "Invalid request or password"),
        (status = 409, description = "Username or alias already exists"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<RegistrationRequest>,
) -> Result<Json<DeliveryEnvelope>, ApiError> {
    let details = state
        .idp
        .register(&request)
        .await
        .map_err(|e| provider_failure("signup", &request.email, e))?;

    info!(email = %request.email, "user registered");
    Ok(Json(DeliveryEnvelope { data: details }))
}

#[utoipa::path(
    post,
    path = "/confirm",
    tag = "Accounts",
    request_body = ConfirmationRequest,
    responses(
        (status = 200, description = "Registration confirmed"),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn confirm_signup(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ConfirmationRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .idp
        .confirm_registration(&request)
        .await
        .map_err(|e| provider_failure("confirm_signup", &request.email, e))?;

    info!(email = %request.email, "registration confirmed");
    Ok(StatusCode::OK)
}

#[utoipa::path(
    post,
    path = "/resend-confirm",
    tag = "Accounts",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Confirmation code re-sent", body = DeliveryEnvelope),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn resend_confirmation_code(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> Result<Json<DeliveryEnvelope>, ApiError> {
    let details = state
        .idp
        .resend_confirmation_code(&request.email)
        .await
        .map_err(|e| provider_failure("resend_confirmation_code", &request.email, e))?;

    info!(email = %request.email, "confirmation code re-sent");
    Ok(Json(DeliveryEnvelope { data: details }))
}

/// Exchange email and password for the provider's token bundle.
#[utoipa::path(
    post,
    path = "/login",
    tag = "Accounts",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Tokens issued", body = LoginEnvelope),
        (status = 401, description = "Incorrect username or password"),
        (status = 403, description = "User not confirmed"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginEnvelope>, ApiError> {
    let tokens = state
        .idp
        .login(&request)
        .await
        .map_err(|e| provider_failure("login", &request.email, e))?;

    info!(email = %request.email, "user logged in");
    Ok(Json(LoginEnvelope { data: tokens }))
}

#[utoipa::path(
    post,
    path = "/forgot-password",
    tag = "Accounts",
    request_body = EmailRequest,
    responses(
        (status = 200, description = "Reset code sent", body = DeliveryEnvelope),
        (status = 400, description = "Invalid request"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EmailRequest>,
) -> Result<Json<DeliveryEnvelope>, ApiError> {
    let details = state
        .idp
        .forgot_password(&request.email)
        .await
        .map_err(|e| provider_failure("forgot_password", &request.email, e))?;

    info!(email = %request.email, "password reset requested");
    Ok(Json(DeliveryEnvelope { data: details }))
}

#[utoipa::path(
    post,
    path = "/confirm-forgot",
    tag = "Accounts",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Password reset"),
        (status = 400, description = "Invalid request or password"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn confirm_forgot_password(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<PasswordResetRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .idp
        .confirm_forgot_password(&request)
        .await
        .map_err(|e| provider_failure("confirm_forgot_password", &request.email, e))?;

    info!(email = %request.email, "password reset confirmed");
    Ok(StatusCode::OK)
}

/// Change the caller's password.
///
/// The verified bearer token is forwarded to the provider as the access token.
#[utoipa::path(
    post,
    path = "/password",
    tag = "Accounts",
    security(("bearer" = [])),
    request_body = PasswordChangeRequest,
    responses(
        (status = 200, description = "Password changed"),
        (status = 400, description = "Invalid request or password"),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 500, description = "Internal error")
    )
)]
pub async fn change_password(
    State(state): State<AppState>,
    identity: VerifiedIdentity,
    ValidatedJson(request): ValidatedJson<PasswordChangeRequest>,
) -> Result<StatusCode, ApiError> {
    state
        .idp
        .change_password(&identity.token, &request)
        .await
        .map_err(|e| provider_failure("change_password", &identity.subject, e))?;

    info!(subject = %identity.subject, "password changed");
    Ok(StatusCode::OK)
}

/// Subject of the verified bearer token.
#[utoipa::path(
    get,
    path = "/me",
    tag = "Accounts",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Caller subject", body = SubjectEnvelope),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn me(identity: VerifiedIdentity) -> Json<SubjectEnvelope> {
    Json(SubjectEnvelope {
        data: identity.subject,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        auth::{AuthConfig, JwksManager, TokenVerifier},
        idp::{test_support::StubProvider, ProviderErrorKind},
    };
    use axum::{
        body::{to_bytes, Body},
        http::header::CONTENT_TYPE,
        routing::post,
        Router,
    };
    use serde_json::{json, Value};
    use std::{sync::Arc, time::Duration};
    use tower::ServiceExt;

    /// Handlers mounted without the auth layer.
    fn app(idp: Arc<StubProvider>) -> Router {
        let auth = AuthConfig::new(
            JwksManager::new("http://127.0.0.1:9/jwks.json", reqwest::Client::new()),
            TokenVerifier::default(),
        );
        let state = AppState::new(idp, auth, Duration::from_secs(5));
        Router::new()
            .route("/signup", post(signup))
            .route("/login", post(login))
            .route("/resend-confirm", post(resend_confirmation_code))
            .route("/forgot-password", post(forgot_password))
            .route("/password", post(change_password))
            .with_state(state)
    }

    async fn post_json(app: Router, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                axum::http::Request::post(uri)
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    const SIGNUP: &str = r#"{"name":"Ada","email":"ada@example.com","password":"Sup3r$ecret"}"#;

    #[tokio::test]
    async fn signup_returns_delivery_details() {
        let idp = Arc::new(StubProvider::default());
        let (status, body) = post_json(app(idp.clone()), "/signup", SIGNUP).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["delivery_medium"], "EMAIL");
        assert_eq!(idp.calls(), vec![("register", "ada@example.com".to_string())]);
    }

    #[tokio::test]
    async fn existing_username_is_409() {
        let idp = Arc::new(StubProvider::failing(ProviderErrorKind::UsernameExists));
        let (status, body) = post_json(app(idp), "/signup", SIGNUP).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body, json!({ "error": "Username already exists" }));
    }

    #[tokio::test]
    async fn unconfirmed_login_is_403() {
        let idp = Arc::new(StubProvider::failing(ProviderErrorKind::UserNotConfirmed));
        let (status, body) = post_json(
            app(idp),
            "/login",
            r#"{"email":"ada@example.com","password":"pw"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "User not confirmed");
    }

    #[tokio::test]
    async fn unrecognized_failure_does_not_leak_detail() {
        let idp = Arc::new(StubProvider::failing(ProviderErrorKind::Unrecognized));
        let (status, body) = post_json(
            app(idp),
            "/forgot-password",
            r#"{"email":"ada@example.com"}"#,
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "error": "Internal error" }));
    }

    #[tokio::test]
    async fn resend_and_forgot_read_email_from_body() {
        let idp = Arc::new(StubProvider::default());
        let (status, _) = post_json(
            app(idp.clone()),
            "/resend-confirm",
            r#"{"email":"ada@example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = post_json(
            app(idp.clone()),
            "/forgot-password",
            r#"{"email":"bob@example.com"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        assert_eq!(
            idp.calls(),
            vec![
                ("resend_confirmation_code", "ada@example.com".to_string()),
                ("forgot_password", "bob@example.com".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn invalid_bodies_are_400_without_provider_call() {
        let idp = Arc::new(StubProvider::default());

        for body in [
            "{not json",
            r#"{"email":"ada@example.com"}"#,
            r#"{"name":"Ada","email":"  ","password":"pw"}"#,
            r#"{"name":"Ada","email":42,"password":"pw"}"#,
        ] {
            let (status, response) = post_json(app(idp.clone()), "/signup", body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
            assert!(response["error"].is_string(), "{body}");
        }
        assert!(idp.calls().is_empty());
    }

    #[tokio::test]
    async fn change_password_without_identity_is_401_for_any_body() {
        let idp = Arc::new(StubProvider::default());

        for request in [
            r#"{"previous_password":"old","proposed_password":"new"}"#,
            "{not json",
            r#"{"previous_password":"old","proposed_password":"  "}"#,
        ] {
            let (status, body) = post_json(app(idp.clone()), "/password", request).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{request}");
            assert_eq!(body["error_code"], "unauthorized", "{request}");
        }
        assert!(idp.calls().is_empty());
    }
}
