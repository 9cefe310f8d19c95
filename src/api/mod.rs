// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::require_auth,
    models::{
        CodeDeliveryDetails, ConfirmationRequest, DeliveryEnvelope, EmailRequest, LoginEnvelope,
        LoginRequest, LoginResult, PasswordChangeRequest, PasswordResetRequest,
        RegistrationRequest, SubjectEnvelope,
    },
    state::AppState,
};

pub mod health;
pub mod users;

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(users::signup))
        .route("/confirm", post(users::confirm_signup))
        .route("/resend-confirm", post(users::resend_confirmation_code))
        .route("/login", post(users::login))
        .route("/forgot-password", post(users::forgot_password))
        .route("/confirm-forgot", post(users::confirm_forgot_password))
        .route("/healthz", get(health::healthz))
        .route("/readyz", get(health::readiness));

    let protected_routes = Router::new()
        .route("/password", post(users::change_password))
        .route("/me", get(users::me))
        .route_layer(from_fn_with_state(state.auth.clone(), require_auth));

    let request_timeout = state.request_timeout;

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::GATEWAY_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

/// Registers the bearer token scheme referenced by protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        users::signup,
        users::confirm_signup,
        users::resend_confirmation_code,
        users::login,
        users::forgot_password,
        users::confirm_forgot_password,
        users::change_password,
        users::me,
        health::healthz,
        health::readiness
    ),
    components(
        schemas(
            RegistrationRequest,
            ConfirmationRequest,
            EmailRequest,
            LoginRequest,
            PasswordResetRequest,
            PasswordChangeRequest,
            CodeDeliveryDetails,
            LoginResult,
            DeliveryEnvelope,
            LoginEnvelope,
            SubjectEnvelope,
            health::HealthResponse,
            health::ReadyResponse,
            health::ReadyChecks
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Accounts", description = "Sign-up, login and password flows"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;
