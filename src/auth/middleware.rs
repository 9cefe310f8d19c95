// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication middleware for Axum.
//!
//! Applied with `route_layer` to the protected routes:
//!
//! ```rust,ignore
//! let protected = Router::new()
//!     .route("/password", post(change_password))
//!     .route_layer(axum::middleware::from_fn_with_state(
//!         auth_config.clone(),
//!         require_auth,
//!     ));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::jwks::JwksManager;
use super::verifier::{subject, TokenVerifier};
use super::{AuthError, VerifiedIdentity};

/// Everything the middleware needs to verify a token.
#[derive(Clone)]
pub struct AuthConfig {
    /// JWKS manager for key fetching
    pub jwks: Arc<JwksManager>,
    pub verifier: TokenVerifier,
}

impl AuthConfig {
    pub fn new(jwks: JwksManager, verifier: TokenVerifier) -> Self {
        Self {
            jwks: Arc::new(jwks),
            verifier,
        }
    }
}

/// Authentication middleware function.
///
/// Header problems short-circuit before any key fetch.
pub async fn require_auth(
    State(config): State<AuthConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(request.headers()) {
        Ok(token) => token.to_string(),
        Err(e) => return e.into_response(),
    };

    match authenticate(&token, &config).await {
        Ok(identity) => {
            debug!(subject = %identity.subject, "request authenticated");
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(e) => {
            warn!(error_code = e.error_code(), "authentication failed");
            e.into_response()
        }
    }
}

/// Extract `<token>` from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() || token.contains(char::is_whitespace) {
        return Err(AuthError::InvalidAuthHeader);
    }

    Ok(token)
}

/// Fetch keys, verify `token` and build the caller identity.
pub async fn authenticate(token: &str, config: &AuthConfig) -> Result<VerifiedIdentity, AuthError> {
    let keys = config.jwks.key_set().await?;
    let claims = config.verifier.verify(token, &keys)?;

    Ok(VerifiedIdentity {
        subject: subject(&claims)?,
        token: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::test_support::{mint, now, serve_jwks, valid_token, TestServer, JWKS_JSON};
    use axum::{
        body::{to_bytes, Body},
        http::{HeaderValue, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use serde_json::json;
    use std::sync::atomic::Ordering;
    use tower::ServiceExt;

    async fn whoami(identity: VerifiedIdentity) -> String {
        identity.subject
    }

    fn app(jwks_url: String) -> Router {
        let config = AuthConfig::new(
            JwksManager::new(jwks_url, reqwest::Client::new()),
            TokenVerifier::default(),
        );
        Router::new()
            .route("/whoami", get(whoami))
            .route_layer(from_fn_with_state(config, require_auth))
    }

    async fn call(app: Router, authorization: Option<&str>) -> (StatusCode, String) {
        let mut request = axum::http::Request::builder().uri("/whoami");
        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        let response = app
            .oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn jwks() -> TestServer {
        serve_jwks(StatusCode::OK, JWKS_JSON).await
    }

    #[tokio::test]
    async fn valid_token_reaches_handler_with_subject() {
        let server = jwks().await;
        let token = valid_token("8d1c-user");

        let (status, body) = call(app(server.url()), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "8d1c-user");
        assert_eq!(server.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_headers_rejected_without_key_fetch() {
        let server = jwks().await;
        let token = valid_token("u");

        for header in [
            None,
            Some(token.clone()),
            Some(format!("bearer {token}")),
            Some(format!("Bearer  {token}")),
            Some("Bearer ".to_string()),
            Some(format!("Basic {token}")),
        ] {
            let (status, _) = call(app(server.url()), header.as_deref()).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED, "{header:?}");
        }
        assert_eq!(server.hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unknown_kid_is_401() {
        let server = jwks().await;
        let token = mint(
            Some("other-kid"),
            crate::auth::test_support::FOREIGN_KEY_PEM,
            &json!({ "sub": "u", "exp": now() + 600 }),
        );

        let (status, body) = call(app(server.url()), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("unknown_key"));
    }

    #[tokio::test]
    async fn expired_token_is_401() {
        let server = jwks().await;
        let token = mint(
            Some(crate::auth::test_support::SIGNING_KID),
            crate::auth::test_support::SIGNING_KEY_PEM,
            &json!({ "sub": "u", "exp": now() - 7200 }),
        );

        let (status, body) = call(app(server.url()), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("token_expired"));
    }

    #[tokio::test]
    async fn key_fetch_failure_is_500() {
        let server = serve_jwks(StatusCode::BAD_GATEWAY, "").await;
        let token = valid_token("u");

        let (status, _) = call(app(server.url()), Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn bearer_token_parsing() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers).unwrap(), "abc.def.ghi");

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc def"));
        assert!(matches!(
            bearer_token(&headers),
            Err(AuthError::InvalidAuthHeader)
        ));

        assert!(matches!(
            bearer_token(&HeaderMap::new()),
            Err(AuthError::MissingAuthHeader)
        ));
    }
}
