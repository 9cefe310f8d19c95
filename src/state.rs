// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthConfig, JwksManager, TokenVerifier};
use crate::config::AppConfig;
use crate::idp::{CognitoClient, IdentityProvider};

/// Shared, read-only application state.
#[derive(Clone)]
pub struct AppState {
    pub idp: Arc<dyn IdentityProvider>,
    pub auth: AuthConfig,
    /// Inbound request deadline.
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(idp: Arc<dyn IdentityProvider>, auth: AuthConfig, request_timeout: Duration) -> Self {
        Self {
            idp,
            auth,
            request_timeout,
        }
    }

    /// Build the provider client and JWKS manager from configuration.
    ///
    /// Both share one HTTP client whose timeout matches the request deadline.
    pub fn from_config(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        let idp = CognitoClient::from_config(http.clone(), config);
        let jwks = JwksManager::new(config.jwks_url(), http).with_cache_ttl(config.jwks_cache_ttl());
        let verifier = TokenVerifier::new(config.jwt.issuer.clone());

        Ok(Self::new(
            Arc::new(idp),
            AuthConfig::new(jwks, verifier),
            config.request_timeout(),
        ))
    }
}
