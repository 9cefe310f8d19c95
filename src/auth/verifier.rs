// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer token verification against a JWK set.
//!
//! Only the header's `kid` is read before the signature is checked. The
//! verification algorithm comes from the matching JWK, never from the token.

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::jwk::{AlgorithmParameters, Jwk, JwkSet, KeyAlgorithm};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde_json::{Map, Value};

use super::error::AuthError;

/// Verified claim set.
pub type Claims = Map<String, Value>;

/// Validates signature, expiry and (optionally) issuer.
///
/// `exp` and `nbf` are checked without leeway: a token is rejected as soon
/// as its expiry is in the past.
#[derive(Debug, Clone, Default)]
pub struct TokenVerifier {
    /// Expected `iss`; not checked when `None`
    issuer: Option<String>,
}

impl TokenVerifier {
    pub fn new(issuer: Option<String>) -> Self {
        Self { issuer }
    }

    /// Verify `token` against `keys` and return its claims.
    pub fn verify(&self, token: &str, keys: &JwkSet) -> Result<Claims, AuthError> {
        if !has_jws_shape(token) {
            return Err(AuthError::MalformedToken);
        }

        let header = decode_header(token).map_err(|_| AuthError::MalformedToken)?;
        let kid = header.kid.as_deref().ok_or(AuthError::UnknownKey)?;
        let jwk = keys.find(kid).ok_or(AuthError::UnknownKey)?;
        let (decoding_key, algorithm) = jwk_to_decoding_key(jwk)?;

        let mut validation = Validation::new(algorithm);
        validation.leeway = 0;
        validation.validate_nbf = true;
        // Cognito access tokens carry `client_id`, not `aud`.
        validation.validate_aud = false;
        if let Some(issuer) = &self.issuer {
            validation.set_issuer(&[issuer]);
        }

        let data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidRsaKey(_)
                | ErrorKind::InvalidEcdsaKey
                | ErrorKind::InvalidKeyFormat => AuthError::InvalidSignature,
                ErrorKind::InvalidIssuer => AuthError::InvalidIssuer,
                ErrorKind::ImmatureSignature => AuthError::TokenNotYetValid,
                _ => AuthError::MalformedToken,
            }
        })?;

        Ok(data.claims)
    }
}

/// Extract the `sub` claim.
pub fn subject(claims: &Claims) -> Result<String, AuthError> {
    claims
        .get("sub")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or(AuthError::MissingSubject)
}

/// Exactly three non-empty dot-separated segments.
fn has_jws_shape(token: &str) -> bool {
    let segments: Vec<&str> = token.split('.').collect();
    segments.len() == 3 && segments.iter().all(|s| !s.is_empty())
}

/// Convert a JWK to a DecodingKey.
fn jwk_to_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), AuthError> {
    match &jwk.algorithm {
        AlgorithmParameters::RSA(rsa) => {
            let key = DecodingKey::from_rsa_components(&rsa.n, &rsa.e)
                .map_err(|_| AuthError::InvalidSignature)?;

            let alg = match jwk.common.key_algorithm {
                Some(KeyAlgorithm::RS384) => Algorithm::RS384,
                Some(KeyAlgorithm::RS512) => Algorithm::RS512,
                _ => Algorithm::RS256,
            };

            Ok((key, alg))
        }
        AlgorithmParameters::EllipticCurve(ec) => {
            let key = DecodingKey::from_ec_components(&ec.x, &ec.y)
                .map_err(|_| AuthError::InvalidSignature)?;

            let alg = match jwk.common.key_algorithm {
                Some(KeyAlgorithm::ES384) => Algorithm::ES384,
                _ => Algorithm::ES256,
            };

            Ok((key, alg))
        }
        _ => Err(AuthError::InvalidSignature),
    }
}
