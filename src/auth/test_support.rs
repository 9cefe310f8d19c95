// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for auth tests: signing keys, token minting and a
//! throwaway JWKS endpoint.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{http::StatusCode, routing::get, Router};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;

/// Key set published by the test JWKS endpoint (contains `test-signing-key`).
pub const JWKS_JSON: &str = include_str!("../../tests/fixtures/jwks.json");
/// Private half of `test-signing-key`.
pub const SIGNING_KEY_PEM: &str = include_str!("../../tests/fixtures/signing_key.pem");
/// A key that is not in the published set.
pub const FOREIGN_KEY_PEM: &str = include_str!("../../tests/fixtures/foreign_key.pem");
pub const SIGNING_KID: &str = "test-signing-key";

pub fn now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64
}

/// Sign `claims` with RS256 using `key_pem`, stamping `kid` in the header.
pub fn mint(kid: Option<&str>, key_pem: &str, claims: &Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_string);
    let key = EncodingKey::from_rsa_pem(key_pem.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

/// A valid access token for `sub`, signed by the published key.
pub fn valid_token(sub: &str) -> String {
    mint(
        Some(SIGNING_KID),
        SIGNING_KEY_PEM,
        &serde_json::json!({ "sub": sub, "exp": now() + 3600, "token_use": "access" }),
    )
}

pub struct TestServer {
    pub addr: SocketAddr,
    pub hits: Arc<AtomicUsize>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}/.well-known/jwks.json", self.addr)
    }
}

/// Serve `body` with `status` at `/.well-known/jwks.json`, counting hits.
pub async fn serve_jwks(status: StatusCode, body: &'static str) -> TestServer {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/.well-known/jwks.json",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                (status, body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestServer { addr, hits }
}
