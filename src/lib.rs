// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Auth Gateway - User Pool Authentication Facade
//!
//! Thin HTTP service in front of a hosted user pool. Account flows are
//! forwarded to the provider; bearer tokens on protected routes are verified
//! locally against the provider's published signing keys.
//!
//! ## Modules
//!
//! - `api` - HTTP handlers and router (Axum)
//! - `auth` - Bearer token verification (JWKS)
//! - `config` - YAML + environment configuration
//! - `idp` - Identity provider adapter (Cognito JSON protocol)

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod idp;
pub mod models;
pub mod state;
