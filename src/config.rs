// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Configuration is read once at startup from a YAML file and then
//! overridden by environment variables. A missing file is not an error: the
//! gateway falls back to the environment alone. Missing required values are.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `APP_CONFIG` | Path to the YAML config file | `config/config.yaml` |
//! | `APP_HTTP_HOST` | Server bind address | `0.0.0.0` |
//! | `APP_HTTP_PORT` | Server bind port | `8080` |
//! | `APP_HTTP_REQUEST_TIMEOUT_SECS` | Per-request deadline, also used for outbound calls | `10` |
//! | `APP_COGNITO_REGION` | User pool region | Required |
//! | `APP_COGNITO_USER_POOL_ID` | User pool id | Required |
//! | `APP_COGNITO_CLIENT_ID` | App client id | Required |
//! | `APP_COGNITO_CLIENT_SECRET` | App client secret (enables `SecretHash`) | Optional |
//! | `APP_COGNITO_ENDPOINT` | Provider endpoint override | `https://cognito-idp.<region>.amazonaws.com` |
//! | `APP_JWT_JWKS_URL` | JWKS endpoint for token verification | Derived from region and pool |
//! | `APP_JWT_ISSUER` | Expected `iss` claim | Not checked |
//! | `APP_JWT_CACHE_TTL_SECS` | JWKS cache TTL, `0` disables caching | `0` |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs, io};

use serde::Deserialize;
use tracing::warn;
use url::Url;

/// Environment variable holding the config file path.
pub const CONFIG_PATH_ENV: &str = "APP_CONFIG";

/// Config file used when `APP_CONFIG` is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

/// Environment variable selecting the log format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default `RUST_LOG` filter.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("missing required setting {field} (set it in the config file or {env})")]
    Missing {
        field: &'static str,
        env: &'static str,
    },

    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub cognito: CognitoConfig,
    pub jwt: JwtConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct CognitoConfig {
    pub region: String,
    pub user_pool_id: String,
    pub client_id: String,
    pub client_secret: Option<String>,
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct JwtConfig {
    pub jwks_url: Option<String>,
    pub issuer: Option<String>,
    pub jwks_cache_ttl_secs: u64,
}

impl AppConfig {
    /// Load from `APP_CONFIG` (or the default path) and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load_from(Path::new(&path), |key| env::var(key).ok())
    }

    /// Load from `path`, resolving overrides through `lookup`.
    pub fn load_from(
        path: &Path,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match fs::read_to_string(path) {
            Ok(contents) => serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(
                    path = %path.display(),
                    "config file not found, using environment variables only"
                );
                AppConfig::default()
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };

        config.apply_overrides(&lookup)?;
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = lookup("APP_HTTP_HOST") {
            self.http.host = v;
        }
        if let Some(v) = lookup("APP_HTTP_PORT") {
            self.http.port = parse_number("http.port", &v)?;
        }
        if let Some(v) = lookup("APP_HTTP_REQUEST_TIMEOUT_SECS") {
            self.http.request_timeout_secs = parse_number("http.request_timeout_secs", &v)?;
        }
        if let Some(v) = lookup("APP_COGNITO_REGION") {
            self.cognito.region = v;
        }
        if let Some(v) = lookup("APP_COGNITO_USER_POOL_ID") {
            self.cognito.user_pool_id = v;
        }
        if let Some(v) = lookup("APP_COGNITO_CLIENT_ID") {
            self.cognito.client_id = v;
        }
        if let Some(v) = lookup("APP_COGNITO_CLIENT_SECRET") {
            self.cognito.client_secret = Some(v);
        }
        if let Some(v) = lookup("APP_COGNITO_ENDPOINT") {
            self.cognito.endpoint = Some(v);
        }
        if let Some(v) = lookup("APP_JWT_JWKS_URL") {
            self.jwt.jwks_url = Some(v);
        }
        if let Some(v) = lookup("APP_JWT_ISSUER") {
            self.jwt.issuer = Some(v);
        }
        if let Some(v) = lookup("APP_JWT_CACHE_TTL_SECS") {
            self.jwt.jwks_cache_ttl_secs = parse_number("jwt.jwks_cache_ttl_secs", &v)?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let required = [
            ("cognito.region", "APP_COGNITO_REGION", &self.cognito.region),
            ("cognito.user_pool_id", "APP_COGNITO_USER_POOL_ID", &self.cognito.user_pool_id),
            ("cognito.client_id", "APP_COGNITO_CLIENT_ID", &self.cognito.client_id),
        ];
        for (field, env, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Missing { field, env });
            }
        }

        if self.http.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "http.request_timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }

        check_url("cognito.endpoint", &self.cognito_endpoint())?;
        check_url("jwt.jwks_url", &self.jwks_url())?;
        Ok(())
    }

    /// Provider endpoint, derived from the region unless overridden.
    pub fn cognito_endpoint(&self) -> String {
        self.cognito
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://cognito-idp.{}.amazonaws.com", self.cognito.region))
    }

    /// JWKS URL, derived from the region and pool unless overridden.
    pub fn jwks_url(&self) -> String {
        self.jwt.jwks_url.clone().unwrap_or_else(|| {
            format!(
                "https://cognito-idp.{}.amazonaws.com/{}/.well-known/jwks.json",
                self.cognito.region, self.cognito.user_pool_id
            )
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.http.request_timeout_secs)
    }

    pub fn jwks_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.jwt.jwks_cache_ttl_secs)
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        field,
        reason: format!("{value:?} is not a valid number"),
    })
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value).map_err(|e| ConfigError::Invalid {
        field,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::Invalid {
            field,
            reason: format!("unsupported scheme {other:?}"),
        }),
    }
}
