// ABOUTME: Environment-based configuration for deployment-specific settings
// ABOUTME: Reads ports, database URL, JWT secret, and model settings from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Environment-driven server configuration
//!
//! All runtime configuration comes from environment variables; there are no
//! config files. [`ServerConfig::from_env`] validates required values at
//! startup so a misconfigured deployment fails fast.

use crate::errors::{AppError, AppResult};
use std::env;

/// Default HTTP port
const DEFAULT_HTTP_PORT: u16 = 8000;

/// Default JWT expiry in hours
const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 24;

/// Default upper bound on a single model call, in seconds
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 30;

/// Server configuration loaded from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// HTTP listen port (`HTTP_PORT`)
    pub http_port: u16,
    /// SQLite database URL (`DATABASE_URL`)
    pub database_url: String,
    /// Secret for HS256 JWT signing (`JWT_SECRET`, required)
    pub jwt_secret: String,
    /// Access token lifetime in hours (`TOKEN_EXPIRY_HOURS`)
    pub token_expiry_hours: i64,
    /// Upper bound on a single model call (`MODEL_TIMEOUT_SECS`)
    pub model_timeout_secs: u64,
    /// Allowed CORS origins, comma-separated (`CORS_ORIGINS`)
    pub cors_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns a config error if `JWT_SECRET` is missing or a numeric
    /// variable fails to parse.
    pub fn from_env() -> AppResult<Self> {
        let http_port = parse_env("HTTP_PORT", DEFAULT_HTTP_PORT)?;
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:taskchat.db".to_owned());
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::config("JWT_SECRET environment variable not set"))?;
        let token_expiry_hours = parse_env("TOKEN_EXPIRY_HOURS", DEFAULT_TOKEN_EXPIRY_HOURS)?;
        let model_timeout_secs = parse_env("MODEL_TIMEOUT_SECS", DEFAULT_MODEL_TIMEOUT_SECS)?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000".to_owned())
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            token_expiry_hours,
            model_timeout_secs,
            cors_origins,
        })
    }
}

/// Parse an environment variable with a default, failing on malformed values
fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T> {
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|_| AppError::config(format!("{name} has invalid value: {raw}"))),
        Err(_) => Ok(default),
    }
}
