// ABOUTME: JWT-based authentication: password hashing, token minting, validation
// ABOUTME: HS256 access tokens with sub/iat/exp/type claims, bcrypt password storage
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Authentication
//!
//! Passwords are stored only as bcrypt salted hashes. Access tokens are
//! HS256 JWTs whose only server-side state is signature validity; claims
//! carry the user id in `sub` and a `type` of `"access"`.

use crate::errors::{AppError, AppResult};
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Bcrypt operates on at most 72 bytes of input
const BCRYPT_MAX_PASSWORD_BYTES: usize = 72;

/// JWT claims for user access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID as a string
    pub sub: String,
    /// Issued-at timestamp (seconds)
    pub iat: i64,
    /// Expiration timestamp (seconds)
    pub exp: i64,
    /// Token type; always `"access"`
    #[serde(rename = "type")]
    pub token_type: String,
}

/// Authentication manager for password hashing and JWT tokens
#[derive(Clone)]
pub struct AuthManager {
    secret: String,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(secret: impl Into<String>, token_expiry_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            token_expiry_hours,
        }
    }

    /// Hash a password with bcrypt
    ///
    /// Input is truncated to 72 bytes, the bcrypt algorithm limit.
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let bytes = truncate_for_bcrypt(password);
        bcrypt::hash(bytes, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verify a plaintext password against a stored hash
    ///
    /// A malformed stored hash counts as a mismatch rather than an error so
    /// login failures are uniform.
    #[must_use]
    pub fn verify_password(&self, password: &str, password_hash: &str) -> bool {
        let bytes = truncate_for_bcrypt(password);
        bcrypt::verify(bytes, password_hash).unwrap_or(false)
    }

    /// Mint an access token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token(&self, user_id: i64) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expiry.timestamp(),
            token_type: "access".to_owned(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::internal(format!("Token encoding failed: {e}")))
    }

    /// Validate a token and return the authenticated user id
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for expired tokens and `AuthInvalid` for any
    /// other validation failure (bad signature, wrong type, malformed sub).
    pub fn validate_token(&self, token: &str) -> AppResult<i64> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::auth_expired(),
            _ => AppError::auth_invalid(format!("Invalid token: {e}")),
        })?;

        if data.claims.token_type != "access" {
            return Err(AppError::auth_invalid("Invalid token type"));
        }

        data.claims
            .sub
            .parse()
            .map_err(|_| AppError::auth_invalid("Invalid token subject"))
    }

    /// Authenticate a request from its `Authorization: Bearer` header
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the header is missing and token
    /// validation errors otherwise.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<i64> {
        let header = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))?;

        self.validate_token(token)
    }
}

fn truncate_for_bcrypt(password: &str) -> &[u8] {
    let bytes = password.as_bytes();
    &bytes[..bytes.len().min(BCRYPT_MAX_PASSWORD_BYTES)]
}
