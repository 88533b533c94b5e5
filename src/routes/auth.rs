// ABOUTME: Authentication route handlers: registration and login
// ABOUTME: Both return a bearer token so the client is signed in immediately
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::UserInfo;
use crate::resources::ServerResources;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Email address (unique)
    pub email: String,
    /// Plaintext password
    pub password: String,
    /// Display name
    pub name: String,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Email address
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Successful authentication response
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent requests
    pub access_token: String,
    /// Always "bearer"
    pub token_type: &'static str,
    /// Public view of the authenticated user
    pub user: UserInfo,
}

// ============================================================================
// Auth Routes
// ============================================================================

/// Authentication routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all authentication routes
    #[must_use]
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::register))
            .route("/api/auth/login", post(Self::login))
            .with_state(resources)
    }

    /// Register a new user account
    ///
    /// Returns a token alongside the created user so registration doubles
    /// as the first login.
    async fn register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> AppResult<Json<AuthResponse>> {
        let email = request.email.trim().to_lowercase();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::invalid_input("A valid email is required"));
        }
        if request.password.is_empty() {
            return Err(AppError::invalid_input("Password is required"));
        }
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::invalid_input("Name is required"));
        }

        let password_hash = resources.auth.hash_password(&request.password)?;
        let user = resources
            .database
            .users()
            .create(&email, name, &password_hash)
            .await?;

        info!(user_id = user.id, "user registered");

        let access_token = resources.auth.generate_token(user.id)?;
        Ok(Json(AuthResponse {
            access_token,
            token_type: "bearer",
            user: UserInfo::from(&user),
        }))
    }

    /// Authenticate an existing user
    ///
    /// A missing account and a wrong password produce the same error so
    /// the endpoint cannot be used to probe for registered emails.
    async fn login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> AppResult<Json<AuthResponse>> {
        let email = request.email.trim().to_lowercase();

        let user = resources
            .database
            .users()
            .get_by_email(&email)
            .await?
            .filter(|u| resources.auth.verify_password(&request.password, &u.password_hash))
            .ok_or_else(|| AppError::auth_invalid("Incorrect email or password"))?;

        info!(user_id = user.id, "user logged in");

        let access_token = resources.auth.generate_token(user.id)?;
        Ok(Json(AuthResponse {
            access_token,
            token_type: "bearer",
            user: UserInfo::from(&user),
        }))
    }
}
