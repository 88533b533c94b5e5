// ABOUTME: HTTP route organization and top-level router assembly
// ABOUTME: Merges per-domain routers and applies tracing and CORS layers
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # HTTP Routes
//!
//! Routes are organized by domain. Each domain exposes a `routes()`
//! constructor returning an axum `Router`; [`router`] merges them and
//! applies the shared middleware stack.

/// Authentication routes (register, login)
pub mod auth;
/// Chat and conversation routes
pub mod chat;
/// Health check routes
pub mod health;
/// Task CRUD routes
pub mod tasks;

use std::sync::Arc;

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::errors::{AppError, AppResult};
use crate::resources::ServerResources;

/// Assemble the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    let cors = cors_layer(&resources.config.cors_origins);

    Router::new()
        .merge(health::HealthRoutes::routes())
        .merge(auth::AuthRoutes::routes(resources.clone()))
        .merge(tasks::TaskRoutes::routes(resources.clone()))
        .merge(chat::ChatRoutes::routes(resources))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Build the CORS layer from the configured origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// Reject requests whose path `user_id` differs from the authenticated user
///
/// The mismatch is a deliberate 403 rather than 404: the caller proved who
/// they are, they just asked for someone else's data.
pub(crate) fn ensure_path_user(path_user_id: i64, auth_user_id: i64) -> AppResult<()> {
    if path_user_id == auth_user_id {
        Ok(())
    } else {
        Err(AppError::permission_denied(
            "User ID mismatch: you can only access your own data",
        ))
    }
}
