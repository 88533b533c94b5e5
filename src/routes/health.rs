// ABOUTME: Health check route handlers for service monitoring
// ABOUTME: Unauthenticated liveness endpoints for load balancers and probes
//
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Health routes implementation
pub struct HealthRoutes;

impl HealthRoutes {
    /// Create all health check routes
    #[must_use]
    pub fn routes() -> axum::Router {
        use axum::{routing::get, Json, Router};

        async fn health_handler() -> Json<serde_json::Value> {
            Json(serde_json::json!({ "status": "healthy" }))
        }

        Router::new()
            .route("/health", get(health_handler))
            .route("/api/health", get(health_handler))
    }
}
