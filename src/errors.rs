// ABOUTME: Unified error handling for the taskchat server
// ABOUTME: Defines error codes, HTTP status mapping, and the JSON wire format
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Unified Error Handling
//!
//! Central error type used across all modules. Every failure is an
//! [`AppError`] carrying an [`ErrorCode`]; the code determines the HTTP
//! status, and the wire body is the `{"detail": "..."}` shape the frontend
//! consumes.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Standard error codes used throughout the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authentication & Authorization
    #[serde(rename = "AUTH_REQUIRED")]
    AuthRequired,
    #[serde(rename = "AUTH_INVALID")]
    AuthInvalid,
    #[serde(rename = "AUTH_EXPIRED")]
    AuthExpired,
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied,

    // Validation
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput,

    // Resources
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound,
    #[serde(rename = "RESOURCE_ALREADY_EXISTS")]
    ResourceAlreadyExists,

    // Upstream model
    #[serde(rename = "MODEL_ERROR")]
    ModelError,
    #[serde(rename = "MODEL_TIMEOUT")]
    ModelTimeout,

    // Internal
    #[serde(rename = "CONFIG_ERROR")]
    ConfigError,
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError,
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        match self {
            Self::InvalidInput => StatusCode::BAD_REQUEST,
            Self::AuthRequired | Self::AuthInvalid | Self::AuthExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::PermissionDenied => StatusCode::FORBIDDEN,
            Self::ResourceNotFound => StatusCode::NOT_FOUND,
            Self::ResourceAlreadyExists => StatusCode::CONFLICT,
            Self::ModelError => StatusCode::BAD_GATEWAY,
            Self::ModelTimeout => StatusCode::GATEWAY_TIMEOUT,
            Self::ConfigError | Self::DatabaseError | Self::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Unified error type for the application
#[derive(Debug, Error)]
#[error("{code:?}: {message}")]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// HTTP error body matching the frontend contract
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            detail: error.message,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.http_status();
        if status.is_server_error() {
            tracing::error!(code = ?self.code, "request failed: {}", self.message);
        }
        // Internal detail never leaks for 5xx responses
        let body = if status == StatusCode::INTERNAL_SERVER_ERROR {
            ErrorResponse {
                detail: "Internal server error".to_owned(),
            }
        } else {
            ErrorResponse::from(self)
        };
        (status, Json(body)).into_response()
    }
}

/// Convenience constructors for common errors
impl AppError {
    /// Authentication required
    pub fn auth_required() -> Self {
        Self::new(ErrorCode::AuthRequired, "Authentication required")
    }

    /// Invalid authentication
    pub fn auth_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::AuthInvalid, message)
    }

    /// Authentication expired
    pub fn auth_expired() -> Self {
        Self::new(ErrorCode::AuthExpired, "Token expired")
    }

    /// Access to another user's data
    pub fn permission_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    /// Resource not found
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Invalid input
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Duplicate resource
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ResourceAlreadyExists, message)
    }

    /// Internal server error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }

    /// Configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Upstream model failure
    pub fn model_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ModelError, message)
    }

    /// Upstream model timed out
    pub fn model_timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ModelTimeout, message)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::new(ErrorCode::InternalError, error.to_string())
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        Self::database(error.to_string())
    }
}
