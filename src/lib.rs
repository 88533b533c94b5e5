// ABOUTME: Main library entry point for the taskchat backend
// ABOUTME: Conversational task management over HTTP with model-driven tool dispatch
//
// SPDX-License-Identifier: MIT OR Apache-2.0

#![deny(unsafe_code)]

//! # Taskchat
//!
//! An AI-powered task management backend. Users register and authenticate
//! with bearer tokens, manage a personal todo list over a REST surface, and
//! converse with an assistant that manipulates that same list through a
//! fixed registry of tools.
//!
//! ## Architecture
//!
//! - **auth**: JWT issuance and validation, bcrypt password hashing
//! - **database**: SQLite persistence behind per-area store handles
//! - **llm**: Chat model abstraction and the Gemini implementation
//! - **tools**: Tool registry and dispatcher for model function calls
//! - **chat**: Turn orchestration tying the model and tools together
//! - **routes**: HTTP surface (axum)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use taskchat::config::ServerConfig;
//! use taskchat::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("taskchat configured for port {}", config.http_port);
//!     Ok(())
//! }
//! ```

/// JWT authentication and password hashing
pub mod auth;
/// Chat turn orchestration
pub mod chat;
/// Environment-driven server configuration
pub mod config;
/// SQLite persistence layer
pub mod database;
/// Error types and HTTP error rendering
pub mod errors;
/// Chat model providers
pub mod llm;
/// Structured logging setup
pub mod logging;
/// Core data model types
pub mod models;
/// Shared server resources
pub mod resources;
/// HTTP routes
pub mod routes;
/// Task tool registry and dispatcher
pub mod tools;
