// ABOUTME: Logging configuration and structured logging setup
// ABOUTME: Configures log levels and output format for the server process
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Structured logging setup
//!
//! Log level is controlled by `RUST_LOG` (standard `EnvFilter` syntax) and
//! output format by `LOG_FORMAT` (`pretty` for development, `json` for
//! production log aggregation).

use std::env;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "taskchat=info,tower_http=info";

/// Initialize the global tracing subscriber
///
/// Must be called once, early in `main`. Panics if a subscriber is already
/// installed, which indicates a double-initialization bug.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let use_json = env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_target(true))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true))
            .init();
    }
}
