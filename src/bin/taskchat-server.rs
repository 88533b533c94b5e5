// ABOUTME: Server binary: loads configuration, connects storage, and serves HTTP
// ABOUTME: Production entry point with structured logging and graceful shutdown
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Taskchat Server Binary
//!
//! Starts the conversational task management API: SQLite-backed stores,
//! JWT authentication, and the Gemini-driven chat orchestrator.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use taskchat::{
    config::ServerConfig, database::Database, llm::GeminiProvider, logging,
    resources::ServerResources, routes,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "taskchat-server")]
#[command(about = "Taskchat - AI-powered task management chat API")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override database URL
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(database_url) = args.database_url {
        config.database_url = database_url;
    }

    info!(port = config.http_port, "starting taskchat server");

    let database = Database::connect(&config.database_url).await?;
    info!(url = %config.database_url, "database initialized");

    let model = Arc::new(GeminiProvider::from_env()?);
    let port = config.http_port;
    let resources = Arc::new(ServerResources::new(database, config, model));
    let app = routes::router(resources);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!(port, "listening for HTTP connections");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}
