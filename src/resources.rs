// ABOUTME: Shared server resources container for dependency injection
// ABOUTME: Constructed once at startup and shared across all route handlers via Arc
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use crate::auth::AuthManager;
use crate::chat::ChatOrchestrator;
use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::ChatModel;
use crate::tools::ToolDispatcher;

/// Centralized server resources, shared across handlers
///
/// Everything a request handler needs hangs off one `Arc<ServerResources>`
/// installed as router state.
pub struct ServerResources {
    /// Database handle
    pub database: Database,
    /// JWT authentication manager
    pub auth: AuthManager,
    /// Chat turn orchestrator
    pub orchestrator: ChatOrchestrator,
    /// Server configuration
    pub config: ServerConfig,
}

impl ServerResources {
    /// Assemble server resources from the core components
    #[must_use]
    pub fn new(database: Database, config: ServerConfig, model: Arc<dyn ChatModel>) -> Self {
        let auth = AuthManager::new(&config.jwt_secret, config.token_expiry_hours);
        let orchestrator = ChatOrchestrator::new(
            model,
            database.conversations(),
            ToolDispatcher::new(database.tasks()),
            Duration::from_secs(config.model_timeout_secs),
        );

        Self {
            database,
            auth,
            orchestrator,
            config,
        }
    }
}
