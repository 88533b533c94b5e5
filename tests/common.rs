// ABOUTME: Shared integration test fixtures: in-memory resources and a scripted chat model
// ABOUTME: Each test gets an isolated SQLite database and its own model script

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taskchat::config::ServerConfig;
use taskchat::database::Database;
use taskchat::errors::AppError;
use taskchat::llm::{ChatCompletion, ChatModel, ChatRequest, FunctionCall, Tool};
use taskchat::resources::ServerResources;

/// Configuration used by all integration tests
pub fn test_config() -> ServerConfig {
    ServerConfig {
        http_port: 0,
        database_url: "sqlite::memory:".to_owned(),
        jwt_secret: "integration-test-jwt-secret".to_owned(),
        token_expiry_hours: 24,
        model_timeout_secs: 2,
        cors_origins: vec!["http://localhost:3000".to_owned()],
    }
}

/// Build server resources over a fresh in-memory database
pub async fn create_test_resources(model: Arc<dyn ChatModel>) -> Arc<ServerResources> {
    let config = test_config();
    let database = Database::connect(&config.database_url)
        .await
        .expect("in-memory database should connect");
    Arc::new(ServerResources::new(database, config, model))
}

/// Register a user directly in the store and mint a bearer header for them
pub async fn create_test_user(resources: &ServerResources, email: &str) -> (i64, String) {
    let hash = resources.auth.hash_password("password123").unwrap();
    let user = resources
        .database
        .users()
        .create(email, "Test User", &hash)
        .await
        .unwrap();
    let token = resources.auth.generate_token(user.id).unwrap();
    (user.id, format!("Bearer {token}"))
}

/// One scripted model response
pub enum ScriptedReply {
    /// Plain text completion
    Text(&'static str),
    /// Function calls the model wants executed
    Calls(Vec<(&'static str, serde_json::Value)>),
    /// Upstream failure
    Fail(&'static str),
    /// Sleep past any reasonable timeout before answering
    Hang,
}

/// Chat model replaying a fixed script of completions in order
///
/// When the script runs out, every further invocation returns a plain
/// acknowledgement, which matches how a real model ends a tool loop.
pub struct MockAgent {
    script: Mutex<VecDeque<ScriptedReply>>,
}

impl MockAgent {
    pub fn new(replies: Vec<ScriptedReply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(replies.into()),
        })
    }

    /// A model that always answers with the same text
    pub fn text_only(text: &'static str) -> Arc<Self> {
        Self::new(vec![ScriptedReply::Text(text)])
    }
}

#[async_trait]
impl ChatModel for MockAgent {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete_with_tools(
        &self,
        _request: &ChatRequest,
        _tools: Option<&[Tool]>,
    ) -> Result<ChatCompletion, AppError> {
        let reply = self.script.lock().unwrap().pop_front();

        match reply {
            None => Ok(text_completion("Done.")),
            Some(ScriptedReply::Text(text)) => Ok(text_completion(text)),
            Some(ScriptedReply::Calls(calls)) => Ok(ChatCompletion {
                content: None,
                function_calls: Some(
                    calls
                        .into_iter()
                        .map(|(name, args)| FunctionCall {
                            name: name.to_owned(),
                            args,
                        })
                        .collect(),
                ),
                model: "mock-model".to_owned(),
            }),
            Some(ScriptedReply::Fail(message)) => Err(AppError::model_error(message)),
            Some(ScriptedReply::Hang) => {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Err(AppError::model_error("unreachable"))
            }
        }
    }
}

fn text_completion(text: &str) -> ChatCompletion {
    ChatCompletion {
        content: Some(text.to_owned()),
        function_calls: None,
        model: "mock-model".to_owned(),
    }
}
