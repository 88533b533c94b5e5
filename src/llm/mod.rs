// ABOUTME: LLM provider abstraction for pluggable chat model integration
// ABOUTME: Defines message/request/response types and the function-calling contract
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # LLM Provider Interface
//!
//! The chat orchestrator talks to models through [`ChatModel`], a small
//! async trait centered on one operation: complete a conversation with an
//! optional tool set, returning either text or function calls. The Gemini
//! implementation lives in [`gemini`]; tests substitute a scripted model.

mod gemini;
pub mod prompts;

pub use gemini::GeminiProvider;
pub use prompts::assistant_system_prompt;

use crate::errors::AppError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message sent to the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// System instruction
    System,
    /// User input (tool results are also relayed with this role)
    User,
    /// Prior assistant output
    Assistant,
}

/// A single message in a model conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: ChatRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }
}

// ============================================================================
// Function Calling Types
// ============================================================================

/// Function call requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,
    /// Arguments as a JSON object
    pub args: serde_json::Value,
}

/// Function declaration advertised to the model (JSON Schema parameters)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Name of the function
    pub name: String,
    /// What the function does and when to use it
    pub description: String,
    /// Parameters schema
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Tool definition grouping function declarations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    /// Function declarations for this tool
    pub function_declarations: Vec<FunctionDeclaration>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Conversation messages
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider default when `None`)
    pub model: Option<String>,
    /// Temperature for response randomness
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
}

impl ChatRequest {
    /// Create a new chat request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            max_tokens: None,
        }
    }

    /// Set the model to use
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Response from a chat completion that may contain function calls
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletion {
    /// Generated text (`None` when the model chose to call functions)
    pub content: Option<String>,
    /// Function calls requested by the model
    pub function_calls: Option<Vec<FunctionCall>>,
    /// Model used for generation
    pub model: String,
}

impl ChatCompletion {
    /// Whether this response contains function calls
    #[must_use]
    pub fn has_function_calls(&self) -> bool {
        self.function_calls
            .as_ref()
            .is_some_and(|calls| !calls.is_empty())
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Chat model provider
///
/// One method carries the whole contract: given a conversation and the
/// registered tool declarations, produce either text or function calls.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Unique provider identifier (e.g. "gemini")
    fn name(&self) -> &'static str;

    /// Complete a conversation, optionally offering tools to the model
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream API call fails.
    async fn complete_with_tools(
        &self,
        request: &ChatRequest,
        tools: Option<&[Tool]>,
    ) -> Result<ChatCompletion, AppError>;
}
