// ABOUTME: Chat turn orchestration: persistence, model invocation, and the tool loop
// ABOUTME: Serializes turns per conversation and keeps the transcript durable at each step
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Chat Orchestrator
//!
//! A chat turn is a small state machine. The user message is persisted
//! before the model is ever invoked, so a model outage never loses input.
//! The model then runs in a bounded loop: each round either yields text
//! (the turn ends) or function calls, which are executed sequentially and
//! fed back. Assistant and tool messages are persisted as they happen, and
//! turns within one conversation are serialized by an async mutex so
//! interleaved requests cannot corrupt the transcript.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::database::ConversationStore;
use crate::errors::{AppError, AppResult};
use crate::llm::{assistant_system_prompt, ChatMessage, ChatModel, ChatRequest, Tool};
use crate::models::{Conversation, MessageRole, ToolCall, ToolResult};
use crate::tools::ToolDispatcher;

/// Maximum number of tool rounds before forcing a text response
const MAX_TOOL_TURNS: usize = 10;

/// Maximum derived conversation title length, in characters
const TITLE_MAX_CHARS: usize = 50;

/// Assistant text used when the model returns neither text nor calls
const FALLBACK_RESPONSE: &str = "I've processed your request.";

/// Assistant text persisted when the model fails mid-turn
const MODEL_FAILURE_RESPONSE: &str = "I'm sorry, but I encountered a critical issue while \
processing your request. Could you please try again? If the problem persists, please contact \
support.";

/// Outcome of one completed chat turn
#[derive(Debug)]
pub struct ChatOutcome {
    /// Final assistant text
    pub response: String,
    /// Conversation the turn was recorded in
    pub conversation_id: i64,
    /// Id of the final assistant message
    pub message_id: i64,
    /// Every tool call executed during the turn, in order
    pub tool_calls: Vec<ToolCall>,
}

/// Orchestrates chat turns against a model and the conversation store
pub struct ChatOrchestrator {
    model: Arc<dyn ChatModel>,
    conversations: ConversationStore,
    tools: ToolDispatcher,
    model_timeout: Duration,
    turn_locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl ChatOrchestrator {
    /// Create a new orchestrator
    #[must_use]
    pub fn new(
        model: Arc<dyn ChatModel>,
        conversations: ConversationStore,
        tools: ToolDispatcher,
        model_timeout: Duration,
    ) -> Self {
        Self {
            model,
            conversations,
            tools,
            model_timeout,
            turn_locks: DashMap::new(),
        }
    }

    /// Process one user message end to end
    ///
    /// Resolves (or creates) the target conversation, persists the user
    /// message, runs the model/tool loop, and persists the assistant's
    /// reply. The first turn of a conversation also derives its title from
    /// the user message.
    ///
    /// # Errors
    ///
    /// Returns `ModelError` or `ModelTimeout` when the model fails; the
    /// user message and an apology from the assistant are already durable
    /// by then. Database failures surface as `DatabaseError`.
    pub async fn process_message(
        &self,
        user_id: i64,
        conversation_id: Option<i64>,
        text: &str,
    ) -> AppResult<ChatOutcome> {
        let conversation = self
            .conversations
            .create_if_absent(user_id, conversation_id)
            .await?;

        // One turn at a time per conversation; concurrent turns in other
        // conversations proceed independently
        let lock = self
            .turn_locks
            .entry(conversation.id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        let first_turn = conversation.message_count == 0;

        self.conversations
            .append_message(conversation.id, MessageRole::User, text, None, None)
            .await?;

        let mut llm_messages = self.build_model_history(&conversation, user_id).await?;
        let declarations = ToolDispatcher::declarations();

        let result = self
            .run_tool_loop(user_id, conversation.id, &mut llm_messages, &declarations)
            .await;

        let (response, executed_calls) = match result {
            Ok(turn) => turn,
            Err(e) => {
                // Record the failure in the transcript before surfacing it
                if let Err(persist_err) = self
                    .conversations
                    .append_message(
                        conversation.id,
                        MessageRole::Assistant,
                        MODEL_FAILURE_RESPONSE,
                        None,
                        None,
                    )
                    .await
                {
                    error!(error = %persist_err.message, "failed to persist failure message");
                }
                return Err(e);
            }
        };

        let assistant_message = self
            .conversations
            .append_message(
                conversation.id,
                MessageRole::Assistant,
                &response,
                None,
                None,
            )
            .await?;

        if first_turn {
            let title = derive_title(text);
            self.conversations
                .update_title(conversation.id, user_id, &title)
                .await?;
        }

        Ok(ChatOutcome {
            response,
            conversation_id: conversation.id,
            message_id: assistant_message.id,
            tool_calls: executed_calls,
        })
    }

    /// Replay the stored transcript as model messages, system prompt first
    async fn build_model_history(
        &self,
        conversation: &Conversation,
        user_id: i64,
    ) -> AppResult<Vec<ChatMessage>> {
        let stored = self.conversations.messages(conversation.id, user_id).await?;

        let mut messages = Vec::with_capacity(stored.len() + 1);
        messages.push(ChatMessage::system(assistant_system_prompt()));

        for message in stored {
            match message.role {
                MessageRole::User => messages.push(ChatMessage::user(message.content)),
                MessageRole::Assistant => {
                    if !message.content.is_empty() {
                        messages.push(ChatMessage::assistant(message.content));
                    }
                }
                // Tool results are relayed back as user text, which is how
                // the model saw them when the turn originally ran
                MessageRole::Tool => {
                    if let Some(results) = &message.tool_results {
                        append_tool_results(&mut messages, results);
                    }
                }
            }
        }

        Ok(messages)
    }

    /// Run the bounded model/tool loop for one turn
    ///
    /// Returns the final assistant text plus every tool call executed.
    async fn run_tool_loop(
        &self,
        user_id: i64,
        conversation_id: i64,
        llm_messages: &mut Vec<ChatMessage>,
        declarations: &[Tool],
    ) -> AppResult<(String, Vec<ToolCall>)> {
        let mut executed_calls = Vec::new();

        for round in 0..MAX_TOOL_TURNS {
            let request = ChatRequest::new(llm_messages.clone());
            let completion = self.invoke_model(&request, declarations).await?;

            let Some(function_calls) = completion
                .function_calls
                .filter(|calls| !calls.is_empty())
            else {
                let content = completion
                    .content
                    .filter(|c| !c.is_empty())
                    .unwrap_or_else(|| FALLBACK_RESPONSE.to_owned());
                return Ok((content, executed_calls));
            };

            info!(
                round,
                count = function_calls.len(),
                "executing tool calls"
            );

            let calls: Vec<ToolCall> = function_calls
                .into_iter()
                .enumerate()
                .map(|(idx, fc)| ToolCall {
                    id: format!("call_{round}_{idx}"),
                    name: fc.name,
                    arguments: fc.args,
                })
                .collect();

            // Persist the assistant's intent before executing anything
            self.conversations
                .append_message(
                    conversation_id,
                    MessageRole::Assistant,
                    completion.content.as_deref().unwrap_or(""),
                    Some(&calls),
                    None,
                )
                .await?;

            let mut results = Vec::with_capacity(calls.len());
            for call in &calls {
                results.push(self.tools.execute(user_id, call).await);
            }

            self.conversations
                .append_message(conversation_id, MessageRole::Tool, "", None, Some(&results))
                .await?;

            if let Some(text) = completion.content.filter(|c| !c.is_empty()) {
                llm_messages.push(ChatMessage::assistant(text));
            }
            append_tool_results(llm_messages, &results);

            executed_calls.extend(calls);
        }

        warn!(
            max = MAX_TOOL_TURNS,
            "tool loop exhausted without a text response"
        );
        Ok((FALLBACK_RESPONSE.to_owned(), executed_calls))
    }

    /// Invoke the model under the configured timeout
    async fn invoke_model(
        &self,
        request: &ChatRequest,
        declarations: &[Tool],
    ) -> AppResult<crate::llm::ChatCompletion> {
        match tokio::time::timeout(
            self.model_timeout,
            self.model.complete_with_tools(request, Some(declarations)),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    timeout_secs = self.model_timeout.as_secs(),
                    provider = self.model.name(),
                    "model invocation timed out"
                );
                Err(AppError::model_timeout("Model response timed out"))
            }
        }
    }
}

/// Relay executed tool results to the model as user messages
fn append_tool_results(llm_messages: &mut Vec<ChatMessage>, results: &[ToolResult]) {
    for result in results {
        let payload = serde_json::to_string(&result.result).unwrap_or_else(|_| "{}".to_owned());
        llm_messages.push(ChatMessage::user(format!(
            "[Tool Result for {}]: {}",
            result.id, payload
        )));
    }
}

/// First-turn title: the user message, truncated to a display-friendly length
fn derive_title(first_message: &str) -> String {
    if first_message.chars().count() <= TITLE_MAX_CHARS {
        first_message.to_owned()
    } else {
        first_message.chars().take(TITLE_MAX_CHARS).collect()
    }
}
