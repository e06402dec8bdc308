// src/llm/provider.rs
// Completion client abstraction: messages in, raw text out

use super::Message;
use crate::enrich::{CallSettings, Operation};
use anyhow::{Result, bail};
use async_trait::async_trait;

/// One chat-completion call as the enrichment pipeline issues it
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Which enrichment operation issued the call (for logs and test doubles)
    pub operation: Operation,
    pub messages: Vec<Message>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Build a request using the operation's fixed sampling settings
    pub fn for_operation(
        operation: Operation,
        model: impl Into<String>,
        messages: Vec<Message>,
    ) -> Self {
        let CallSettings {
            temperature,
            max_tokens,
        } = operation.call_settings();
        Self {
            operation,
            messages,
            model: model.into(),
            temperature,
            max_tokens,
        }
    }

    /// Content of the last user message, if any
    pub fn last_user_content(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
    }
}

/// Trait for completion clients.
///
/// Implementations are stateless per call and safe to invoke concurrently.
/// Any failure (transport, HTTP status, empty answer) is reported as an
/// opaque error; callers do not distinguish kinds.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Run one completion and return the raw answer text
    async fn complete(&self, request: CompletionRequest) -> Result<String>;

    /// Client name for logging
    fn name(&self) -> &'static str;
}

/// Client used when no API key is configured: every call fails upstream
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledClient;

#[async_trait]
impl CompletionClient for DisabledClient {
    async fn complete(&self, request: CompletionRequest) -> Result<String> {
        bail!("no API key configured for {}", request.operation)
    }

    fn name(&self) -> &'static str {
        "Disabled"
    }
}
