//! Chat provider trait for generation and extraction calls

use async_trait::async_trait;

use crate::error::Result;

/// A single chat invocation
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// System instruction
    pub system: String,
    /// User message
    pub user: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Output token budget
    pub max_tokens: u32,
    /// Request machine-parseable JSON output (structured extraction)
    pub json_output: bool,
}

/// Output of a chat invocation
#[derive(Debug, Clone)]
pub struct ChatOutput {
    /// Generated text
    pub text: String,
    /// Total token usage, when the backend reports it
    pub tokens_used: Option<u32>,
}

/// Trait for chat-completion backends
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Run a chat completion
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutput>;

    /// Model identifier for logging and answer context
    fn model(&self) -> &str;

    /// Provider name for logging
    fn name(&self) -> &str;
}
