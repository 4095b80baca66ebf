//! OpenAI-compatible HTTP client with retry logic
//!
//! Implements both the embedding and chat provider traits against an
//! OpenAI-style API (`/embeddings`, `/chat/completions`).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::{ChatOutput, ChatProvider, ChatRequest};

/// Client for an OpenAI-compatible API with automatic retry
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    embed_model: String,
    chat_model: String,
    dimensions: usize,
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

impl OpenAiClient {
    /// Create a new client from LLM and embedding configuration
    pub fn new(llm: &LlmConfig, embedding: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            api_key: llm.api_key.trim().to_string(),
            embed_model: embedding.model.clone(),
            chat_model: llm.chat_model.clone(),
            dimensions: embedding.dimensions,
            max_retries: llm.max_retries,
        })
    }

    /// Retry an operation with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| Error::internal("retry loop exhausted")))
    }

    async fn post_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbeddingsRequest {
            model: &self.embed_model,
            input: inputs,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::embedding(format!("embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::embedding(format!(
                "embedding failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::embedding(format!("malformed embedding response: {}", e)))?;

        // The API may return rows out of order; the index field restores it
        let mut data = parsed.data;
        data.sort_by_key(|d| d.index);

        if data.len() != inputs.len() {
            return Err(Error::embedding(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                data.len()
            )));
        }

        Ok(data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        let mut embeddings = self.embed_batch(&input).await?;
        embeddings
            .pop()
            .ok_or_else(|| Error::embedding("empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.retry_request(|| async move { self.post_embeddings(texts).await })
            .await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatOutput> {
        let url = format!("{}/chat/completions", self.base_url);

        self.retry_request(|| {
            let url = url.clone();
            let request = request.clone();

            async move {
                let body = ChatCompletionRequest {
                    model: &self.chat_model,
                    messages: vec![
                        ChatMessage {
                            role: "system",
                            content: &request.system,
                        },
                        ChatMessage {
                            role: "user",
                            content: &request.user,
                        },
                    ],
                    temperature: request.temperature,
                    max_tokens: request.max_tokens,
                    response_format: request.json_output.then_some(ResponseFormat {
                        format_type: "json_object",
                    }),
                };

                let response = self
                    .client
                    .post(&url)
                    .bearer_auth(&self.api_key)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| Error::generation(format!("chat request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    return Err(Error::generation(format!(
                        "chat failed: HTTP {} - {}",
                        status, text
                    )));
                }

                let parsed: ChatCompletionResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::generation(format!("malformed chat response: {}", e)))?;

                let text = parsed
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .unwrap_or_default();

                if text.is_empty() {
                    return Err(Error::generation("model returned empty output"));
                }

                Ok(ChatOutput {
                    text,
                    tokens_used: parsed.usage.map(|u| u.total_tokens),
                })
            }
        })
        .await
    }

    fn model(&self) -> &str {
        &self.chat_model
    }

    fn name(&self) -> &str {
        "openai"
    }
}
