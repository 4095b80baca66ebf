//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main RAG pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RagConfig {
    /// Document source configuration
    pub documents: DocumentsConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    pub embedding: EmbeddingConfig,
    /// Chat/LLM configuration
    pub llm: LlmConfig,
    /// Retrieval configuration
    pub retrieval: RetrievalConfig,
}

/// Document source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Directory holding the documents to ingest
    pub dir: PathBuf,
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("documents"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Window size in words
    pub chunk_size: usize,
    /// Overlap between consecutive chunks in words (must stay below chunk_size)
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 300,
            chunk_overlap: 50,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Output vector width; the store's vector column must match exactly
    pub dimensions: usize,
    /// Bounded concurrency for per-chunk embedding during ingestion
    pub max_concurrency: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            max_concurrency: 4,
        }
    }
}

/// Chat/LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// API key (bearer token)
    pub api_key: String,
    /// Model used for metadata extraction and answer generation
    pub chat_model: String,
    /// Near-deterministic temperature for extraction stability
    pub extract_temperature: f32,
    /// Moderate temperature favoring factual consistency for answers
    pub answer_temperature: f32,
    /// Output token budget for generated answers
    pub max_answer_tokens: u32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for transient failures
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            chat_model: "gpt-4o-mini".to_string(),
            extract_temperature: 0.1,
            answer_temperature: 0.3,
            max_answer_tokens: 1000,
            timeout_secs: 60,
            max_retries: 3,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Default number of results to return
    pub match_count: usize,
    /// Minimum similarity a candidate must exceed
    pub match_threshold: f32,
    /// Character budget for content previews in citations
    pub preview_chars: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            match_count: 5,
            match_threshold: 0.1,
            preview_chars: 200,
        }
    }
}
