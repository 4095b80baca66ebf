//! Error types for the RAG pipeline

use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input rejected before any collaborator call
    #[error("Validation error: {0}")]
    Validation(String),

    /// Embedding generation failed
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Chat/generation model failed
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Vector store insert/delete/search failure
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Metadata extraction model failure (recovered locally with degraded metadata)
    #[error("Metadata extraction failed: {0}")]
    Extraction(String),

    /// No stored content cleared the similarity threshold
    #[error("No relevant information found for: {0}")]
    NoMatch(String),

    /// A second ingestion run was attempted while one is active
    #[error("An ingestion run is already in progress")]
    IngestionBusy,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a generation error
    pub fn generation(message: impl Into<String>) -> Self {
        Self::Generation(message.into())
    }

    /// Create a persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence(message.into())
    }

    /// Create an extraction error
    pub fn extraction(message: impl Into<String>) -> Self {
        Self::Extraction(message.into())
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Whether this error came from a transient collaborator failure
    /// and is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Embedding(_) | Self::Generation(_) | Self::Http(_))
    }
}
