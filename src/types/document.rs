//! Document and chunk types

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::metadata::Metadata;

/// A raw document as read from the document source.
///
/// Immutable; discarded once its chunks have been embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// Filename (no directory component)
    pub filename: String,
    /// Full text content
    pub content: String,
}

impl RawDocument {
    /// Create a new raw document
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// File extension in lowercase, or "unknown"
    pub fn file_type(&self) -> String {
        self.filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

/// A word-window slice of a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text, words joined with single spaces
    pub content: String,
    /// Zero-based position within the document
    pub index: u32,
    /// Total chunks produced from the document
    pub total_chunks: u32,
}

/// A chunk paired with its embedding and metadata, buffered during an
/// ingestion run. The store assigns the record id on insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedRecord {
    /// Source filename
    pub filename: String,
    /// Chunk content
    pub content: String,
    /// Embedding vector; its width must match the store's vector column
    pub embedding: Vec<f32>,
    /// Document-level metadata merged with chunk-position fields
    pub metadata: Metadata,
    /// Creation timestamp
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl EmbeddedRecord {
    /// Create a new record stamped with the current time
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<String>,
        embedding: Vec<f32>,
        metadata: Metadata,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            embedding,
            metadata,
            created_at: chrono::Utc::now(),
        }
    }
}

/// Hex-encoded SHA-256 of a document's content, recorded in provenance
/// metadata for auditing
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_from_extension() {
        assert_eq!(RawDocument::new("resume.txt", "").file_type(), "txt");
        assert_eq!(RawDocument::new("notes.MD", "").file_type(), "md");
        assert_eq!(RawDocument::new("README", "").file_type(), "unknown");
    }

    #[test]
    fn content_hash_is_stable() {
        assert_eq!(content_hash("abc"), content_hash("abc"));
        assert_ne!(content_hash("abc"), content_hash("abd"));
        assert_eq!(content_hash("abc").len(), 64);
    }
}
