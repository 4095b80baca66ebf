//! Structured metadata extraction via the chat model
//!
//! One model call per document. Extraction failure degrades metadata to
//! the provenance fields plus an `extraction_error` marker; it never
//! aborts ingestion for the document.

use std::sync::Arc;

use crate::config::LlmConfig;
use crate::error::{Error, Result};
use crate::generation::prompt::extraction_system_prompt;
use crate::providers::{ChatProvider, ChatRequest};
use crate::types::{content_hash, Metadata, RawDocument};

/// Metadata extractor backed by a chat provider
pub struct MetadataExtractor {
    chat: Arc<dyn ChatProvider>,
    temperature: f32,
}

impl MetadataExtractor {
    /// Create an extractor using the configured extraction settings
    pub fn new(chat: Arc<dyn ChatProvider>, config: &LlmConfig) -> Self {
        Self {
            chat,
            temperature: config.extract_temperature,
        }
    }

    /// Extract structured metadata for a document.
    ///
    /// Always returns a mapping: extracted fields merged with provenance
    /// on success, provenance plus `extraction_error` on failure.
    pub async fn extract(&self, document: &RawDocument) -> Metadata {
        let mut metadata = self.provenance(document);

        match self.call_model(&document.content).await {
            Ok(extracted) => {
                let field_count = extracted.len();
                metadata.merge(extracted);
                tracing::info!(
                    filename = %document.filename,
                    fields = field_count,
                    "Extracted metadata"
                );
            }
            Err(e) => {
                tracing::warn!(
                    filename = %document.filename,
                    error = %e,
                    "Metadata extraction failed, continuing with provenance only"
                );
                metadata.insert("extraction_error", e.to_string());
            }
        }

        metadata
    }

    /// System-added provenance fields, present regardless of extraction
    /// outcome
    fn provenance(&self, document: &RawDocument) -> Metadata {
        let mut metadata = Metadata::new();
        metadata.insert("source_filename", document.filename.clone());
        metadata.insert("file_type", document.file_type());
        metadata.insert("extracted_at", chrono::Utc::now().to_rfc3339());
        metadata.insert("extraction_model", self.chat.model().to_string());
        metadata.insert("content_hash", content_hash(&document.content));
        metadata
    }

    async fn call_model(&self, content: &str) -> Result<Metadata> {
        let output = self
            .chat
            .chat(ChatRequest {
                system: extraction_system_prompt(),
                user: content.to_string(),
                temperature: self.temperature,
                max_tokens: 1000,
                json_output: true,
            })
            .await
            .map_err(|e| Error::extraction(e.to_string()))?;

        let json: serde_json::Value = serde_json::from_str(&output.text)
            .map_err(|e| Error::extraction(format!("unparseable extraction output: {}", e)))?;

        Metadata::from_json(&json)
            .ok_or_else(|| Error::extraction("extraction output was not a JSON object"))
    }
}
