//! Query-time and ingestion response types

use serde::{Deserialize, Serialize};

use super::metadata::Metadata;

/// A ranked match from the vector store. Derived at query time, never
/// persisted or mutated after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// Store-assigned record id
    pub id: String,
    /// Chunk content
    pub content: String,
    /// Record metadata
    pub metadata: Metadata,
    /// Similarity score (1 - cosine distance), higher is better
    pub similarity: f32,
}

/// Response from a retrieval query
#[derive(Debug, Clone)]
pub struct RetrievalResponse {
    /// Ranked results, strictly above the threshold, at most `match_count`
    pub results: Vec<SearchResult>,
    /// Embedding computed for the query text
    pub query_embedding: Vec<f32>,
    /// The match count the query was truncated to
    pub match_count: usize,
}

/// Aggregate result of an ingestion run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    /// Whether the pipeline ran to completion
    pub success: bool,
    /// Distinct filenames processed end to end
    pub files_processed: usize,
    /// Records buffered for insert (attempted, not necessarily all inserted)
    pub chunks_created: usize,
    /// Documents skipped due to chunking/embedding failures
    pub files_failed: usize,
    /// Per-record insert failures during the persist phase
    pub inserts_failed: usize,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
    /// Human-readable summary
    pub message: String,
}

/// Context attached to a basic (retrieval-passthrough) answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicAnswerContext {
    /// Similarity of the best match
    pub similarity: f32,
    /// Source filename of the best match
    pub source_filename: String,
    /// Metadata of the best match
    pub metadata: Metadata,
}

/// Basic answer: the single best match's content, verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasicAnswer {
    /// Best match content
    pub answer: String,
    /// Provenance of the answer
    pub context: BasicAnswerContext,
}

/// A cited source in an enhanced answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// 1-based sequence number, matching `[Source N]` citations
    pub number: usize,
    /// Source filename
    pub filename: String,
    /// Similarity score (0.0-1.0)
    pub similarity: f32,
    /// Similarity as a percentage string, e.g. "87.3%"
    pub similarity_pct: String,
    /// Content preview truncated to the configured character budget
    pub preview: String,
    /// Record metadata
    pub metadata: Metadata,
}

impl SourceRef {
    /// Build a source reference from a search result
    pub fn from_result(result: &SearchResult, number: usize, preview_chars: usize) -> Self {
        Self {
            number,
            filename: result
                .metadata
                .get("source_filename")
                .and_then(|v| v.as_text())
                .unwrap_or("unknown")
                .to_string(),
            similarity: result.similarity,
            similarity_pct: format!("{:.1}%", result.similarity * 100.0),
            preview: truncate_chars(&result.content, preview_chars),
            metadata: result.metadata.clone(),
        }
    }
}

/// Generation context attached to an enhanced answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerContext {
    /// Number of chunks retrieved for the answer
    pub retrieved_count: usize,
    /// Generation model identifier
    pub model: String,
    /// Token usage, when the model reports it
    pub tokens_used: Option<u32>,
}

/// Enhanced answer: model-generated text grounded in retrieved chunks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnhancedAnswer {
    /// Generated answer, or the canned not-found text
    pub answer: String,
    /// One entry per retrieved record, in ranked order
    pub sources: Vec<SourceRef>,
    /// Generation context
    pub context: AnswerContext,
}

impl EnhancedAnswer {
    /// Soft-fail answer for a question with no matching context.
    /// Explicitly not an error.
    pub fn not_found(model: impl Into<String>) -> Self {
        Self {
            answer: "I could not find relevant information in the knowledge base \
                     to answer your question."
                .to_string(),
            sources: Vec::new(),
            context: AnswerContext {
                retrieved_count: 0,
                model: model.into(),
                tokens_used: None,
            },
        }
    }
}

/// Truncate to at most `max_chars` characters, appending an ellipsis when
/// anything was cut. Always splits on a character boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &text[..byte_idx]),
        None => text.to_string(),
    }
}
