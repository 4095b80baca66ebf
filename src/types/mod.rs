//! Core data types for the RAG pipeline

pub mod document;
pub mod metadata;
pub mod response;

pub use document::{content_hash, Chunk, EmbeddedRecord, RawDocument};
pub use metadata::{Metadata, MetadataValue};
pub use response::{
    AnswerContext, BasicAnswer, BasicAnswerContext, EnhancedAnswer, IngestReport,
    RetrievalResponse, SearchResult, SourceRef,
};
