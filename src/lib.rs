//! persona-rag: metadata-aware retrieval-augmented generation pipeline
//!
//! Ingests text documents into a vector store (word-window chunking,
//! LLM-based metadata extraction, embedding) and answers natural-language
//! questions by combining similarity search with grounded, cited answer
//! generation.
//!
//! External services (embedding, chat, vector search, document listing)
//! are consumed through the traits in [`providers`]; in-process
//! implementations back tests and local deployments.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod system;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::AnswerEngine;
pub use ingestion::{IngestionPipeline, MetadataExtractor};
pub use retrieval::{RetrieveOptions, Retriever};
pub use system::RagSystem;
pub use types::{
    BasicAnswer, Chunk, EmbeddedRecord, EnhancedAnswer, IngestReport, Metadata, MetadataValue,
    RawDocument, RetrievalResponse, SearchResult,
};
