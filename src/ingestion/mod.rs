//! Document ingestion: chunking, metadata extraction, and orchestration

pub mod chunker;
pub mod extractor;
pub mod pipeline;

pub use chunker::{chunk_text, Chunker};
pub use extractor::MetadataExtractor;
pub use pipeline::IngestionPipeline;
