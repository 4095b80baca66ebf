//! Collaborator abstractions for embeddings, chat, vector storage, and
//! document listing
//!
//! The pipeline consumes each external service through a narrow trait so
//! backends can be swapped without touching the core logic.

pub mod document_store;
pub mod embedding;
pub mod fs;
pub mod llm;
pub mod memory;
pub mod openai;
pub mod vector_store;

pub use document_store::DocumentSource;
pub use embedding::EmbeddingProvider;
pub use fs::FsDocumentSource;
pub use llm::{ChatOutput, ChatProvider, ChatRequest};
pub use memory::MemoryVectorStore;
pub use openai::OpenAiClient;
pub use vector_store::VectorStoreProvider;
