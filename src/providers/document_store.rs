//! Document source trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::RawDocument;

/// Trait for enumerating the documents to ingest
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// List all documents. Non-file entries are skipped by
    /// implementations.
    async fn list_documents(&self) -> Result<Vec<RawDocument>>;

    /// Source name for logging
    fn name(&self) -> &str;
}
