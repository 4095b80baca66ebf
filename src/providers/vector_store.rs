//! Vector store provider trait

use async_trait::async_trait;

use crate::error::Result;
use crate::types::metadata::Metadata;
use crate::types::{EmbeddedRecord, SearchResult};

/// Trait for vector persistence and similarity search
///
/// The ranking/threshold/filter logic lives behind this seam; the core
/// pipeline never does vector math itself.
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert a record, returning the store-assigned id.
    ///
    /// Per-record failures are non-fatal to a batch; the caller decides
    /// whether to continue.
    async fn insert(&self, record: &EmbeddedRecord) -> Result<String>;

    /// Delete all records, returning how many were removed.
    /// All-or-nothing from the caller's perspective.
    async fn delete_all(&self) -> Result<usize>;

    /// Similarity search: candidates with
    /// `similarity = 1 - cosine_distance > match_threshold` whose metadata
    /// contains every pair of `metadata_filter`, ordered by similarity
    /// descending (insertion-order ties), truncated to `match_count`.
    async fn search(
        &self,
        query_embedding: &[f32],
        match_count: usize,
        match_threshold: f32,
        metadata_filter: Option<&Metadata>,
    ) -> Result<Vec<SearchResult>>;

    /// Number of stored records
    async fn len(&self) -> Result<usize>;

    /// Whether the store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Provider name for logging
    fn name(&self) -> &str;
}
