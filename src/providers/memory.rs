//! In-memory vector store
//!
//! Implements the full search contract (cosine similarity, threshold,
//! metadata containment filtering, ranking, truncation) over a linear
//! scan. Backs tests and small local deployments.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::metadata::Metadata;
use crate::types::{EmbeddedRecord, SearchResult};

use super::vector_store::VectorStoreProvider;

struct StoredRecord {
    id: String,
    content: String,
    embedding: Vec<f32>,
    metadata: Metadata,
}

/// In-process vector store with a fixed vector width
pub struct MemoryVectorStore {
    dimensions: usize,
    records: RwLock<Vec<StoredRecord>>,
}

impl MemoryVectorStore {
    /// Create an empty store expecting vectors of the given width
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            records: RwLock::new(Vec::new()),
        }
    }
}

#[async_trait]
impl VectorStoreProvider for MemoryVectorStore {
    async fn insert(&self, record: &EmbeddedRecord) -> Result<String> {
        if record.embedding.len() != self.dimensions {
            return Err(Error::persistence(format!(
                "embedding width {} does not match store width {}",
                record.embedding.len(),
                self.dimensions
            )));
        }

        let id = Uuid::new_v4().to_string();
        self.records.write().push(StoredRecord {
            id: id.clone(),
            content: record.content.clone(),
            embedding: record.embedding.clone(),
            metadata: record.metadata.clone(),
        });
        Ok(id)
    }

    async fn delete_all(&self) -> Result<usize> {
        let mut records = self.records.write();
        let removed = records.len();
        records.clear();
        Ok(removed)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        match_count: usize,
        match_threshold: f32,
        metadata_filter: Option<&Metadata>,
    ) -> Result<Vec<SearchResult>> {
        if query_embedding.len() != self.dimensions {
            return Err(Error::persistence(format!(
                "query embedding width {} does not match store width {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let records = self.records.read();
        let mut results: Vec<SearchResult> = records
            .iter()
            .filter_map(|record| {
                let similarity = cosine_similarity(&record.embedding, query_embedding);
                if similarity <= match_threshold {
                    return None;
                }
                if let Some(filter) = metadata_filter {
                    if !record.metadata.matches(filter) {
                        return None;
                    }
                }
                Some(SearchResult {
                    id: record.id.clone(),
                    content: record.content.clone(),
                    metadata: record.metadata.clone(),
                    similarity,
                })
            })
            .collect();

        // Stable sort keeps insertion order for ties
        results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        results.truncate(match_count);

        Ok(results)
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.records.read().len())
    }

    fn name(&self) -> &str {
        "memory"
    }
}

/// Cosine similarity of two equal-length vectors; 0.0 when either is zero
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
