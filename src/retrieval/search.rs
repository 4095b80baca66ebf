//! Query-time retrieval over the vector store

use std::sync::Arc;

use crate::config::RetrievalConfig;
use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::{Metadata, RetrievalResponse};

/// Options for a retrieval query
#[derive(Debug, Clone)]
pub struct RetrieveOptions {
    /// Maximum number of results
    pub match_count: usize,
    /// Minimum similarity a candidate must exceed
    pub match_threshold: f32,
    /// Optional metadata containment filter
    pub metadata_filter: Option<Metadata>,
}

impl Default for RetrieveOptions {
    fn default() -> Self {
        Self {
            match_count: 5,
            match_threshold: 0.1,
            metadata_filter: None,
        }
    }
}

impl RetrieveOptions {
    /// Options from the retrieval configuration
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            match_count: config.match_count,
            match_threshold: config.match_threshold,
            metadata_filter: None,
        }
    }

    /// Set the match count
    pub fn with_match_count(mut self, count: usize) -> Self {
        self.match_count = count;
        self
    }

    /// Set the similarity threshold
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.match_threshold = threshold;
        self
    }

    /// Set a metadata filter
    pub fn with_filter(mut self, filter: Metadata) -> Self {
        self.metadata_filter = Some(filter);
        self
    }
}

/// Retriever: embeds a query and delegates ranked similarity search to
/// the vector store
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl Retriever {
    /// Create a retriever over the given providers
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, store: Arc<dyn VectorStoreProvider>) -> Self {
        Self { embedder, store }
    }

    /// Retrieve ranked matches for a query.
    ///
    /// An empty result list is a normal outcome, not an error. An empty
    /// or whitespace query is rejected before any collaborator call.
    pub async fn retrieve(&self, query: &str, opts: RetrieveOptions) -> Result<RetrievalResponse> {
        if query.trim().is_empty() {
            return Err(Error::validation("query must not be empty"));
        }

        let query_embedding = self.embedder.embed(query).await?;

        let results = self
            .store
            .search(
                &query_embedding,
                opts.match_count,
                opts.match_threshold,
                opts.metadata_filter.as_ref(),
            )
            .await?;

        tracing::debug!(
            matches = results.len(),
            threshold = opts.match_threshold,
            "Similarity search complete"
        );

        Ok(RetrievalResponse {
            results,
            query_embedding,
            match_count: opts.match_count,
        })
    }

    /// Retrieve by a single metadata field, accepting any similarity.
    ///
    /// Relevance filtering is intentionally disabled (threshold 0.0) in
    /// favor of pure metadata filtering.
    pub async fn retrieve_by_field(
        &self,
        query: &str,
        field: &str,
        value: &str,
        match_count: usize,
    ) -> Result<RetrievalResponse> {
        self.retrieve(
            query,
            RetrieveOptions::default()
                .with_match_count(match_count)
                .with_threshold(0.0)
                .with_filter(Metadata::single(field, value)),
        )
        .await
    }

    /// Retrieve all chunks attributed to a person by name
    pub async fn retrieve_by_name(&self, name: &str, match_count: usize) -> Result<RetrievalResponse> {
        self.retrieve_by_field(name, "name", name, match_count).await
    }
}
