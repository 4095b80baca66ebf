//! Ingestion orchestration
//!
//! Sequences a run: optional clear, read documents, per document extract
//! metadata once, chunk, embed each chunk, then persist the buffered
//! records. Per-document and per-record failures are logged and counted
//! without aborting the run.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, TryStreamExt};
use tokio::sync::Mutex;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::{DocumentSource, EmbeddingProvider, VectorStoreProvider};
use crate::types::{Chunk, EmbeddedRecord, IngestReport, Metadata, RawDocument};

use super::chunker::Chunker;
use super::extractor::MetadataExtractor;

/// Ingestion pipeline over the collaborator providers
pub struct IngestionPipeline {
    documents: Arc<dyn DocumentSource>,
    extractor: MetadataExtractor,
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    max_concurrency: usize,
    /// Serializes runs; a second caller gets `Error::IngestionBusy`.
    /// The guard lives across awaits, so this must be an async mutex.
    run_lock: Mutex<()>,
}

impl IngestionPipeline {
    /// Create a pipeline from configuration and providers
    pub fn new(
        config: &RagConfig,
        documents: Arc<dyn DocumentSource>,
        extractor: MetadataExtractor,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        Ok(Self {
            documents,
            extractor,
            chunker: Chunker::from_config(&config.chunking)?,
            embedder,
            store,
            max_concurrency: config.embedding.max_concurrency.max(1),
            run_lock: Mutex::new(()),
        })
    }

    /// Run a full ingestion pass.
    ///
    /// With `clear_first`, all persisted records are deleted before
    /// processing; a failure there is fatal for the run. Concurrent runs
    /// are rejected.
    pub async fn run(&self, clear_first: bool) -> Result<IngestReport> {
        let _guard = self.run_lock.try_lock().map_err(|_| Error::IngestionBusy)?;
        let started = Instant::now();

        tracing::info!(clear_first, "Starting ingestion run");

        if clear_first {
            let removed = self.store.delete_all().await?;
            tracing::info!(removed, "Cleared vector store");
        }

        let documents = self.documents.list_documents().await?;
        tracing::info!(count = documents.len(), "Read documents");

        // Per-run accumulator; no state survives between runs
        let mut buffer: Vec<EmbeddedRecord> = Vec::new();
        let mut files_processed = 0usize;
        let mut files_failed = 0usize;

        for document in &documents {
            match self.process_document(document).await {
                Ok(records) => {
                    tracing::info!(
                        filename = %document.filename,
                        chunks = records.len(),
                        "Processed document"
                    );
                    buffer.extend(records);
                    files_processed += 1;
                }
                Err(e) => {
                    tracing::error!(
                        filename = %document.filename,
                        error = %e,
                        "Skipping document"
                    );
                    files_failed += 1;
                }
            }
        }

        let chunks_created = buffer.len();
        let mut inserts_failed = 0usize;

        for record in &buffer {
            if let Err(e) = self.store.insert(record).await {
                tracing::error!(
                    filename = %record.filename,
                    error = %e,
                    "Insert failed"
                );
                inserts_failed += 1;
            }
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        let message = format!(
            "Ingested {} chunks from {} files in {}ms",
            chunks_created, files_processed, duration_ms
        );
        tracing::info!(
            files_processed,
            chunks_created,
            files_failed,
            inserts_failed,
            "Ingestion run complete"
        );

        Ok(IngestReport {
            success: true,
            files_processed,
            chunks_created,
            files_failed,
            inserts_failed,
            duration_ms,
            message,
        })
    }

    /// Process one document: extract metadata once, chunk, embed every
    /// chunk with bounded concurrency. Any chunking or embedding failure
    /// fails the whole document; siblings are unaffected.
    async fn process_document(&self, document: &RawDocument) -> Result<Vec<EmbeddedRecord>> {
        let doc_metadata = self.extractor.extract(document).await;
        let chunks = self.chunker.chunk(&document.content);

        let records: Vec<EmbeddedRecord> = stream::iter(chunks.into_iter().map(Ok::<_, Error>))
            .map_ok(|chunk| self.embed_chunk(document, &doc_metadata, chunk))
            .try_buffered(self.max_concurrency)
            .try_collect()
            .await?;

        Ok(records)
    }

    async fn embed_chunk(
        &self,
        document: &RawDocument,
        doc_metadata: &Metadata,
        chunk: Chunk,
    ) -> Result<EmbeddedRecord> {
        let embedding = self.embedder.embed(&chunk.content).await?;

        let mut metadata = doc_metadata.clone();
        metadata.insert("chunk_index", chunk.index as i64);
        metadata.insert("chunk_number", chunk.index as i64 + 1);
        metadata.insert("total_chunks", chunk.total_chunks as i64);
        metadata.insert("chunk_size_chars", chunk.content.chars().count() as i64);
        metadata.insert(
            "chunk_size_words",
            chunk.content.split_whitespace().count() as i64,
        );

        Ok(EmbeddedRecord::new(
            document.filename.clone(),
            chunk.content,
            embedding,
            metadata,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatOutput, ChatProvider, ChatRequest, MemoryVectorStore};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticDocs(Vec<RawDocument>);

    #[async_trait]
    impl DocumentSource for StaticDocs {
        async fn list_documents(&self) -> Result<Vec<RawDocument>> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "static"
        }
    }

    struct JsonChat;

    #[async_trait]
    impl ChatProvider for JsonChat {
        async fn chat(&self, _request: ChatRequest) -> Result<ChatOutput> {
            Ok(ChatOutput {
                text: r#"{"name": "Ada"}"#.to_string(),
                tokens_used: None,
            })
        }

        fn model(&self) -> &str {
            "test-model"
        }

        fn name(&self) -> &str {
            "json"
        }
    }

    /// Embedder that fails on request for specific content
    struct FlakyEmbedder {
        fail_on: Option<String>,
        calls: AtomicUsize,
    }

    impl FlakyEmbedder {
        fn reliable() -> Self {
            Self {
                fail_on: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing_on(needle: &str) -> Self {
            Self {
                fail_on: Some(needle.to_string()),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(needle) = &self.fail_on {
                if text.contains(needle) {
                    return Err(Error::embedding("quota exceeded"));
                }
            }
            Ok(vec![1.0, 0.0])
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    fn pipeline(
        docs: Vec<RawDocument>,
        embedder: Arc<FlakyEmbedder>,
        store: Arc<MemoryVectorStore>,
    ) -> IngestionPipeline {
        let config = RagConfig {
            embedding: crate::config::EmbeddingConfig {
                dimensions: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        let chat = Arc::new(JsonChat);
        IngestionPipeline::new(
            &config,
            Arc::new(StaticDocs(docs)),
            MetadataExtractor::new(chat, &config.llm),
            embedder,
            store,
        )
        .unwrap()
    }

    fn long_document(filename: &str, words: usize) -> RawDocument {
        let content = (1..=words)
            .map(|i| format!("w{}", i))
            .collect::<Vec<_>>()
            .join(" ");
        RawDocument::new(filename, content)
    }

    #[tokio::test]
    async fn empty_directory_reports_zero_counts_and_success() {
        let store = Arc::new(MemoryVectorStore::new(2));
        let p = pipeline(vec![], Arc::new(FlakyEmbedder::reliable()), store);

        let report = p.run(true).await.unwrap();
        assert!(report.success);
        assert_eq!(report.files_processed, 0);
        assert_eq!(report.chunks_created, 0);
        assert_eq!(report.files_failed, 0);
    }

    #[tokio::test]
    async fn ingests_documents_and_persists_every_chunk() {
        let store = Arc::new(MemoryVectorStore::new(2));
        let docs = vec![
            long_document("a.txt", 310),
            RawDocument::new("b.txt", "short document"),
        ];
        let p = pipeline(docs, Arc::new(FlakyEmbedder::reliable()), Arc::clone(&store));

        let report = p.run(false).await.unwrap();
        assert!(report.success);
        assert_eq!(report.files_processed, 2);
        // 310 words at 300/50 -> 2 chunks, plus 1 for the short file
        assert_eq!(report.chunks_created, 3);
        assert_eq!(report.inserts_failed, 0);
        assert_eq!(store.len().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn chunk_metadata_carries_document_and_position_fields() {
        let store = Arc::new(MemoryVectorStore::new(2));
        let p = pipeline(
            vec![long_document("a.txt", 310)],
            Arc::new(FlakyEmbedder::reliable()),
            Arc::clone(&store),
        );
        p.run(false).await.unwrap();

        let results = store.search(&[1.0, 0.0], 10, 0.0, None).await.unwrap();
        assert_eq!(results.len(), 2);
        for result in &results {
            // Document-level fields identical across chunks
            assert_eq!(
                result.metadata.get("name").and_then(|v| v.as_text()),
                Some("Ada")
            );
            assert_eq!(
                result.metadata.get("source_filename").and_then(|v| v.as_text()),
                Some("a.txt")
            );
            assert_eq!(
                result.metadata.get("total_chunks").and_then(|v| v.as_integer()),
                Some(2)
            );
            assert!(result.metadata.contains_key("chunk_size_words"));
        }
        // Chunk-level fields unique per chunk
        let mut indices: Vec<i64> = results
            .iter()
            .filter_map(|r| r.metadata.get("chunk_index").and_then(|v| v.as_integer()))
            .collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1]);
    }

    #[tokio::test]
    async fn embedding_failure_skips_only_that_document() {
        let store = Arc::new(MemoryVectorStore::new(2));
        let docs = vec![
            RawDocument::new("bad.txt", "poison document"),
            RawDocument::new("good.txt", "healthy document"),
        ];
        let p = pipeline(
            docs,
            Arc::new(FlakyEmbedder::failing_on("poison")),
            Arc::clone(&store),
        );

        let report = p.run(false).await.unwrap();
        assert!(report.success);
        assert_eq!(report.files_processed, 1);
        assert_eq!(report.files_failed, 1);
        assert_eq!(report.chunks_created, 1);
        assert_eq!(store.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clear_first_empties_the_store_before_processing() {
        let store = Arc::new(MemoryVectorStore::new(2));
        let p1 = pipeline(
            vec![RawDocument::new("old.txt", "old content")],
            Arc::new(FlakyEmbedder::reliable()),
            Arc::clone(&store),
        );
        p1.run(false).await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);

        let p2 = pipeline(
            vec![RawDocument::new("new.txt", "new content")],
            Arc::new(FlakyEmbedder::reliable()),
            Arc::clone(&store),
        );
        p2.run(true).await.unwrap();

        let results = store.search(&[1.0, 0.0], 10, 0.0, None).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(
            results[0].metadata.get("source_filename").and_then(|v| v.as_text()),
            Some("new.txt")
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn run_can_be_spawned_onto_the_runtime() {
        let store = Arc::new(MemoryVectorStore::new(2));
        let p = Arc::new(pipeline(
            vec![RawDocument::new("a.txt", "short document")],
            Arc::new(FlakyEmbedder::reliable()),
            store,
        ));

        let handle = tokio::spawn({
            let p = Arc::clone(&p);
            async move { p.run(false).await }
        });
        let report = handle.await.unwrap().unwrap();
        assert!(report.success);
        assert_eq!(report.chunks_created, 1);
    }

    #[test]
    fn second_concurrent_run_is_rejected() {
        let store = Arc::new(MemoryVectorStore::new(2));
        let p = pipeline(vec![], Arc::new(FlakyEmbedder::reliable()), store);

        let _guard = p.run_lock.try_lock().expect("lock free");
        let err = tokio_test::block_on(p.run(false)).unwrap_err();
        assert!(matches!(err, Error::IngestionBusy));
    }
}
