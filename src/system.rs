//! Top-level wiring of providers into a ready-to-use pipeline

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::AnswerEngine;
use crate::ingestion::{IngestionPipeline, MetadataExtractor};
use crate::providers::{
    ChatProvider, DocumentSource, EmbeddingProvider, FsDocumentSource, MemoryVectorStore,
    OpenAiClient, VectorStoreProvider,
};
use crate::retrieval::{RetrieveOptions, Retriever};
use crate::types::{BasicAnswer, EnhancedAnswer, IngestReport, RetrievalResponse};

/// A fully wired RAG system: ingestion pipeline, retriever, and answer
/// engine sharing one set of providers
pub struct RagSystem {
    config: RagConfig,
    pipeline: IngestionPipeline,
    retriever: Retriever,
    engine: AnswerEngine,
}

impl RagSystem {
    /// Wire the default deployment: filesystem documents, an
    /// OpenAI-compatible API for embeddings and chat, and the in-memory
    /// vector store.
    pub fn new(config: RagConfig) -> Result<Self> {
        let client = Arc::new(OpenAiClient::new(&config.llm, &config.embedding)?);
        let store = Arc::new(MemoryVectorStore::new(config.embedding.dimensions));
        let documents = Arc::new(FsDocumentSource::new(config.documents.dir.clone()));

        Self::with_providers(config, documents, client.clone(), client, store)
    }

    /// Wire the system from explicit providers
    pub fn with_providers(
        config: RagConfig,
        documents: Arc<dyn DocumentSource>,
        embedder: Arc<dyn EmbeddingProvider>,
        chat: Arc<dyn ChatProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        tracing::info!(
            embedder = embedder.name(),
            chat = chat.name(),
            store = store.name(),
            documents = documents.name(),
            dimensions = embedder.dimensions(),
            "Initializing RAG system"
        );

        let extractor = MetadataExtractor::new(Arc::clone(&chat), &config.llm);
        let pipeline = IngestionPipeline::new(
            &config,
            documents,
            extractor,
            Arc::clone(&embedder),
            Arc::clone(&store),
        )?;
        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&store));
        let engine = AnswerEngine::new(Retriever::new(embedder, store), chat, &config);

        Ok(Self {
            config,
            pipeline,
            retriever,
            engine,
        })
    }

    /// Run an ingestion pass
    pub async fn ingest(&self, clear_first: bool) -> Result<IngestReport> {
        self.pipeline.run(clear_first).await
    }

    /// Retrieve ranked matches with the configured defaults
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalResponse> {
        self.retriever
            .retrieve(query, RetrieveOptions::from_config(&self.config.retrieval))
            .await
    }

    /// Basic answer: best match content, verbatim
    pub async fn answer(&self, question: &str) -> Result<BasicAnswer> {
        self.engine.answer(question).await
    }

    /// Enhanced answer: grounded generation with cited sources
    pub async fn enhanced_answer(&self, question: &str) -> Result<EnhancedAnswer> {
        self.engine
            .enhanced_answer(
                question,
                RetrieveOptions::from_config(&self.config.retrieval),
            )
            .await
    }

    /// Direct access to the retriever for filtered lookups
    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{ChatOutput, ChatRequest};
    use async_trait::async_trait;

    /// Embedder hashing words onto a small fixed basis, so related texts
    /// land near each other deterministically
    struct HashEmbedder;

    #[async_trait]
    impl EmbeddingProvider for HashEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let mut v = vec![0.01f32; 4];
            for word in text.split_whitespace() {
                let bucket = word.len() % 4;
                v[bucket] += 1.0;
            }
            Ok(v)
        }

        fn dimensions(&self) -> usize {
            4
        }

        fn name(&self) -> &str {
            "hash"
        }
    }

    struct ScriptedChat;

    #[async_trait]
    impl ChatProvider for ScriptedChat {
        async fn chat(&self, request: ChatRequest) -> Result<ChatOutput> {
            let text = if request.json_output {
                r#"{"name": "Ada Lovelace", "role": "mathematician"}"#.to_string()
            } else {
                "Ada Lovelace was a mathematician [Source 1].".to_string()
            };
            Ok(ChatOutput {
                text,
                tokens_used: Some(50),
            })
        }

        fn model(&self) -> &str {
            "scripted-model"
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[tokio::test]
    async fn ingest_then_query_end_to_end() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("ada.txt"),
            "Ada Lovelace wrote the first published computer program",
        )
        .unwrap();

        let mut config = RagConfig::default();
        config.documents.dir = dir.path().to_path_buf();
        config.embedding.dimensions = 4;

        let embedder = Arc::new(HashEmbedder);
        let chat = Arc::new(ScriptedChat);
        let store = Arc::new(MemoryVectorStore::new(4));
        let documents = Arc::new(FsDocumentSource::new(dir.path()));

        let system =
            RagSystem::with_providers(config, documents, embedder, chat, store).unwrap();

        let report = system.ingest(true).await.unwrap();
        assert!(report.success);
        assert_eq!(report.files_processed, 1);
        assert_eq!(report.chunks_created, 1);

        let retrieval = system.retrieve("first computer program").await.unwrap();
        assert!(!retrieval.results.is_empty());

        let answer = system.enhanced_answer("Who was Ada Lovelace?").await.unwrap();
        assert_eq!(answer.sources.len(), retrieval.results.len().min(5));
        assert!(answer.answer.contains("[Source 1]"));
        assert_eq!(answer.context.model, "scripted-model");

        // Metadata extracted from the scripted chat is searchable
        let by_name = system
            .retriever()
            .retrieve_by_name("Ada Lovelace", 5)
            .await
            .unwrap();
        assert_eq!(by_name.results.len(), 1);
    }
}
