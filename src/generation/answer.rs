//! Answer synthesis over retrieved chunks
//!
//! Two modes: a basic retrieval passthrough returning the best match
//! verbatim, and an enhanced mode that grounds a generation model in the
//! retrieved context and cites sources.

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::{Error, Result};
use crate::providers::{ChatProvider, ChatRequest};
use crate::retrieval::{RetrieveOptions, Retriever};
use crate::types::{
    AnswerContext, BasicAnswer, BasicAnswerContext, EnhancedAnswer, SourceRef,
};

use super::prompt::{build_context_block, build_user_prompt, grounding_system_prompt};

/// Answer engine combining the retriever with a chat provider
pub struct AnswerEngine {
    retriever: Retriever,
    chat: Arc<dyn ChatProvider>,
    answer_temperature: f32,
    max_answer_tokens: u32,
    preview_chars: usize,
}

impl AnswerEngine {
    /// Create an engine using the configured generation settings
    pub fn new(retriever: Retriever, chat: Arc<dyn ChatProvider>, config: &RagConfig) -> Self {
        Self {
            retriever,
            chat,
            answer_temperature: config.llm.answer_temperature,
            max_answer_tokens: config.llm.max_answer_tokens,
            preview_chars: config.retrieval.preview_chars,
        }
    }

    /// Basic answer: the single best match's content, verbatim.
    ///
    /// Retrieves top-3 at threshold 0.1; no generation model involved.
    /// An empty result set is an error in this mode.
    pub async fn answer(&self, question: &str) -> Result<BasicAnswer> {
        let response = self
            .retriever
            .retrieve(
                question,
                RetrieveOptions::default()
                    .with_match_count(3)
                    .with_threshold(0.1),
            )
            .await?;

        let best = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::NoMatch(question.to_string()))?;

        let source_filename = best
            .metadata
            .get("source_filename")
            .and_then(|v| v.as_text())
            .unwrap_or("unknown")
            .to_string();

        Ok(BasicAnswer {
            answer: best.content,
            context: BasicAnswerContext {
                similarity: best.similarity,
                source_filename,
                metadata: best.metadata,
            },
        })
    }

    /// Enhanced answer: a grounded, cited generation over the retrieved
    /// context.
    ///
    /// An empty result set is a soft fail, not an error: the canned
    /// not-found answer is returned with zero sources.
    pub async fn enhanced_answer(
        &self,
        question: &str,
        opts: RetrieveOptions,
    ) -> Result<EnhancedAnswer> {
        let response = self.retriever.retrieve(question, opts).await?;

        if response.results.is_empty() {
            tracing::info!(question, "No context cleared the threshold");
            return Ok(EnhancedAnswer::not_found(self.chat.model()));
        }

        let context_block = build_context_block(&response.results);

        let output = self
            .chat
            .chat(ChatRequest {
                system: grounding_system_prompt(),
                user: build_user_prompt(&context_block, question),
                temperature: self.answer_temperature,
                max_tokens: self.max_answer_tokens,
                json_output: false,
            })
            .await?;

        if output.text.trim().is_empty() {
            return Err(Error::generation("model returned empty answer"));
        }

        let sources: Vec<SourceRef> = response
            .results
            .iter()
            .enumerate()
            .map(|(i, result)| SourceRef::from_result(result, i + 1, self.preview_chars))
            .collect();

        tracing::info!(
            sources = sources.len(),
            tokens = ?output.tokens_used,
            "Generated enhanced answer"
        );

        Ok(EnhancedAnswer {
            answer: output.text,
            context: AnswerContext {
                retrieved_count: sources.len(),
                model: self.chat.model().to_string(),
                tokens_used: output.tokens_used,
            },
            sources,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{
        ChatOutput, EmbeddingProvider, MemoryVectorStore, VectorStoreProvider,
    };
    use crate::types::{EmbeddedRecord, Metadata};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AxisEmbedder;

    #[async_trait]
    impl EmbeddingProvider for AxisEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(if text.contains("rust") {
                vec![1.0, 0.0]
            } else {
                vec![0.0, 1.0]
            })
        }

        fn dimensions(&self) -> usize {
            2
        }

        fn name(&self) -> &str {
            "axis"
        }
    }

    struct CountingChat {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingChat {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl ChatProvider for CountingChat {
        async fn chat(&self, request: ChatRequest) -> Result<ChatOutput> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(Error::generation("model down"));
            }
            assert!(request.user.contains("[Source 1:"));
            Ok(ChatOutput {
                text: "Rust is used for systems work [Source 1].".to_string(),
                tokens_used: Some(87),
            })
        }

        fn model(&self) -> &str {
            "test-model"
        }

        fn name(&self) -> &str {
            "counting"
        }
    }

    async fn engine_with(chat: Arc<CountingChat>, populate: bool) -> AnswerEngine {
        let store = Arc::new(MemoryVectorStore::new(2));
        if populate {
            let mut metadata = Metadata::single("source_filename", "rust.txt");
            metadata.insert("chunk_number", 1i64);
            metadata.insert("total_chunks", 1i64);
            store
                .insert(&EmbeddedRecord::new(
                    "rust.txt",
                    "rust systems programming notes",
                    vec![0.95, 0.05],
                    metadata,
                ))
                .await
                .unwrap();
        }

        let retriever = Retriever::new(Arc::new(AxisEmbedder), store);
        AnswerEngine::new(retriever, chat, &RagConfig::default())
    }

    #[tokio::test]
    async fn basic_answer_is_best_match_verbatim() {
        let chat = Arc::new(CountingChat::new(false));
        let engine = engine_with(Arc::clone(&chat), true).await;

        let answer = engine.answer("rust question").await.unwrap();
        assert_eq!(answer.answer, "rust systems programming notes");
        assert_eq!(answer.context.source_filename, "rust.txt");
        // Passthrough mode never touches the generation model
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn basic_answer_with_no_match_is_an_error() {
        let engine = engine_with(Arc::new(CountingChat::new(false)), false).await;
        let err = engine.answer("rust question").await.unwrap_err();
        assert!(matches!(err, Error::NoMatch(_)));
    }

    #[tokio::test]
    async fn enhanced_answer_cites_sources_and_reports_usage() {
        let chat = Arc::new(CountingChat::new(false));
        let engine = engine_with(Arc::clone(&chat), true).await;

        let answer = engine
            .enhanced_answer("rust question", RetrieveOptions::default())
            .await
            .unwrap();

        assert!(answer.answer.contains("[Source 1]"));
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(answer.sources[0].number, 1);
        assert_eq!(answer.sources[0].filename, "rust.txt");
        assert_eq!(answer.context.retrieved_count, 1);
        assert_eq!(answer.context.model, "test-model");
        assert_eq!(answer.context.tokens_used, Some(87));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_context_is_a_soft_fail_without_model_call() {
        let chat = Arc::new(CountingChat::new(false));
        let engine = engine_with(Arc::clone(&chat), false).await;

        let answer = engine
            .enhanced_answer("rust question", RetrieveOptions::default())
            .await
            .unwrap();

        assert!(answer.sources.is_empty());
        assert_eq!(answer.context.retrieved_count, 0);
        assert!(answer.answer.contains("could not find"));
        assert_eq!(chat.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generation_failure_surfaces_as_error() {
        let chat = Arc::new(CountingChat::new(true));
        let engine = engine_with(Arc::clone(&chat), true).await;

        let err = engine
            .enhanced_answer("rust question", RetrieveOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Generation(_)));
    }
}
