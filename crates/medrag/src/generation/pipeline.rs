//! Answer pipeline: retrieve, build the grounded prompt, complete

use std::sync::Arc;
use std::time::Instant;

use crate::context::RagContext;
use crate::error::{Error, Result, Stage};
use crate::generation::PromptBuilder;
use crate::providers::LlmProvider;
use crate::retrieval::Retriever;
use crate::types::{AnswerResponse, RetrievedContext};

/// Generated text plus the contexts it was grounded on
#[derive(Debug, Clone, PartialEq)]
pub struct Answer {
    pub text: String,
    pub contexts: Vec<RetrievedContext>,
}

/// Single-shot question answering over the loaded corpus
#[derive(Clone)]
pub struct AnswerPipeline {
    retriever: Retriever,
    llm: Arc<dyn LlmProvider>,
    top_k: usize,
}

impl AnswerPipeline {
    pub fn new(context: &RagContext) -> Self {
        Self {
            retriever: Retriever::new(context),
            llm: Arc::clone(context.llm()),
            top_k: context.config().retrieval.top_k,
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Answer a question using the configured top-k contexts
    ///
    /// The model's text is returned verbatim, including an empty string.
    /// Failures are wrapped in [`Error::Generation`] tagged with the stage.
    pub async fn answer(&self, question: &str) -> Result<Answer> {
        let contexts = self
            .retriever
            .retrieve(question, self.top_k)
            .await
            .map_err(|e| Error::generation(Stage::Retrieval, e))?;

        let prompt = PromptBuilder::build_rag_prompt(question, &contexts);
        tracing::debug!(
            "Prompt built from {} contexts ({} chars)",
            contexts.len(),
            prompt.len()
        );

        let text = self
            .llm
            .generate(&prompt)
            .await
            .map_err(|e| Error::generation(Stage::Completion, e))?;

        if text.is_empty() {
            tracing::warn!("{} returned no text for the question", self.llm.name());
        }

        Ok(Answer { text, contexts })
    }

    /// Answer and time the whole round trip
    pub async fn answer_timed(&self, question: &str) -> Result<AnswerResponse> {
        let start = Instant::now();
        let answer = self.answer(question).await?;
        let processing_time_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Answered with {} contexts in {}ms",
            answer.contexts.len(),
            processing_time_ms
        );

        Ok(AnswerResponse {
            answer: answer.text,
            contexts: answer.contexts,
            processing_time_ms,
        })
    }
}
