//! Retrieval-augmented question answering.
//!
//! For each question: retrieve the nearest chunks, stuff them into the
//! prompt, ask the synthesizer once. The snapshot is opened once per batch.

use rayon::prelude::*;

use super::config::RetrievalConfig;
use super::error::{QaError, QuestionError};
use super::prompt::{PromptTemplate, build_context};
use super::questions::QuestionBatch;
use super::synthesizer::AnswerSynthesizer;
use crate::store::{SearchResult, Snapshot, VectorStore};
use crate::vector::EmbeddingGenerator;

/// Answer to one question of a batch.
#[derive(Debug)]
pub struct Answer {
    pub question: String,
    /// Retrieved chunks, nearest first. Empty if retrieval failed.
    pub sources: Vec<SearchResult>,
    pub outcome: Result<String, QuestionError>,
}

impl Answer {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }

    pub fn text(&self) -> Option<&str> {
        self.outcome.as_deref().ok()
    }
}

/// Question answering over a vector store.
pub struct RetrievalQa<'a> {
    store: &'a VectorStore,
    embedder: &'a dyn EmbeddingGenerator,
    synthesizer: &'a dyn AnswerSynthesizer,
    prompt: PromptTemplate,
    top_k: usize,
    parallelism: usize,
}

impl<'a> RetrievalQa<'a> {
    pub fn new(
        store: &'a VectorStore,
        embedder: &'a dyn EmbeddingGenerator,
        synthesizer: &'a dyn AnswerSynthesizer,
    ) -> Self {
        let defaults = RetrievalConfig::default();
        Self {
            store,
            embedder,
            synthesizer,
            prompt: PromptTemplate::default(),
            top_k: defaults.top_k,
            parallelism: defaults.parallel_questions,
        }
    }

    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k.max(1);
        self
    }

    /// Number of questions answered concurrently.
    pub fn with_parallelism(mut self, parallelism: usize) -> Self {
        self.parallelism = parallelism.max(1);
        self
    }

    pub fn with_retrieval_config(self, config: &RetrievalConfig) -> Self {
        self.with_top_k(config.top_k)
            .with_parallelism(config.parallel_questions)
    }

    /// Answer every question of the batch, in batch order.
    ///
    /// Fails as a whole only when the store cannot be opened; individual
    /// question failures are reported in their `Answer`.
    pub fn answer(&self, batch: &QuestionBatch) -> Result<Vec<Answer>, QaError> {
        let snapshot = self.store.snapshot()?;

        tracing::info!(
            target: "qa",
            "answering {} questions with {} (top_k={}, parallelism={})",
            batch.len(),
            self.synthesizer.name(),
            self.top_k,
            self.parallelism
        );

        let workers = self.parallelism.min(batch.len());
        if workers <= 1 {
            return Ok(batch
                .iter()
                .map(|question| self.answer_one(&snapshot, question))
                .collect());
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("pdfqa-qa-{i}"))
            .build()
            .map_err(|e| QaError::ThreadPool(e.to_string()))?;

        Ok(pool.install(|| {
            batch
                .as_slice()
                .par_iter()
                .map(|question| self.answer_one(&snapshot, question))
                .collect()
        }))
    }

    fn answer_one(&self, snapshot: &Snapshot, question: &str) -> Answer {
        let sources = match snapshot.query(question, self.embedder, self.top_k) {
            Ok(sources) => sources,
            Err(e) => {
                tracing::warn!(target: "qa", "retrieval failed for '{question}': {e}");
                return Answer {
                    question: question.to_string(),
                    sources: Vec::new(),
                    outcome: Err(QuestionError::Retrieval(e)),
                };
            }
        };

        let prompt = self.prompt.render(&build_context(&sources), question);
        tracing::debug!(
            target: "qa",
            "'{question}': {} chunks, prompt {} chars",
            sources.len(),
            prompt.text.chars().count()
        );

        let outcome = self.synthesizer.synthesize(&prompt).map_err(|e| {
            tracing::warn!(target: "qa", "synthesis failed for '{question}': {e}");
            QuestionError::SynthesisFailure(e)
        });

        Answer {
            question: question.to_string(),
            sources,
            outcome,
        }
    }
}
