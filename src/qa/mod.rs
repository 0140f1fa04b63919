//! Retrieval-QA: answer batches of questions from the vector store.

mod config;
mod error;
mod groq;
mod orchestrator;
mod prompt;
mod questions;
mod synthesizer;

pub use config::{LlmConfig, PromptConfig, RetrievalConfig};
pub use error::{QaError, QuestionError};
pub use groq::GroqSynthesizer;
pub use orchestrator::{Answer, RetrievalQa};
pub use prompt::{
    CONTEXT_PLACEHOLDER, DEFAULT_PROMPT_TEMPLATE, PromptError, PromptTemplate,
    QUESTION_PLACEHOLDER, StuffedPrompt, build_context,
};
pub use questions::QuestionBatch;
pub use synthesizer::{AnswerSynthesizer, SynthesisError};
