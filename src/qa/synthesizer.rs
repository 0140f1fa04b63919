//! Answer synthesis seam.

use thiserror::Error;

use super::prompt::StuffedPrompt;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("API key not found: set the {0} environment variable")]
    MissingApiKey(String),

    #[error("Request failed: {0}")]
    Request(String),

    #[error("Provider returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Provider returned no answer")]
    EmptyResponse,
}

/// Turns a stuffed prompt into answer text.
///
/// Implementations make exactly one provider call per invocation; retries
/// belong to the provider.
pub trait AnswerSynthesizer: Send + Sync {
    fn synthesize(&self, prompt: &StuffedPrompt) -> Result<String, SynthesisError>;

    /// Provider name for logs.
    fn name(&self) -> &str;
}
