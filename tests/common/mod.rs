//! Deterministic collaborators shared by the integration tests.

#![allow(dead_code)]

use parking_lot::Mutex;
use pdfqa::qa::{AnswerSynthesizer, StuffedPrompt, SynthesisError};
pub use pdfqa::vector::testing::KeywordEmbedder;

/// Answers "<n> chunks: <question>" and records each prompt.
#[derive(Default)]
pub struct ScriptedSynthesizer {
    pub prompts: Mutex<Vec<StuffedPrompt>>,
    pub fail_when_question_contains: Option<String>,
}

impl AnswerSynthesizer for ScriptedSynthesizer {
    fn synthesize(&self, prompt: &StuffedPrompt) -> Result<String, SynthesisError> {
        self.prompts.lock().push(prompt.clone());

        if let Some(marker) = &self.fail_when_question_contains {
            if prompt.question.contains(marker.as_str()) {
                return Err(SynthesisError::Api {
                    status: 429,
                    body: "rate limited".to_string(),
                });
            }
        }

        let pieces = if prompt.context.is_empty() {
            0
        } else {
            prompt.context.split("\n\n").count()
        };
        Ok(format!("{pieces} chunks: {}", prompt.question))
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
