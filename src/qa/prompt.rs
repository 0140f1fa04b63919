//! Prompt construction for "stuff" answering: every retrieved chunk goes
//! into a single prompt.

use thiserror::Error;

use crate::store::SearchResult;

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const QUESTION_PLACEHOLDER: &str = "{question}";

pub const DEFAULT_PROMPT_TEMPLATE: &str = "Use the following pieces of context to answer the question at the end. If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\n{context}\n\nQuestion: {question}\nHelpful Answer:";

/// Separator between chunk contents in the context block.
const CONTEXT_SEPARATOR: &str = "\n\n";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PromptError {
    #[error("template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),
}

/// A validated prompt template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self, PromptError> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(PromptError::MissingPlaceholder(placeholder));
            }
        }
        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute both placeholders in one pass, so placeholder-like text
    /// inside the context or question is left alone.
    pub fn render(&self, context: &str, question: &str) -> StuffedPrompt {
        let mut text = String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        while let Some(pos) = rest.find('{') {
            text.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix(CONTEXT_PLACEHOLDER) {
                text.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(QUESTION_PLACEHOLDER) {
                text.push_str(question);
                rest = after;
            } else {
                text.push('{');
                rest = &tail[1..];
            }
        }
        text.push_str(rest);

        StuffedPrompt {
            context: context.to_string(),
            question: question.to_string(),
            text,
        }
    }
}

/// A fully rendered prompt, with its parts kept for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StuffedPrompt {
    pub context: String,
    pub question: String,
    pub text: String,
}

/// Join retrieved chunk contents, nearest first.
pub fn build_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
