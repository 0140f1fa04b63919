//! Question batches.

use super::error::QaError;

/// Non-empty ordered list of trimmed questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionBatch {
    questions: Vec<String>,
}

impl QuestionBatch {
    /// Parse newline-separated input. Blank lines are dropped.
    pub fn parse(input: &str) -> Result<Self, QaError> {
        Self::from_questions(input.lines())
    }

    /// Build a batch from individual questions, trimming each and dropping
    /// blank ones.
    pub fn from_questions<I, S>(questions: I) -> Result<Self, QaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let questions: Vec<String> = questions
            .into_iter()
            .map(|q| q.as_ref().trim().to_string())
            .filter(|q| !q.is_empty())
            .collect();

        if questions.is_empty() {
            return Err(QaError::EmptyQuestionBatch);
        }
        Ok(Self { questions })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Never true for a parsed batch.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.questions
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(String::as_str)
    }
}
