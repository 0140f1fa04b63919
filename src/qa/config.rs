//! Configuration types for retrieval and answer synthesis.

use serde::{Deserialize, Serialize};

use super::prompt::{DEFAULT_PROMPT_TEMPLATE, PromptTemplate};

/// Retrieval settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved per question.
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Questions answered concurrently. 1 means sequential.
    #[serde(default = "default_parallel_questions")]
    pub parallel_questions: usize,
}

/// Chat completion provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    /// OpenAI-compatible chat completions endpoint.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_llm_model")]
    pub model: String,

    #[serde(default)]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptConfig {
    /// Must contain `{context}` and `{question}`.
    #[serde(default = "default_template")]
    pub template: String,
}

fn default_top_k() -> usize {
    4
}

fn default_parallel_questions() -> usize {
    1
}

fn default_api_url() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_llm_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_key_env() -> String {
    "GROQ_API_KEY".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_template() -> String {
    DEFAULT_PROMPT_TEMPLATE.to_string()
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            parallel_questions: default_parallel_questions(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            model: default_llm_model(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            api_key_env: default_api_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            template: default_template(),
        }
    }
}

impl RetrievalConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.top_k == 0 {
            return Err("retrieval.top_k must be at least 1".to_string());
        }
        if self.parallel_questions == 0 {
            return Err("retrieval.parallel_questions must be at least 1".to_string());
        }
        Ok(())
    }
}

impl LlmConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("llm.model must not be empty".to_string());
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(format!(
                "llm.temperature ({}) must be between 0 and 2",
                self.temperature
            ));
        }
        if self.max_tokens == 0 {
            return Err("llm.max_tokens must be at least 1".to_string());
        }
        Ok(())
    }
}

impl PromptConfig {
    /// Parse the configured template.
    pub fn template(&self) -> Result<PromptTemplate, String> {
        PromptTemplate::new(self.template.clone()).map_err(|e| format!("prompt.template: {e}"))
    }
}
