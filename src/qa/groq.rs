//! Groq chat completions client.
//!
//! Speaks the OpenAI-compatible `/chat/completions` protocol, so any
//! endpoint with the same shape works through `llm.api_url`.

use std::env;
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use super::config::LlmConfig;
use super::prompt::StuffedPrompt;
use super::synthesizer::{AnswerSynthesizer, SynthesisError};

/// Synthesizer backed by a hosted chat model.
pub struct GroqSynthesizer {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for GroqSynthesizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroqSynthesizer")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GroqSynthesizer {
    /// Read the API key from the environment variable named in `config`.
    pub fn from_config(config: &LlmConfig) -> Result<Self, SynthesisError> {
        let api_key = env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| SynthesisError::MissingApiKey(config.api_key_env.clone()))?;
        Self::with_api_key(config, api_key)
    }

    pub fn with_api_key(
        config: &LlmConfig,
        api_key: impl Into<String>,
    ) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Request(e.to_string()))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    fn request_for(&self, prompt: &StuffedPrompt) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt.text.clone(),
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u64,
    completion_tokens: u64,
}

fn answer_text(response: ChatResponse) -> Result<String, SynthesisError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(SynthesisError::EmptyResponse)
}

impl AnswerSynthesizer for GroqSynthesizer {
    fn synthesize(&self, prompt: &StuffedPrompt) -> Result<String, SynthesisError> {
        let start = Instant::now();

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&self.request_for(prompt))
            .send()
            .map_err(|e| SynthesisError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SynthesisError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| SynthesisError::Request(format!("invalid response body: {e}")))?;

        if let Some(usage) = &parsed.usage {
            tracing::debug!(
                target: "qa",
                "{} answered in {}ms ({} prompt / {} completion tokens)",
                self.model,
                start.elapsed().as_millis(),
                usage.prompt_tokens,
                usage.completion_tokens
            );
        }

        answer_text(parsed)
    }

    fn name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthesizer() -> GroqSynthesizer {
        GroqSynthesizer::with_api_key(&LlmConfig::default(), "test_key").unwrap()
    }

    #[test]
    fn test_missing_api_key() {
        let config = LlmConfig {
            api_key_env: "PDFQA_TEST_KEY_THAT_IS_NEVER_SET".to_string(),
            ..LlmConfig::default()
        };
        assert!(matches!(
            GroqSynthesizer::from_config(&config),
            Err(SynthesisError::MissingApiKey(name)) if name == "PDFQA_TEST_KEY_THAT_IS_NEVER_SET"
        ));
    }

    #[test]
    fn test_request_carries_prompt_and_settings() {
        let prompt = crate::qa::PromptTemplate::default().render("ctx", "q?");
        let request = serde_json::to_value(synthesizer().request_for(&prompt)).unwrap();

        assert_eq!(request["model"], "llama-3.3-70b-versatile");
        assert_eq!(request["temperature"], 0.0);
        assert_eq!(request["max_tokens"], 1024);
        assert_eq!(request["messages"][0]["role"], "user");
        assert_eq!(request["messages"][0]["content"], prompt.text.as_str());
    }

    #[test]
    fn test_answer_text_from_response() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  Paris.  "}}],
                "usage":{"prompt_tokens":10,"completion_tokens":2}}"#,
        )
        .unwrap();
        assert_eq!(answer_text(response).unwrap(), "Paris.");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(
            answer_text(empty),
            Err(SynthesisError::EmptyResponse)
        ));
    }
}
