//! Chat completion client
//!
//! Non-streaming `/chat/completions` against an OpenAI-compatible API. The
//! interview engine only sees the `ChatCompletion` trait, so tests can
//! substitute a scripted capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::LlmConfig;
use crate::interview::Turn;
use crate::{Error, Result};

/// Chat completion capability
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Produce the assistant reply for a list of conversation turns.
    ///
    /// # Errors
    ///
    /// Returns an error if the completion call fails, times out, or returns
    /// no content.
    async fn complete(&self, messages: &[Turn], temperature: f32) -> Result<String>;
}

/// Request body for the completions endpoint
#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Turn],
    temperature: f32,
}

/// Response body from the completions endpoint
#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

/// Client for an OpenAI-compatible chat completions API
pub struct OpenAiChat {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiChat {
    /// Create a client from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if no API key is configured or the HTTP client
    /// cannot be built.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .ok_or_else(|| Error::Config("OPENAI_API_KEY is required for chat completion".to_string()))?;

        let client = reqwest::Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            model: config.model.clone(),
        })
    }
}

fn completion_error(e: &reqwest::Error) -> Error {
    if e.is_timeout() {
        Error::UpstreamTimeout { stage: "chat completion" }
    } else {
        Error::Completion(format!("request failed: {e}"))
    }
}

#[async_trait]
impl ChatCompletion for OpenAiChat {
    async fn complete(&self, messages: &[Turn], temperature: f32) -> Result<String> {
        tracing::debug!(
            model = %self.model,
            turns = messages.len(),
            temperature,
            "requesting chat completion"
        );

        let request = ChatRequest { model: &self.model, messages, temperature };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.api_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await
            .map_err(|e| completion_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "completion API error");
            return Err(Error::Completion(format!("completion API error {status}: {body}")));
        }

        let parsed: ChatResponse = response.json().await.map_err(|e| completion_error(&e))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
            .ok_or_else(|| Error::Completion("completion returned no content".to_string()))?;

        tracing::debug!(chars = content.len(), "completion received");
        Ok(content)
    }
}
