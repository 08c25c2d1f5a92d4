//! OpenAI-compatible chat completion client
//!
//! Works with any endpoint that implements the `chat/completions` API
//! (OpenAI, Groq, Ollama, vLLM, LocalAI). Only single non-streaming
//! requests are made.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::{debug, error};

use crate::config::NarratorSettings;
use crate::error::GenerationError;
use crate::narrator::TextGenerator;

/// Connection timeout; the overall request bound is applied by the narrator
const CONNECT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Text generator backed by an OpenAI-compatible HTTP endpoint
pub struct OpenAiCompatibleGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl OpenAiCompatibleGenerator {
    /// Create a generator from narrator settings
    ///
    /// The API key is read from the environment variable named by
    /// `settings.api_key_env`; an unset or empty variable means no key.
    pub fn from_settings(settings: &NarratorSettings) -> Result<Self, GenerationError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .build()
            .map_err(|e| GenerationError::Transport {
                provider: settings.base_url.clone(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        let api_key = settings
            .api_key_env
            .as_deref()
            .and_then(|name| env::var(name).ok())
            .filter(|key| !key.is_empty());

        Ok(Self {
            client,
            base_url: settings.base_url.clone(),
            model: settings.model.clone(),
            api_key,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
        })
    }

    fn api_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn parse_response(&self, body: &str) -> Result<String, GenerationError> {
        let response: ChatCompletionResponse =
            serde_json::from_str(body).map_err(|e| GenerationError::MalformedResponse {
                provider: self.base_url.clone(),
                reason: e.to_string(),
            })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| GenerationError::MalformedResponse {
                provider: self.base_url.clone(),
                reason: "no choices returned".to_string(),
            })?;

        debug!(finish_reason = ?choice.finish_reason, "Received completion");

        choice
            .message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GenerationError::MalformedResponse {
                provider: self.base_url.clone(),
                reason: "empty message content".to_string(),
            })
    }
}

#[async_trait]
impl TextGenerator for OpenAiCompatibleGenerator {
    fn name(&self) -> &str {
        &self.model
    }

    async fn generate(
        &self,
        system_instruction: &str,
        prompt: &str,
    ) -> Result<String, GenerationError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_instruction,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let mut http_request = self.client.post(self.api_url()).json(&request);
        if let Some(key) = &self.api_key {
            http_request = http_request.bearer_auth(key);
        }

        let response = http_request.send().await.map_err(|e| {
            error!(url = %self.api_url(), error = %e, "Failed to reach text generator");
            GenerationError::Transport {
                provider: self.base_url.clone(),
                reason: e.to_string(),
            }
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| GenerationError::Transport {
            provider: self.base_url.clone(),
            reason: format!("failed to read response: {}", e),
        })?;

        if !status.is_success() {
            return Err(GenerationError::Status {
                provider: self.base_url.clone(),
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            });
        }

        self.parse_response(&body)
    }
}
