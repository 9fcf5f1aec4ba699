//! Chat-completion backed summarizer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::messages::SummarizeRequest;
use super::protocols::Summarizer;
use crate::errors::{SummarizeError, TermlensError};
use crate::settings::Settings;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a legal document summarizer. Provide a clear, \
concise summary of terms of use/service documents. Focus on the most important points that \
users should know, including key rights, obligations, limitations, and any concerning clauses. \
Use bullet points and clear language.";

const USER_PROMPT_PREFIX: &str = "Please summarize the following terms of use/service document(s):\n\n";

/// Configuration for the chat-completion endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarizerConfig {
    /// API base URL; `/chat/completions` and `/models` are appended.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Request timeout in seconds. `None` leaves the request unbounded.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: Option<f64>,
    /// System prompt sent before the documents.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_temperature() -> f32 {
    0.3
}

#[allow(clippy::unnecessary_wraps)]
fn default_timeout() -> Option<f64> {
    Some(120.0)
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
            system_prompt: default_system_prompt(),
        }
    }
}

impl SummarizerConfig {
    /// Sets the API base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatReply>,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: Option<ApiErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: Option<String>,
}

/// Summarizer that calls an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatCompletionSummarizer {
    client: reqwest::Client,
    config: SummarizerConfig,
}

impl ChatCompletionSummarizer {
    /// Creates a summarizer from configuration.
    pub fn new(config: SummarizerConfig) -> Result<Self, TermlensError> {
        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.timeout_seconds.filter(|s| s.is_finite() && *s > 0.0) {
            builder = builder.timeout(Duration::from_secs_f64(seconds));
        }
        Ok(Self {
            client: builder.build()?,
            config,
        })
    }

    /// Gets the configuration.
    #[must_use]
    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Checks that the credential is accepted by listing models.
    pub async fn check_connection(&self, settings: &Settings) -> Result<(), SummarizeError> {
        let api_key = settings.api_key()?;
        let response = self
            .client
            .get(self.config.endpoint("models"))
            .bearer_auth(api_key)
            .send()
            .await?;

        if response.status().is_success() {
            debug!("Connection check succeeded");
            Ok(())
        } else {
            Err(api_error(response).await)
        }
    }
}

#[async_trait]
impl Summarizer for ChatCompletionSummarizer {
    async fn summarize(
        &self,
        request: &SummarizeRequest,
        settings: &Settings,
    ) -> Result<String, SummarizeError> {
        let api_key = settings.api_key()?;
        let content = request.content_for_model();
        let user_prompt = format!("{USER_PROMPT_PREFIX}{content}");
        let body = ChatRequest {
            model: &request.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.config.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            temperature: self.config.temperature,
        };

        info!(
            model = %request.model,
            documents = request.terms_contents.len(),
            content_chars = content.chars().count(),
            "Requesting summary"
        );

        let response = self
            .client
            .post(self.config.endpoint("chat/completions"))
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(api_error(response).await);
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message)
            .and_then(|message| message.content)
            .filter(|summary| !summary.trim().is_empty())
            .ok_or(SummarizeError::EmptySummary)
    }
}

async fn api_error(response: reqwest::Response) -> SummarizeError {
    let status = response.status();
    let fallback = status.canonical_reason().unwrap_or("Unknown status").to_string();
    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.error.and_then(|e| e.message).unwrap_or(fallback),
        Err(_) => fallback,
    };
    warn!(status = status.as_u16(), message = %message, "Completion endpoint returned an error");
    SummarizeError::Api {
        status: status.as_u16(),
        message,
    }
}
