//! OpenRouter adapter for chat completions.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};

use super::error::QueryError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Trait for chat completion providers.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    async fn complete(&self, model: &str, prompt: &str) -> Result<Completion, QueryError>;
}

/// Primary result text plus an optional reasoning trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub result: String,
    pub reasoning: Option<String>,
}

/// OpenRouter API adapter. Also speaks to any OpenAI-compatible endpoint when
/// constructed with a custom base URL.
#[derive(Debug, Clone)]
pub struct OpenRouterAdapter {
    client: reqwest::Client,
    base_url: String,
}

impl OpenRouterAdapter {
    /// Create from API key against the public OpenRouter endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self, QueryError> {
        Self::with_config(api_key, DEFAULT_BASE_URL, Duration::from_secs(120))
    }

    /// Create from environment. `OPENROUTER_API_KEY` is required; its absence
    /// is a fatal configuration error, not a retryable one.
    pub fn from_env() -> Result<Self, QueryError> {
        let api_key = std::env::var("OPENROUTER_API_KEY")
            .map_err(|_| QueryError::config("OPENROUTER_API_KEY not set"))?;

        let base_url =
            std::env::var("OPENROUTER_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());

        let timeout = std::env::var("OPENROUTER_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(120));

        Self::with_config(api_key, base_url, timeout)
    }

    pub fn with_config(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, QueryError> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth_value = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|_| QueryError::config("Invalid API key format"))?;
        headers.insert(AUTHORIZATION, auth_value);

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .gzip(true)
            .build()
            .map_err(|e| QueryError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn chat_url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

// =============================================================================
// API TYPES
// =============================================================================

#[derive(Serialize)]
struct ChatApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    stream: bool,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatApiResponse {
    choices: Option<Vec<Choice>>,
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    /// OpenRouter surfaces reasoning traces under `reasoning`; DeepSeek-style
    /// endpoints use `reasoning_content`.
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}

#[derive(Deserialize)]
struct ApiError {
    message: Option<String>,
}

// =============================================================================
// CHAT PROVIDER IMPL
// =============================================================================

#[async_trait]
impl ChatProvider for OpenRouterAdapter {
    async fn complete(&self, model: &str, prompt: &str) -> Result<Completion, QueryError> {
        let api_req = ChatApiRequest {
            model,
            messages: vec![ApiMessage {
                role: "user",
                content: prompt,
            }],
            stream: false,
        };

        let response = self
            .client
            .post(self.chat_url())
            .json(&api_req)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ChatApiResponse>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
            let retryable = status.as_u16() == 429 || status.is_server_error();
            return Err(QueryError::provider("openrouter", message, retryable));
        }

        let parsed: ChatApiResponse = serde_json::from_str(&body).map_err(|e| {
            QueryError::provider("openrouter", format!("Invalid JSON: {e}"), true)
        })?;

        if let Some(error) = parsed.error {
            return Err(QueryError::provider(
                "openrouter",
                error.message.unwrap_or_default(),
                true,
            ));
        }

        let message = parsed
            .choices
            .and_then(|choices| choices.into_iter().next())
            .and_then(|choice| choice.message)
            .ok_or(QueryError::MissingContent)?;

        let result = message.content.ok_or(QueryError::MissingContent)?;
        let reasoning = message.reasoning.or(message.reasoning_content);

        Ok(Completion { result, reasoning })
    }
}
