//! OpenAI-compatible chat completions client.

use std::time::Duration;

use reqwest::Client;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{Deserialize, Serialize};

use super::{CompletionProvider, send};
use crate::config::{Config, llm, prompts};
use crate::error::{ClientError, ClientResult};

/// Sampling settings for one kind of call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatSettings {
    /// Completion token cap.
    pub max_tokens: u32,

    /// Sampling temperature.
    pub temperature: f32,

    /// Nucleus sampling; omitted from the request when `None`.
    pub top_p: Option<f32>,
}

impl ChatSettings {
    /// Settings for per-batch summaries.
    #[must_use]
    pub const fn summary() -> Self {
        Self {
            max_tokens: llm::SUMMARY_MAX_TOKENS,
            temperature: llm::SUMMARY_TEMPERATURE,
            top_p: None,
        }
    }

    /// Settings for the final combine call.
    #[must_use]
    pub const fn combine() -> Self {
        Self {
            max_tokens: llm::COMBINE_MAX_TOKENS,
            temperature: llm::COMBINE_TEMPERATURE,
            top_p: Some(llm::COMBINE_TOP_P),
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self::summary()
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> ChatMessage<'a> {
    const fn system(content: &'a str) -> Self {
        Self {
            role: "system",
            content,
        }
    }

    const fn user(content: &'a str) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions client.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct OpenAiClient {
    /// HTTP client with retry middleware.
    client: ClientWithMiddleware,

    /// Bearer token (optional for local or mock servers).
    api_key: Option<String>,

    /// Model name sent with each request.
    model: String,

    /// API base, without the `/chat/completions` suffix.
    api_url: String,

    /// Sampling settings for this handle.
    settings: ChatSettings,

    /// Request timeout, echoed back in timeout errors.
    timeout: Duration,
}

impl OpenAiClient {
    /// Create a client tuned for per-batch summaries.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .gzip(true)
            .build()?;

        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_secs(1), Duration::from_secs(30))
            .build_with_max_retries(config.llm_max_retries);

        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            client,
            api_key: config.openai_api_key.clone(),
            model: config.openai_model.clone(),
            api_url: config.openai_api_url.trim_end_matches('/').to_string(),
            settings: ChatSettings::summary(),
            timeout: config.request_timeout,
        })
    }

    /// A handle sharing this client's pool but sampling with `settings`.
    #[must_use]
    pub fn with_settings(&self, settings: ChatSettings) -> Self {
        Self {
            settings,
            ..self.clone()
        }
    }

    /// Check if an API key is configured.
    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Sampling settings used by this handle.
    #[must_use]
    pub const fn settings(&self) -> ChatSettings {
        self.settings
    }

    /// Send one user message and return the first choice's content.
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, a non-success status, or a response
    /// without completion text.
    pub async fn chat(&self, prompt: &str) -> ClientResult<String> {
        let url = format!("{}/chat/completions", self.api_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage::system(prompts::SYSTEM), ChatMessage::user(prompt)],
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            top_p: self.settings.top_p,
        };
        let body_str = serde_json::to_string(&body)?;

        tracing::debug!(
            model = %self.model,
            prompt_chars = prompt.chars().count(),
            "Requesting chat completion"
        );

        let mut request = self.client.post(&url).body(body_str);
        if let Some(ref key) = self.api_key {
            request = request.bearer_auth(key);
        }

        let response = send(request, self.timeout).await?;
        let parsed: ChatResponse = serde_json::from_str(&response.text().await?)?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ClientError::EmptyCompletion)?;

        tracing::debug!(
            completion_chars = content.chars().count(),
            "Chat completion received"
        );
        Ok(content)
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiClient {
    async fn complete(&self, prompt: &str) -> ClientResult<String> {
        self.chat(prompt).await
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("model", &self.model)
            .field("api_url", &self.api_url)
            .field("has_api_key", &self.has_api_key())
            .field("settings", &self.settings)
            .finish()
    }
}
