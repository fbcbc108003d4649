//! OpenAI chat-completions backend.

use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use tracing::{debug, warn};

use crate::error::CompletionError;
use crate::message::{ChatRequest, ChatResponse, Message};
use crate::{CompletionBackend, Result};

/// Environment variable holding the API credential.
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Default API root.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Settings for an OpenAI-compatible endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Model identifier.
    pub model: String,
    /// API root, without the `/chat/completions` suffix.
    pub base_url: String,
    /// Sampling temperature. Kept low so replies stay parseable.
    pub temperature: f32,
    /// Upper bound for a single request, connection included.
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            timeout: Duration::from_secs(120),
        }
    }
}

/// Backend calling `POST {base_url}/chat/completions`.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    options: CompletionOptions,
}

impl OpenAiBackend {
    /// Create a backend with an explicit credential.
    pub fn new(api_key: impl Into<String>, options: CompletionOptions) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(CompletionError::Config("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(options.timeout)
            .build()
            .map_err(|e| CompletionError::Config(format!("failed to build HTTP client: {}", e)))?;

        debug!(
            "Completion backend: model={}, base_url={}, timeout={:?}",
            options.model, options.base_url, options.timeout
        );

        Ok(Self {
            client,
            api_key,
            options,
        })
    }

    /// Create a backend reading the credential from `OPENAI_API_KEY`.
    pub fn from_env(options: CompletionOptions) -> Result<Self> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| CompletionError::Config(format!("{} not set", API_KEY_ENV)))?;
        Self::new(api_key, options)
    }

    /// Settings in use.
    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.options.base_url.trim_end_matches('/'))
    }
}

impl CompletionBackend for OpenAiBackend {
    fn complete(&self, system_role: &str, prompt: &str) -> Result<String> {
        let start = Instant::now();

        let request = ChatRequest::new(&self.options.model)
            .message(Message::system(system_role))
            .message(Message::user(prompt))
            .temperature(self.options.temperature);

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| {
                warn!(error = %e, "Completion request failed");
                CompletionError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            warn!(status = %status, "Completion API error");
            return Err(CompletionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .map_err(|e| CompletionError::Parse(e.to_string()))?;

        let content = body.into_first_content().ok_or(CompletionError::EmptyReply)?;

        debug!(
            model = %self.options.model,
            duration_ms = start.elapsed().as_millis() as u64,
            reply_chars = content.chars().count(),
            "Chat completion"
        );

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.options.model
    }
}
