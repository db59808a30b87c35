/// LLM Client: the single point of entry for all chat-completion calls.
///
/// ARCHITECTURAL RULE: No other module talks to the completion endpoint directly.
/// Analyses and chat answers both go through `LlmClient::analyze`.
///
/// The wire format is the OpenAI-compatible chat-completion API (Groq by default).
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::catalog::AnalysisKind;
use crate::analysis::prompts::AnalysisRequest;
use crate::config::Config;

#[cfg(test)]
pub mod mock;
pub mod prompts;

use prompts::{ANALYZER_SYSTEM, PROBE_MESSAGE};

/// Output token budget for analysis and chat calls.
pub const MAX_TOKENS: u32 = 1000;
pub const DEFAULT_MAX_RETRIES: u32 = 3;
const PROBE_MAX_TOKENS: u32 = 10;
/// A completion must be longer than this (trimmed, in characters) to count.
const MIN_CONTENT_CHARS: usize = 10;
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("missing credential")]
    CredentialMissing,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM returned too little content ({0} chars)")]
    ContentTooShort(usize),
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.to_string(),
            content: content.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceMessage {
    pub content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl ChatResponse {
    /// `choices[0].message.content`, if present.
    pub fn text(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|c| c.message.content.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Transport seam: one request in, one parsed response out. No retries here.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError>;
}

/// `ChatBackend` over HTTPS with a bearer token.
pub struct HttpChatBackend {
    client: Client,
    url: String,
    api_key: String,
}

impl HttpChatBackend {
    pub fn new(url: String, api_key: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(HTTP_TIMEOUT).build()?,
            url,
            api_key,
        })
    }
}

#[async_trait]
impl ChatBackend for HttpChatBackend {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, LlmError> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Result of the one-time startup probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendStatus {
    /// Not probed (no credential, or probe skipped).
    Unknown,
    Reachable,
    Unreachable,
}

/// What one `analyze` call produced. Exactly one variant, never partial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisOutcome {
    Success(String),
    /// The startup probe marked the backend unreachable; no call was made.
    /// Carries the kind whose static guidance should be shown.
    Degraded(AnalysisKind),
    /// Every attempt failed; carries the most recent error text.
    Failure(String),
}

/// The single LLM client used by all handlers.
#[derive(Clone)]
pub struct LlmClient {
    backend: Option<Arc<dyn ChatBackend>>,
    model: String,
    status: BackendStatus,
    retry_delay: Duration,
}

impl LlmClient {
    pub fn new(backend: Option<Arc<dyn ChatBackend>>, model: impl Into<String>) -> Self {
        Self {
            backend,
            model: model.into(),
            status: BackendStatus::Unknown,
            retry_delay: Duration::ZERO,
        }
    }

    /// Builds the HTTP-backed client. A missing API key yields a client with
    /// no backend, which answers every call with `Failure("missing credential")`.
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let backend = match &config.llm_api_key {
            Some(key) => Some(Arc::new(HttpChatBackend::new(
                config.llm_api_url.clone(),
                key.clone(),
            )?) as Arc<dyn ChatBackend>),
            None => None,
        };

        Ok(Self::new(backend, config.llm_model.clone())
            .with_retry_delay(Duration::from_millis(config.llm_retry_delay_ms)))
    }

    pub fn with_retry_delay(mut self, retry_delay: Duration) -> Self {
        self.retry_delay = retry_delay;
        self
    }

    pub fn with_status(mut self, status: BackendStatus) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> BackendStatus {
        self.status
    }

    pub fn has_credential(&self) -> bool {
        self.backend.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Sends a tiny request to find out whether the endpoint answers at all.
    ///
    /// Transport errors, 5xx responses and non-JSON bodies mark the backend
    /// unreachable. A 4xx with a JSON error body still proves reachability.
    pub async fn probe(&self) -> BackendStatus {
        let Some(backend) = &self.backend else {
            return BackendStatus::Unknown;
        };

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::new("user", PROBE_MESSAGE)],
            max_tokens: PROBE_MAX_TOKENS,
        };

        match backend.complete(&request).await {
            Ok(_) => BackendStatus::Reachable,
            Err(LlmError::Api { status, message }) if status < 500 => {
                warn!("LLM probe answered with status {status}: {message}");
                BackendStatus::Reachable
            }
            Err(e) => {
                warn!("LLM probe failed: {e}");
                BackendStatus::Unreachable
            }
        }
    }

    /// Runs one analysis prompt with up to `max_retries` sequential attempts.
    pub async fn analyze(&self, request: &AnalysisRequest, max_retries: u32) -> AnalysisOutcome {
        let Some(backend) = &self.backend else {
            return AnalysisOutcome::Failure(LlmError::CredentialMissing.to_string());
        };

        if self.status == BackendStatus::Unreachable {
            info!(
                "Backend marked unreachable at startup; skipping {} call",
                request.kind.title()
            );
            return AnalysisOutcome::Degraded(request.kind);
        }

        let chat_request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::new("system", ANALYZER_SYSTEM),
                ChatMessage::new("user", &request.prompt),
            ],
            max_tokens: MAX_TOKENS,
        };

        let mut last_error: Option<LlmError> = None;

        for attempt in 0..max_retries {
            if attempt > 0 && !self.retry_delay.is_zero() {
                tokio::time::sleep(self.retry_delay).await;
            }

            match backend
                .complete(&chat_request)
                .await
                .and_then(accept_completion)
            {
                Ok(text) => {
                    debug!(
                        "LLM call succeeded on attempt {} ({} chars)",
                        attempt + 1,
                        text.len()
                    );
                    return AnalysisOutcome::Success(text);
                }
                Err(e) => {
                    warn!("LLM attempt {}/{} failed: {e}", attempt + 1, max_retries);
                    last_error = Some(e);
                }
            }
        }

        let message = last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "no attempts were made".to_string());
        AnalysisOutcome::Failure(message)
    }
}

/// Applies the success condition: content present with more than
/// `MIN_CONTENT_CHARS` characters once trimmed.
fn accept_completion(response: ChatResponse) -> Result<String, LlmError> {
    if let Some(usage) = &response.usage {
        debug!(
            "LLM usage: prompt_tokens={}, completion_tokens={}",
            usage.prompt_tokens, usage.completion_tokens
        );
    }

    let text = response.text().map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(LlmError::EmptyContent);
    }

    let chars = text.chars().count();
    if chars <= MIN_CONTENT_CHARS {
        return Err(LlmError::ContentTooShort(chars));
    }

    Ok(text.to_string())
}
