//! Completion provider abstraction.
//!
//! Defines the [`LlmProvider`] trait and the request/response types shared
//! by implementations. One provider is implemented:
//! [`openai::OpenAiProvider`]: OpenAI `/v1/chat/completions`.
//!
//! Model and sampling temperature are fixed ([`COMPLETION_MODEL`],
//! [`COMPLETION_TEMPERATURE`]); callers supply only the prompt.

use async_trait::async_trait;
use regex::Regex;

use crate::prompt::Prompt;

pub mod openai;

/// Model used for every completion.
pub const COMPLETION_MODEL: &str = "gpt-4o-mini";

/// Sampling temperature used for every completion.
pub const COMPLETION_TEMPERATURE: f32 = 0.5;

// ---------------------------------------------------------------------------
// Request / Response
// ---------------------------------------------------------------------------

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System instruction.
    pub system: String,
    /// User instruction.
    pub user: String,
    /// Sampling temperature.
    pub temperature: f32,
}

impl CompletionRequest {
    /// Request for a built prompt at the fixed temperature.
    pub fn from_prompt(prompt: &Prompt) -> Self {
        Self {
            system: prompt.system.clone(),
            user: prompt.user.clone(),
            temperature: COMPLETION_TEMPERATURE,
        }
    }
}

/// Usage statistics for a completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageStats {
    /// Tokens used in the prompt.
    pub input_tokens: u32,
    /// Tokens generated in the response.
    pub output_tokens: u32,
}

/// The top-ranked completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionResponse {
    /// Generated text, untrimmed.
    pub text: String,
    /// Token usage.
    pub usage: UsageStats,
    /// The model identifier that served this response.
    pub model: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors returned by completion providers.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport failure.
    #[error("provider request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// Response did not match expected schema.
    #[error("provider response parse error: {0}")]
    Parse(String),
    /// Upstream provider responded with an error status.
    #[error("provider returned non-success status {status}: {body}")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
}

// ---------------------------------------------------------------------------
// HTTP helpers
// ---------------------------------------------------------------------------

/// Check HTTP response status and return body text or a structured error.
///
/// # Errors
///
/// Returns `ProviderError::Request` on transport failure, `ProviderError::HttpStatus` on non-2xx.
pub async fn check_http_response(response: reqwest::Response) -> Result<String, ProviderError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::HttpStatus {
            status: status.as_u16(),
            body: sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}

/// Collapse whitespace, redact token-like strings, and cap length.
pub fn sanitize_http_error_body(raw: &str) -> String {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let mut sanitized = collapsed;
    for pattern in [
        r"sk-proj-[A-Za-z0-9_\-]{10,}",
        r"sk-[A-Za-z0-9]{32,}",
        r"ya29\.[A-Za-z0-9_\-]{20,}",
        r"\d{8,10}:[A-Za-z0-9_\-]{35}",
    ] {
        if let Ok(regex) = Regex::new(pattern) {
            sanitized = regex.replace_all(&sanitized, "[REDACTED]").into_owned();
        }
    }

    const MAX_ERROR_BODY_CHARS: usize = 256;
    if sanitized.chars().count() > MAX_ERROR_BODY_CHARS {
        let shortened = sanitized
            .chars()
            .take(MAX_ERROR_BODY_CHARS)
            .collect::<String>();
        return format!("{shortened}...[truncated]");
    }

    sanitized
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// Remote text-completion service.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request one completion. Never retried.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] on API, network, or parse failure.
    async fn complete(&self, request: CompletionRequest)
        -> Result<CompletionResponse, ProviderError>;

    /// The model identifier this provider calls.
    fn model_id(&self) -> &str;
}

/// Run `prompt` through `provider` and return the trimmed text.
///
/// # Errors
///
/// Propagates the provider's [`ProviderError`].
pub async fn complete_text(
    provider: &dyn LlmProvider,
    prompt: &Prompt,
) -> Result<String, ProviderError> {
    let response = provider
        .complete(CompletionRequest::from_prompt(prompt))
        .await?;
    tracing::debug!(
        model = %response.model,
        input_tokens = response.usage.input_tokens,
        output_tokens = response.usage.output_tokens,
        "completion received"
    );
    Ok(response.text.trim().to_owned())
}
