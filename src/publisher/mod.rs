//! Delivering generated text to a destination.
//!
//! Two [`Publisher`]s exist:
//! - [`webhook::WebhookPublisher`]: fire-and-forget HTTP POST used by scheduled jobs
//! - [`chat::ChatReply`]: reply in the Telegram chat that issued a command

use async_trait::async_trait;

pub mod chat;
pub mod webhook;

/// Telegram's per-message character ceiling.
pub const CHAT_MESSAGE_LIMIT: usize = 4096;

/// A destination rejected or failed to receive a post or append.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    /// HTTP transport failure.
    #[error("destination request failed: {0}")]
    Transport(#[from] reqwest::Error),
    /// Destination answered with a non-success status.
    #[error("destination rejected payload with status {status}: {body}")]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },
    /// Telegram Bot API failure.
    #[error("telegram request failed: {0}")]
    Chat(#[from] teloxide::RequestError),
    /// Could not obtain credentials for the destination.
    #[error("destination authentication failed: {0}")]
    Auth(String),
    /// Destination answered with a body we could not interpret.
    #[error("unexpected destination response: {0}")]
    Malformed(String),
}

/// Capability: deliver a text message somewhere.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Deliver `text`. No retry, no fallback.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] if the destination cannot be reached or rejects the message.
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError>;
}

/// Cut `text` to at most `limit` characters, dropping the remainder.
pub fn truncate_to_limit(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Map a non-2xx response to [`DeliveryError::Rejected`].
///
/// # Errors
///
/// Returns [`DeliveryError::Rejected`] for non-success statuses and
/// [`DeliveryError::Transport`] if the body cannot be read.
pub async fn check_delivery_response(response: reqwest::Response) -> Result<String, DeliveryError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(DeliveryError::Rejected {
            status: status.as_u16(),
            body: crate::providers::sanitize_http_error_body(&body),
        });
    }
    Ok(body)
}
