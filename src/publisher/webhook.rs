//! Incoming-webhook publisher (`{"content": ...}` JSON body).

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::info;

use super::{check_delivery_response, DeliveryError, Publisher};

/// Timeout for a single webhook post.
pub const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(20);

/// Webhook request body.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct WebhookPayload<'a> {
    /// Message text.
    pub content: &'a str,
}

/// Posts messages to a chat webhook URL.
#[derive(Clone)]
pub struct WebhookPublisher {
    url: String,
    heading: Option<String>,
    client: reqwest::Client,
}

impl std::fmt::Debug for WebhookPublisher {
    // The webhook URL embeds its secret token.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookPublisher")
            .field("url", &"[REDACTED]")
            .field("heading", &self.heading)
            .finish()
    }
}

impl WebhookPublisher {
    /// Create a publisher for `url`.
    pub fn new(url: String) -> Self {
        Self {
            url,
            heading: None,
            client: reqwest::Client::new(),
        }
    }

    /// Prefix every delivered message with a heading line.
    #[must_use]
    pub fn with_heading(mut self, heading: Option<String>) -> Self {
        self.heading = heading;
        self
    }

    /// Text actually sent for `text`, heading included.
    pub fn compose(&self, text: &str) -> String {
        match &self.heading {
            Some(heading) => format!("{heading}\n{text}"),
            None => text.to_owned(),
        }
    }
}

#[async_trait]
impl Publisher for WebhookPublisher {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let content = self.compose(text);
        let response = self
            .client
            .post(&self.url)
            .timeout(WEBHOOK_TIMEOUT)
            .json(&WebhookPayload { content: &content })
            .send()
            .await?;
        check_delivery_response(response).await?;
        info!(chars = content.chars().count(), "webhook message delivered");
        Ok(())
    }
}
