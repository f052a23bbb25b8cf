//! Reply publisher for the chat bot.

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::debug;

use super::{truncate_to_limit, DeliveryError, Publisher, CHAT_MESSAGE_LIMIT};

/// Sends a message back to the chat a command came from.
///
/// Text longer than [`CHAT_MESSAGE_LIMIT`] is cut before sending.
#[derive(Debug, Clone)]
pub struct ChatReply {
    bot: Bot,
    chat_id: ChatId,
}

impl ChatReply {
    /// Reply target for `chat_id`.
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl Publisher for ChatReply {
    async fn deliver(&self, text: &str) -> Result<(), DeliveryError> {
        let body = truncate_to_limit(text, CHAT_MESSAGE_LIMIT);
        if body.len() < text.len() {
            debug!(
                original_chars = text.chars().count(),
                limit = CHAT_MESSAGE_LIMIT,
                "reply truncated"
            );
        }
        self.bot.send_message(self.chat_id, body).await?;
        Ok(())
    }
}
