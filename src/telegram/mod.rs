//! Telegram bot: slash command dispatch and reply delivery.
//!
//! The dispatcher handles one update per handler call; shared state is
//! immutable apart from the spreadsheet token cache inside the store.

use teloxide::dispatching::UpdateFilterExt;
use teloxide::prelude::*;
use teloxide::types::ParseMode;
use tracing::{debug, info, warn};

use crate::error::CoachError;
use crate::publisher::chat::ChatReply;
use crate::publisher::{DeliveryError, Publisher};
use crate::recency::today_in;

pub mod commands;
pub mod ui;

use commands::{BotState, Reply};

/// Run the bot until Ctrl+C.
///
/// Handler errors are reported by teloxide's default error handler; the
/// requester gets no reply in that case.
pub async fn run_bot(bot_token: &str, state: BotState) -> anyhow::Result<()> {
    let bot = Bot::new(bot_token);

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handle_message));

    info!(qa_chat_id = state.qa_chat_id, "telegram dispatcher starting");

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    Ok(())
}

async fn handle_message(bot: Bot, msg: Message, state: BotState) -> Result<(), CoachError> {
    let Some(text) = msg.text() else {
        return Ok(());
    };
    let Some(command) = commands::parse_command(text) else {
        return Ok(());
    };
    debug!(chat_id = msg.chat.id.0, ?command, "command received");

    let today = today_in(state.timezone);
    let Some(reply) = commands::execute(command, msg.chat.id.0, &state, today).await? else {
        return Ok(());
    };

    match reply {
        Reply::Answer(text) => {
            ChatReply::new(bot, msg.chat.id).deliver(&text).await?;
        }
        Reply::Notice(html) => {
            bot.send_message(msg.chat.id, html)
                .parse_mode(ParseMode::Html)
                .await
                .map_err(DeliveryError::from)?;
        }
        Reply::Private(html) => match msg.from.as_ref() {
            Some(user) => {
                // Fails if the user never opened a private chat with the bot.
                if let Err(e) = bot
                    .send_message(ChatId::from(user.id), html)
                    .parse_mode(ParseMode::Html)
                    .await
                {
                    warn!(error = %e, "failed to send private redirect notice");
                }
            }
            None => debug!("redirect notice dropped: no sender"),
        },
    }
    Ok(())
}
