//! Outbound Bot API calls.

use teloxide::prelude::*;
use teloxide::types::{AllowedUpdate, ParseMode};

use super::error::{Result, TelegramError};
use crate::config::Secret;
use crate::utils::split_message;

/// Telegram's per-message text limit, in UTF-16 code units.
pub const MAX_MESSAGE_UNITS: usize = 4096;

// Legacy Markdown dialect.
#[allow(deprecated)]
const PARSE_MODE: ParseMode = ParseMode::Markdown;

/// Bot API client. Built even without a token so the server can start; every
/// call then fails with [`TelegramError::MissingToken`].
#[derive(Clone)]
pub struct TelegramClient {
    bot: Option<Bot>,
}

impl TelegramClient {
    pub fn new(token: Option<&Secret>, api_base_url: &str) -> Result<Self> {
        let bot = match token {
            Some(token) if !token.is_empty() => {
                let url = reqwest::Url::parse(api_base_url).map_err(|e| TelegramError::InvalidUrl {
                    url: api_base_url.to_string(),
                    reason: e.to_string(),
                })?;
                Some(Bot::new(token.expose()).set_api_url(url))
            }
            _ => None,
        };
        Ok(Self { bot })
    }

    pub fn is_configured(&self) -> bool {
        self.bot.is_some()
    }

    fn bot(&self) -> Result<&Bot> {
        self.bot.as_ref().ok_or(TelegramError::MissingToken)
    }

    /// Sends `text` to `chat_id` with legacy Markdown formatting, split into
    /// several messages when it exceeds the Bot API limit. Returns the number
    /// of messages sent.
    pub async fn send_message(&self, chat_id: i64, text: &str) -> Result<usize> {
        let bot = self.bot()?;
        let chunks = split_message(text, MAX_MESSAGE_UNITS);

        for chunk in &chunks {
            bot.send_message(ChatId(chat_id), chunk.as_str())
                .parse_mode(PARSE_MODE)
                .await?;
        }

        tracing::info!(chat_id, parts = chunks.len(), "Sent Telegram reply");
        Ok(chunks.len())
    }

    /// Points the bot's webhook at `url`, optionally with a secret token that
    /// Telegram echoes in `X-Telegram-Bot-Api-Secret-Token`.
    pub async fn set_webhook(&self, url: &str, secret: Option<&Secret>) -> Result<()> {
        let bot = self.bot()?;
        let parsed = reqwest::Url::parse(url).map_err(|e| TelegramError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let mut request = bot
            .set_webhook(parsed)
            .allowed_updates([AllowedUpdate::Message]);
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            request = request.secret_token(secret.expose());
        }
        request.await?;

        tracing::info!(url, "Telegram webhook registered");
        Ok(())
    }
}
