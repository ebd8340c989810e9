use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("TELEGRAM_BOT_TOKEN is not configured")]
    MissingToken,

    #[error("Invalid Telegram URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Telegram request failed: {0}")]
    Request(#[from] teloxide::RequestError),
}

pub type Result<T> = std::result::Result<T, TelegramError>;
