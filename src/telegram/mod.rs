//! Telegram Bot Integration
//!
//! Webhook update filtering and the outbound Bot API client used to deliver
//! the agent's replies.

mod client;
mod error;
mod types;

pub use client::{MAX_MESSAGE_UNITS, TelegramClient};
pub use error::{Result, TelegramError};
pub use types::{IncomingText, incoming_text};
