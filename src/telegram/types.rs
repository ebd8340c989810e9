//! Webhook update filtering.
//!
//! Updates are decoded into `teloxide`'s Bot API types; this module only
//! decides which of them the bot answers.

use teloxide::types::{Update, UpdateKind};

/// A text message the bot should answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingText {
    pub chat_id: i64,
    pub text: String,
}

/// The chat id and text of a new message, if this update carries one.
///
/// Edits, non-text messages, blank texts and messages from bots yield `None`,
/// as do update kinds `teloxide` could not decode.
pub fn incoming_text(update: &Update) -> Option<IncomingText> {
    let UpdateKind::Message(message) = &update.kind else {
        return None;
    };
    if update.from().is_some_and(|user| user.is_bot) {
        return None;
    }
    let text = message.text()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(IncomingText {
        chat_id: message.chat.id.0,
        text: text.to_string(),
    })
}
