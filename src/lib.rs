//! Stargazer
//!
//! A Telegram bot that answers "what can I see in the sky right now?". Incoming
//! webhook messages run through a two-step workflow: an LLM agent, which may
//! call the `celestial_visibility` tool, writes the reply; the reply is then
//! sent back to the chat.

pub mod astronomy;
pub mod brain;
pub mod cli;
pub mod config;
pub mod gateway;
pub mod logging;
pub mod memory;
pub mod pricing;
pub mod telegram;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod tests;

/// Crate version, reported by `/health` and the CLI.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
