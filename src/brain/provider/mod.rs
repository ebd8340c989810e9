//! LLM Provider Module
//!
//! Abstraction over chat-completion backends. The bot talks to a hosted
//! model through an OpenAI-compatible gateway (OpenRouter by default); the
//! placeholder keeps the server running when no key is configured.

mod error;
pub mod openai_compat;
pub mod placeholder;
mod types;

pub use error::{ProviderError, Result};
pub use openai_compat::OpenAiCompatibleProvider;
pub use placeholder::PlaceholderProvider;
pub use types::{
    LLMRequest, LLMResponse, Message, Role, StopReason, TokenUsage, ToolCall, ToolDefinition,
};

use async_trait::async_trait;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Model used when a request does not name one.
    fn default_model(&self) -> &str;

    fn supports_tools(&self) -> bool {
        true
    }

    /// USD cost of a completion, from the shared pricing table.
    fn calculate_cost(&self, model: &str, input_tokens: u32, output_tokens: u32) -> f64 {
        crate::pricing::pricing().calculate_cost(model, input_tokens, output_tokens)
    }

    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse>;
}
