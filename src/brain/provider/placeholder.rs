//! Placeholder Provider
//!
//! A stub provider used when no LLM gateway key is configured.
//! Lets the server start and answer `/health` and `/api/visibility`.

use async_trait::async_trait;

use crate::brain::provider::{LLMRequest, LLMResponse, Provider, ProviderError, Result};

const NOT_CONFIGURED: &str =
    "No LLM provider configured. Set OPENROUTER_API_KEY to enable chat replies.";

/// A placeholder provider that returns an error when used.
pub struct PlaceholderProvider;

#[async_trait]
impl Provider for PlaceholderProvider {
    fn name(&self) -> &str {
        "none"
    }

    fn default_model(&self) -> &str {
        "none"
    }

    fn supports_tools(&self) -> bool {
        false
    }

    fn calculate_cost(&self, _model: &str, _input_tokens: u32, _output_tokens: u32) -> f64 {
        0.0
    }

    async fn complete(&self, _request: LLMRequest) -> Result<LLMResponse> {
        Err(ProviderError::Internal(NOT_CONFIGURED.to_string()))
    }
}
