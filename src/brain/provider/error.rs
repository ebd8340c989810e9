//! Provider error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// No API key for a provider that needs one.
    #[error("API key not configured for provider '{0}'")]
    MissingApiKey(String),

    /// Transport failure talking to the gateway.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response from the gateway.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The response body did not have the expected shape.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, ProviderError>;
