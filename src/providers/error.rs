//! Provider error types and handling

use thiserror::Error;

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Errors that can occur when calling an upstream LLM provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider responded with a non-success HTTP status. The status is
    /// passed through to the caller; `message` holds the raw provider body
    /// for logging and the single-shot `details` field.
    #[error("upstream returned HTTP {status}")]
    Upstream {
        status: u16,
        message: String,
        request_id: Option<String>,
    },

    /// The bounded wait elapsed before the provider responded.
    #[error("upstream request timed out")]
    Timeout,

    /// Network or connection error
    #[error("network error: {0}")]
    Network(String),

    /// Response parsing error
    #[error("failed to parse upstream response: {0}")]
    Parse(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout
        } else if err.is_connect() {
            ProviderError::Network(format!("connection failed: {}", err))
        } else if err.is_decode() {
            ProviderError::Parse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(err: serde_json::Error) -> Self {
        ProviderError::Parse(err.to_string())
    }
}
