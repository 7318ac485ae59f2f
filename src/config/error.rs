//! Configuration error types

use thiserror::Error;

/// Errors produced while resolving the gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable '{var}' is not set")]
    EnvVarNotFound { var: String },

    #[error("invalid value for '{var}': {message}")]
    Invalid { var: String, message: String },
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
