//! Configuration error types

use thiserror::Error;

/// Errors raised while reading configuration from the environment
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A variable is set but does not parse
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),

    /// A connection URL with the wrong scheme or shape
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),

    /// Values that parse on their own but conflict with each other
    #[error("configuration validation failed: {0}")]
    ValidationError(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;
