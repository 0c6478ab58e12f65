//! Configuration error types.

use thiserror::Error;

/// Errors that can occur while validating or loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a file.
    #[error("Failed to read file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A setting has an unusable value.
    #[error("Invalid setting '{setting}': {message}")]
    ValidationError {
        setting: &'static str,
        message: String,
    },
}
