//! Configuration errors.

use thiserror::Error;

/// Invalid console configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("{name} must be a number, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },

    #[error("top_k must be between 1 and 20, got {0}")]
    TopKOutOfRange(u32),

    #[error("tool log limit must be at least 1")]
    ZeroLogLimit,
}
