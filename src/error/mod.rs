//! Error types for the console.
//!
//! | Type | Raised by |
//! |------|-----------|
//! | [`ClientError`] | backend calls, stream sessions, orchestration |
//! | [`ConfigError`] | configuration loading and validation |
//!
//! [`ClientError`] variants map one-to-one onto the failure kinds a caller
//! has to render: `Network`, `HttpStatus`, `Parse`, `StreamUnavailable`
//! and `Cancelled`. `Cancelled` is an expected outcome, not an alarm.

mod client;
mod config;

pub use client::ClientError;
pub use config::ConfigError;

/// Result alias for backend operations.
pub type ClientResult<T> = Result<T, ClientError>;
