//! Errors raised by backend calls and stream sessions.

use serde_json::Value;
use thiserror::Error;

use crate::traits::HttpError;

/// Failure of one backend operation.
///
/// Every public operation either succeeds or fails with exactly one of
/// these. None of them is retried internally.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// The transport could not complete the exchange.
    #[error("network error: {0}")]
    Network(#[from] HttpError),

    /// Non-2xx response. `body` is the decoded JSON, or the raw text as a
    /// JSON string when the body was not JSON.
    #[error("{status} {status_text}\n{}", pretty_body(.body))]
    HttpStatus {
        status: u16,
        status_text: String,
        body: Value,
    },

    /// A 2xx body that should have been JSON but did not decode.
    #[error("invalid JSON in response: {message}")]
    Parse { message: String },

    /// The stream endpoint answered non-2xx or had no readable body.
    #[error("Stream unavailable ({})", stream_status(.status))]
    StreamUnavailable { status: Option<u16> },

    /// The caller stopped the operation while it was waiting on the
    /// transport.
    #[error("cancelled")]
    Cancelled,
}

fn stream_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "no body".to_string(), |s| s.to_string())
}

fn pretty_body(body: &Value) -> String {
    serde_json::to_string_pretty(body).unwrap_or_else(|_| body.to_string())
}

impl ClientError {
    pub(crate) fn parse(err: impl std::fmt::Display) -> Self {
        ClientError::Parse {
            message: err.to_string(),
        }
    }

    /// Status code for errors that carry one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpStatus { status, .. } => Some(*status),
            ClientError::StreamUnavailable { status } => *status,
            _ => None,
        }
    }

    /// Whether this is the expected outcome of a caller-initiated stop.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ClientError::Cancelled)
    }

    /// Text suitable for the console.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Network(err) => format!("Unable to reach the backend: {}", err),
            ClientError::Cancelled => "stream stopped".to_string(),
            other => other.to_string(),
        }
    }

    /// Short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ClientError::Network(_) => "NETWORK",
            ClientError::HttpStatus { .. } => "HTTP_STATUS",
            ClientError::Parse { .. } => "PARSE",
            ClientError::StreamUnavailable { .. } => "STREAM_UNAVAILABLE",
            ClientError::Cancelled => "CANCELLED",
        }
    }
}
