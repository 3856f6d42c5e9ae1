//! Response envelopes and body decoding.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ClientError, ClientResult};
use crate::traits::Response;

/// A successful (2xx) backend response with its decoded JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseEnvelope {
    pub status: u16,
    pub body: Value,
}

impl ResponseEnvelope {
    /// Deserialize the body into a typed payload.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        T::deserialize(&self.body).map_err(ClientError::parse)
    }

    pub fn into_body(self) -> Value {
        self.body
    }
}

/// Canonical reason phrase for a status code, empty when unknown.
pub fn status_text(status: u16) -> &'static str {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|code| code.canonical_reason())
        .unwrap_or("")
}

/// Decode a body as JSON; an empty body is an empty object.
fn decode_body(text: &str) -> Result<Value, serde_json::Error> {
    if text.is_empty() {
        Ok(Value::Object(serde_json::Map::new()))
    } else {
        serde_json::from_str(text)
    }
}

/// Turn a raw response into an envelope or a [`ClientError`].
///
/// Success is decided by the status class alone. Failed responses keep
/// their body for display: decoded when it is JSON, raw text otherwise.
pub fn into_envelope(response: Response) -> ClientResult<ResponseEnvelope> {
    let text = response.text();

    if response.is_success() {
        let body = decode_body(&text).map_err(ClientError::parse)?;
        return Ok(ResponseEnvelope {
            status: response.status,
            body,
        });
    }

    let body = decode_body(&text).unwrap_or(Value::String(text));
    Err(ClientError::HttpStatus {
        status: response.status,
        status_text: status_text(response.status).to_string(),
        body,
    })
}
