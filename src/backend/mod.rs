//! Backend API client.
//!
//! [`BackendClient`] performs one request/response exchange against the
//! backend and normalizes the outcome into a [`ResponseEnvelope`] or a
//! [`ClientError`]. It also opens `text/event-stream` bodies for the
//! stream session manager.

mod envelope;
mod request;

pub use envelope::{into_envelope, status_text, ResponseEnvelope};
pub use request::{Method, RequestDescriptor};

use std::sync::Arc;

use crate::adapters::ReqwestHttpClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::traits::{ByteStream, Headers, HttpClient};

/// Client for the backend HTTP API.
///
/// Cheap to clone; clones share the underlying transport.
#[derive(Clone)]
pub struct BackendClient {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl BackendClient {
    /// Create a client for the configured backend using reqwest.
    pub fn new(config: &ClientConfig) -> Self {
        Self::with_http(&config.base_url, Arc::new(ReqwestHttpClient::new()))
    }

    /// Create a client over any transport (mocks in tests).
    pub fn with_http(base_url: &str, http: Arc<dyn HttpClient>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Issue one request and normalize the result.
    ///
    /// Bodies are sent as JSON and every request carries
    /// `Content-Type: application/json`. No retries.
    pub async fn call(&self, request: &RequestDescriptor) -> ClientResult<ResponseEnvelope> {
        let url = self.url(request.path());

        let mut headers = Headers::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.extend(request.headers().clone());

        tracing::debug!(method = request.method().as_str(), %url, "backend request");

        let response = match request.method() {
            Method::Get => self.http.get(&url, &headers).await,
            Method::Post => {
                let body = request.body().map(|b| b.to_string()).unwrap_or_default();
                self.http.post(&url, &body, &headers).await
            }
        }
        .map_err(|err| {
            tracing::warn!(%url, error = %err, "backend request failed");
            ClientError::from(err)
        })?;

        let status = response.status;
        let result = into_envelope(response);
        if let Err(ref err) = result {
            tracing::warn!(%url, status, code = err.error_code(), "backend returned an error");
        }
        result
    }

    /// Open a `text/event-stream` body.
    ///
    /// A non-2xx status or a response without a readable body fails with
    /// [`ClientError::StreamUnavailable`].
    pub async fn open_stream(&self, path: &str) -> ClientResult<ByteStream> {
        let url = self.url(path);

        let mut headers = Headers::new();
        headers.insert("Accept".to_string(), "text/event-stream".to_string());

        tracing::debug!(%url, "opening event stream");

        let response = self.http.get_stream(&url, &headers).await?;
        if !response.is_success() {
            return Err(ClientError::StreamUnavailable {
                status: Some(response.status),
            });
        }

        response.body.ok_or(ClientError::StreamUnavailable {
            status: Some(response.status),
        })
    }
}
