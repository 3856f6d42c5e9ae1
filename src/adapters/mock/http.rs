//! Mock HTTP client for testing.
//!
//! Provides a configurable mock HTTP client that can return predefined
//! responses, scripted response sequences, or chunked streams.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::traits::{ByteStream, Headers, HttpClient, HttpError, Response, StreamResponse};

/// A recorded HTTP request for verification in tests.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// HTTP method (GET or POST)
    pub method: String,
    /// Request URL
    pub url: String,
    /// Request headers
    pub headers: Headers,
    /// Request body (for POST requests)
    pub body: Option<String>,
}

/// Configuration for a mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return a complete response
    Success(Response),
    /// Fail at the transport level
    Error(HttpError),
    /// Stream these chunks, then end
    Stream(Vec<Bytes>),
    /// Stream these chunks, then stay open until the reader gives up
    OpenStream(Vec<Bytes>),
    /// Stream these chunks, then fail the read
    StreamFailure { chunks: Vec<Bytes>, error: HttpError },
    /// Answer a stream request with this status and no readable body
    StreamUnavailable(u16),
}

impl MockResponse {
    /// Complete JSON response with the given status.
    pub fn json(status: u16, value: serde_json::Value) -> Self {
        MockResponse::Success(Response::new(status, value.to_string()))
    }

    /// Stream of chunks built from string slices.
    pub fn chunks(parts: &[&str]) -> Self {
        MockResponse::Stream(Self::chunk_bytes(parts))
    }

    /// Like [`chunks`](Self::chunks) but the stream never ends on its own.
    pub fn open_stream(parts: &[&str]) -> Self {
        MockResponse::OpenStream(Self::chunk_bytes(parts))
    }

    pub fn chunk_bytes(parts: &[&str]) -> Vec<Bytes> {
        parts.iter().map(|p| Bytes::from(p.to_string())).collect()
    }
}

/// Mock HTTP client for testing.
///
/// Responses are looked up by URL: queued responses first (consumed in
/// order), then fixed responses, then the default. Both lookups try an
/// exact match before the longest matching prefix.
///
/// # Example
///
/// ```ignore
/// let client = MockHttpClient::new();
/// client.set_response(
///     "http://backend/health/",
///     MockResponse::json(200, serde_json::json!({"status": "ok"})),
/// );
/// let response = client.get("http://backend/health/", &Headers::new()).await?;
/// assert_eq!(response.status, 200);
/// assert_eq!(client.get_requests().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    /// Configured responses by URL pattern
    responses: Arc<Mutex<HashMap<String, MockResponse>>>,
    /// One-shot responses consumed in order
    queued: Arc<Mutex<HashMap<String, VecDeque<MockResponse>>>>,
    /// Default response when no specific match
    default_response: Arc<Mutex<Option<MockResponse>>>,
    /// Recorded requests for verification
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn best_match<'a, V>(map: &'a HashMap<String, V>, url: &str) -> Option<&'a str> {
    if map.contains_key(url) {
        return map.get_key_value(url).map(|(k, _)| k.as_str());
    }
    map.keys()
        .filter(|pattern| url.starts_with(pattern.as_str()))
        .max_by_key(|pattern| pattern.len())
        .map(String::as_str)
}

impl MockHttpClient {
    /// Create a new mock HTTP client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a response for a URL (exact or prefix match).
    pub fn set_response(&self, url: &str, response: MockResponse) {
        locked(&self.responses).insert(url.to_string(), response);
    }

    /// Queue a one-shot response for a URL.
    ///
    /// Queued responses win over fixed ones and are consumed in order.
    pub fn push_response(&self, url: &str, response: MockResponse) {
        locked(&self.queued)
            .entry(url.to_string())
            .or_default()
            .push_back(response);
    }

    /// Set a default response for URLs without specific matches.
    pub fn set_default_response(&self, response: MockResponse) {
        *locked(&self.default_response) = Some(response);
    }

    /// Get all recorded requests.
    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        locked(&self.requests).clone()
    }

    /// Clear all recorded requests.
    pub fn clear_requests(&self) {
        locked(&self.requests).clear();
    }

    fn record_request(&self, method: &str, url: &str, headers: &Headers, body: Option<String>) {
        locked(&self.requests).push(RecordedRequest {
            method: method.to_string(),
            url: url.to_string(),
            headers: headers.clone(),
            body,
        });
    }

    fn get_response(&self, url: &str) -> Option<MockResponse> {
        {
            let mut queued = locked(&self.queued);
            if let Some(key) = best_match(&queued, url).map(str::to_string) {
                if let Some(response) = queued.get_mut(&key).and_then(VecDeque::pop_front) {
                    return Some(response);
                }
            }
        }

        {
            let responses = locked(&self.responses);
            if let Some(key) = best_match(&responses, url) {
                return responses.get(key).cloned();
            }
        }

        locked(&self.default_response).clone()
    }

    fn complete(&self, url: &str) -> Result<Response, HttpError> {
        match self.get_response(url) {
            Some(MockResponse::Success(response)) => Ok(response),
            Some(MockResponse::Error(err)) => Err(err),
            Some(_) => Err(HttpError::Other(
                "Stream response on non-stream request".to_string(),
            )),
            None => Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        }
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn get(&self, url: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("GET", url, headers, None);
        self.complete(url)
    }

    async fn post(&self, url: &str, body: &str, headers: &Headers) -> Result<Response, HttpError> {
        self.record_request("POST", url, headers, Some(body.to_string()));
        self.complete(url)
    }

    async fn get_stream(
        &self,
        url: &str,
        headers: &Headers,
    ) -> Result<StreamResponse, HttpError> {
        self.record_request("GET", url, headers, None);

        let body: ByteStream = match self.get_response(url) {
            Some(MockResponse::Stream(chunks)) => Box::pin(stream::iter(chunks.into_iter().map(Ok))),
            Some(MockResponse::OpenStream(chunks)) => Box::pin(
                stream::iter(chunks.into_iter().map(Ok)).chain(stream::pending()),
            ),
            Some(MockResponse::StreamFailure { chunks, error }) => Box::pin(
                stream::iter(chunks.into_iter().map(Ok)).chain(stream::once(async move { Err(error) })),
            ),
            Some(MockResponse::StreamUnavailable(status)) => {
                return Ok(StreamResponse::without_body(status));
            }
            Some(MockResponse::Error(err)) => return Err(err),
            Some(MockResponse::Success(_)) => {
                return Err(HttpError::Other(
                    "Non-stream response on stream request".to_string(),
                ));
            }
            None => return Err(HttpError::Other(format!("No mock response for URL: {}", url))),
        };

        Ok(StreamResponse::new(200, body))
    }
}
