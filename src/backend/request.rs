//! Request descriptors.

use serde::Serialize;
use serde_json::Value;

use crate::traits::Headers;

/// HTTP method used by the backend endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// One backend request. Built once, then only read.
///
/// `path` is relative to the configured base URL and may carry a query
/// string (see [`RequestDescriptor::with_query`]).
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    path: String,
    method: Method,
    headers: Headers,
    body: Option<Value>,
}

impl RequestDescriptor {
    /// GET request without a body.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            method: Method::Get,
            headers: Headers::new(),
            body: None,
        }
    }

    /// POST request with a JSON body.
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self {
            path: path.into(),
            method: Method::Post,
            headers: Headers::new(),
            body: Some(body),
        }
    }

    /// POST request with a serializable body.
    pub fn post_json<T: Serialize>(path: impl Into<String>, body: &T) -> Self {
        // Plain data structs always serialize; Null only guards the signature.
        let body = serde_json::to_value(body).unwrap_or(Value::Null);
        Self::post(path, body)
    }

    /// Append a URL-encoded query parameter.
    pub fn with_query(mut self, key: &str, value: &str) -> Self {
        let separator = if self.path.contains('?') { '&' } else { '?' };
        self.path = format!(
            "{}{}{}={}",
            self.path,
            separator,
            urlencoding::encode(key),
            urlencoding::encode(value)
        );
        self
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}
