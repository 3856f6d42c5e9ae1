//! Mock implementations for testing.
//!
//! - [`MockHttpClient`] - HTTP client with configurable responses
//! - [`RecordingSink`] - stream sink that records what it receives

pub mod http;
pub mod sink;

pub use http::{MockHttpClient, MockResponse, RecordedRequest};
pub use sink::{RecordingSink, SinkEvent};
