//! Common test utilities for integration tests.
//!
//! Helpers for pointing the real reqwest transport at a
//! `wiremock::MockServer` and for building event-stream bodies.

#![allow(dead_code)]

use std::sync::Arc;

use llm_console::adapters::ReqwestHttpClient;
use llm_console::backend::BackendClient;
use llm_console::orchestrator::Orchestrator;
use llm_console::session::StreamSessionManager;
use wiremock::{MockServer, ResponseTemplate};

/// Backend client using reqwest against the mock server.
pub fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::with_http(&server.uri(), Arc::new(ReqwestHttpClient::new()))
}

pub fn orchestrator_for(server: &MockServer) -> Orchestrator {
    Orchestrator::new(client_for(server))
}

pub fn sessions_for(server: &MockServer) -> StreamSessionManager {
    StreamSessionManager::new(client_for(server))
}

/// Event-stream text for `(event, data)` pairs; `None` omits the event line.
pub fn sse_body(frames: &[(Option<&str>, &str)]) -> String {
    frames
        .iter()
        .map(|(event, data)| match event {
            Some(event) => format!("event: {}\ndata: {}\n\n", event, data),
            None => format!("data: {}\n\n", data),
        })
        .collect()
}

/// 200 response carrying an event-stream body.
pub fn sse_response(body: impl Into<String>) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/event-stream")
        .set_body_string(body.into())
}
