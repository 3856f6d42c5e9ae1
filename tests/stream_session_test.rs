//! Stream session tests.
//!
//! Streams served by wiremock go through the real reqwest transport; the
//! supersession and stop scenarios that need a stream which stays open use
//! `MockHttpClient`.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{sessions_for, sse_body, sse_response};
use llm_console::adapters::mock::{MockHttpClient, MockResponse, RecordingSink, SinkEvent};
use llm_console::backend::BackendClient;
use llm_console::config::ClientConfig;
use llm_console::console::{BufferSink, Command, Console};
use llm_console::error::ClientError;
use llm_console::session::{SessionOutcome, SessionState, StreamSessionManager};
use llm_console::sse::Frame;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn mock_sessions(mock: &MockHttpClient) -> StreamSessionManager {
    StreamSessionManager::new(BackendClient::with_http(
        "http://backend",
        Arc::new(mock.clone()),
    ))
}

#[tokio::test]
async fn test_stream_over_http_delivers_frames_in_order() {
    let mock_server = MockServer::start().await;
    let body = sse_body(&[
        (Some("metrics"), "TTFT=0.250s"),
        (None, "Grüße"),
        (None, " aus 東京"),
        (Some("done"), "[DONE]"),
    ]);
    Mock::given(method("GET"))
        .and(path("/stream/stream"))
        .and(query_param("prompt", "say hi"))
        .respond_with(sse_response(body))
        .mount(&mock_server)
        .await;

    let sessions = sessions_for(&mock_server);
    let sink = Arc::new(RecordingSink::new());

    let outcome = sessions.start("say hi", sink.clone()).await;

    assert!(matches!(outcome, SessionOutcome::Completed { frames: 4 }));
    assert_eq!(
        sink.frames(),
        vec![
            Frame::new("metrics", "TTFT=0.250s"),
            Frame::message("Grüße"),
            Frame::message("aus 東京"),
            Frame::new("done", "[DONE]"),
        ]
    );
    assert_eq!(sessions.state(), SessionState::Idle);
}

#[tokio::test]
async fn test_stream_error_status_fails_without_frames() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/stream"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let sessions = sessions_for(&mock_server);
    let sink = Arc::new(RecordingSink::new());

    let outcome = sessions.start("x", sink.clone()).await;

    assert!(matches!(
        outcome,
        SessionOutcome::Failed(ClientError::StreamUnavailable { status: Some(500) })
    ));
    assert!(sink.frames().is_empty());
    assert_eq!(sink.terminal_count(), 1);
}

#[tokio::test]
async fn test_stop_while_opening_cancels() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/stream"))
        .respond_with(sse_response("data: late\n\n").set_delay(Duration::from_secs(30)))
        .mount(&mock_server)
        .await;

    let sessions = sessions_for(&mock_server);
    let sink = Arc::new(RecordingSink::new());

    let handle = sessions.start("slow", sink.clone()).spawn();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(sessions.state(), SessionState::Starting);

    assert!(sessions.stop());
    let outcome = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("cancellation should not wait for the response")
        .unwrap();

    assert!(outcome.is_cancelled());
    assert!(sink.frames().is_empty());
    assert_eq!(sink.terminal_count(), 1);
}

#[tokio::test]
async fn test_new_stream_supersedes_old_one_without_leaks() {
    let mock = MockHttpClient::new();
    // Old stream: one frame, then a multi-byte character split across
    // chunks that is still buffered when the new stream starts.
    mock.push_response(
        "http://backend/stream/stream",
        MockResponse::OpenStream(vec![
            "data: old-1\n\n".into(),
            b"data: old-\xe2\x82".to_vec().into(),
        ]),
    );
    mock.push_response(
        "http://backend/stream/stream",
        MockResponse::chunks(&["data: new-1\n\n", "data: new-2\n\n"]),
    );
    let sessions = mock_sessions(&mock);
    let sink = Arc::new(RecordingSink::new());

    let old = sessions.start("first", sink.clone());
    let old_id = old.id();
    let old = old.spawn();
    sink.wait_for_frames(1).await;

    let new = sessions.start("second", sink.clone());
    let new_id = new.id();
    assert_eq!(sessions.current_session(), Some(new_id));
    let new = new.spawn();

    sink.wait_for_terminals(2).await;
    assert!(old.await.unwrap().is_cancelled());
    assert!(matches!(
        new.await.unwrap(),
        SessionOutcome::Completed { frames: 2 }
    ));

    assert_eq!(sink.frames_for(old_id), vec![Frame::message("old-1")]);
    assert_eq!(
        sink.frames_for(new_id),
        vec![Frame::message("new-1"), Frame::message("new-2")]
    );

    let events = sink.events();
    let first_new_frame = events
        .iter()
        .position(|e| matches!(e, SinkEvent::Frame(id, _) if *id == new_id))
        .unwrap();
    assert!(events[first_new_frame..]
        .iter()
        .all(|e| !matches!(e, SinkEvent::Frame(id, _) if *id == old_id)));
}

#[tokio::test]
async fn test_stop_is_idempotent_and_reports_once() {
    let mock = MockHttpClient::new();
    mock.set_response(
        "http://backend/stream/stream",
        MockResponse::open_stream(&["data: tick\n\n"]),
    );
    let sessions = mock_sessions(&mock);
    let sink = Arc::new(RecordingSink::new());

    assert!(!sessions.stop());

    let handle = sessions.start("x", sink.clone()).spawn();
    sink.wait_for_frames(1).await;

    assert!(sessions.stop());
    assert!(!sessions.stop());
    assert!(handle.await.unwrap().is_cancelled());
    assert!(!sessions.stop());

    let terminals = sink.terminals();
    assert_eq!(terminals.len(), 1);
    assert!(terminals[0].1.is_cancelled());
}

#[tokio::test]
async fn test_read_failure_is_failed_not_cancelled() {
    let mock = MockHttpClient::new();
    mock.set_response(
        "http://backend/stream/stream",
        MockResponse::StreamFailure {
            chunks: MockResponse::chunk_bytes(&["data: partial\n\n"]),
            error: llm_console::traits::HttpError::Io("connection reset".to_string()),
        },
    );
    let sessions = mock_sessions(&mock);
    let sink = Arc::new(RecordingSink::new());

    let outcome = sessions.start("x", sink.clone()).await;

    match outcome {
        SessionOutcome::Failed(err) => assert_eq!(err.error_code(), "NETWORK"),
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(sink.frames(), vec![Frame::message("partial")]);
}

#[tokio::test]
async fn test_console_renders_stream_over_http() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stream/stream"))
        .respond_with(sse_response(sse_body(&[
            (Some("metrics"), "TTFT=0.1s"),
            (None, "Hello"),
            (Some("done"), "[DONE]"),
        ])))
        .mount(&mock_server)
        .await;

    let output = Arc::new(BufferSink::new());
    let mut console = Console::new(
        &ClientConfig::default(),
        common::client_for(&mock_server),
        output.clone(),
    );

    console.execute(Command::Stream("hi".to_string())).await;
    console.finish_stream().await;

    assert_eq!(
        output.contents(),
        "Streaming:\n\n\n[metrics] TTFT=0.1sHello\n\n[DONE]"
    );
}
