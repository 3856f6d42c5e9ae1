//! Orchestrator tests against wiremock.
//!
//! These tests verify the comparison, job and overview protocols end to end
//! over HTTP.

mod common;

use common::orchestrator_for;
use llm_console::models::{ChainAskRequest, JobHandle};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_query(server: &MockServer, mode: &str, elapsed: f64) {
    Mock::given(method("POST"))
        .and(path(format!("/query/{}", mode)))
        .and(body_json(json!({"prompt": "compare me"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "mode": mode,
            "output": "answer",
            "elapsed_seconds": elapsed
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_compare_equal_timings_prefers_sync() {
    let mock_server = MockServer::start().await;
    mount_query(&mock_server, "sync", 1.0).await;
    mount_query(&mock_server, "async", 1.0).await;

    let report = orchestrator_for(&mock_server)
        .compare_query_modes("compare me")
        .await
        .unwrap();

    assert_eq!(report.faster_mode(), "sync");
    assert_eq!(report.delta_seconds(), "0.000");
}

#[tokio::test]
async fn test_compare_faster_async() {
    let mock_server = MockServer::start().await;
    mount_query(&mock_server, "sync", 2.5).await;
    mount_query(&mock_server, "async", 1.25).await;

    let report = orchestrator_for(&mock_server)
        .compare_query_modes("compare me")
        .await
        .unwrap();

    assert_eq!(report.faster_mode(), "async");
    assert_eq!(report.delta_seconds(), "1.250");

    let value = serde_json::to_value(&report).unwrap();
    assert_eq!(value["sync"]["elapsed_seconds"], 2.5);
    assert_eq!(value["async"]["elapsed_seconds"], 1.25);
    assert_eq!(
        value["comparison"],
        json!({"faster_mode": "async", "delta_seconds": "1.250"})
    );
}

#[tokio::test]
async fn test_submit_then_poll_sees_backend_changes() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/jobs/submit"))
        .and(body_json(json!({"prompt": "summarize"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"job_id": "7f3c", "status": "accepted"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/7f3c"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "pending"})))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/jobs/7f3c"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "done", "result": "ok"})),
        )
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator_for(&mock_server);
    let submission = orchestrator.submit_job("summarize").await.unwrap();
    assert_eq!(submission.handle, JobHandle::new("7f3c"));

    let first = orchestrator.poll_job(&submission.handle).await.unwrap();
    let second = orchestrator.poll_job(&submission.handle).await.unwrap();

    assert_eq!(first, json!({"status": "pending"}));
    assert_eq!(second["status"], "done");
}

#[tokio::test]
async fn test_overview_reads_all_status_endpoints() {
    let mock_server = MockServer::start().await;
    for (route, body) in [
        (
            "/health/",
            json!({"status": "ok", "worker_running": false, "queue_size": 3}),
        ),
        (
            "/rag/status",
            json!({"indexed_chunks": 40, "embedding_model": "bge-small"}),
        ),
        (
            "/chains/status",
            json!({"chain_mode": "router", "tools": ["search", "math"]}),
        ),
        ("/rag/sources", json!({"files_detected": 5})),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let overview = orchestrator_for(&mock_server).overview().await.unwrap();

    assert!(overview.is_live());
    assert!(!overview.health.worker_running);
    let fields = overview.fields();
    assert_eq!(fields[1].1, "Stopped");
    assert_eq!(fields[5].1, "search, math");
    assert_eq!(fields[6].1, "bge-small");
}

#[tokio::test]
async fn test_chain_and_logs_requests() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chains/ask-async"))
        .and(body_json(json!({
            "prompt": "what is 2+2",
            "top_k": 4,
            "use_rag": false,
            "use_tools": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"answer": "4"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/chains/tools/logs"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"logs": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let orchestrator = orchestrator_for(&mock_server);
    let mut request = ChainAskRequest::new("what is 2+2", 4);
    request.use_rag = false;

    assert_eq!(
        orchestrator.chain_ask(&request).await.unwrap(),
        json!({"answer": "4"})
    );
    assert_eq!(
        orchestrator.chain_tool_logs(50).await.unwrap(),
        json!({"logs": []})
    );
}
