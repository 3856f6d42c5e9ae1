//! Request orchestration.
//!
//! [`Orchestrator`] wraps every backend endpoint in a typed call and adds
//! the multi-call protocols:
//! - direct calls, one request each
//! - [`compare`](Orchestrator::compare): two modes run one after the other
//! - [`submit_job`](Orchestrator::submit_job) / [`poll_job`](Orchestrator::poll_job)
//! - [`overview`](Orchestrator::overview): four status reads combined
//!
//! Nothing is retried and nothing is cached between calls.

mod comparison;
mod jobs;

pub use comparison::{elapsed_seconds, Comparison, ComparisonReport, ModeResult};
pub use jobs::JobSubmission;

use serde_json::Value;

use crate::backend::{BackendClient, RequestDescriptor};
use crate::error::ClientResult;
use crate::models::{
    AskRequest, ChainAskRequest, ChainStatus, HealthStatus, IndexRequest, Overview,
    PromptRequest, RagSources, RagStatus, SearchRequest,
};

pub const HEALTH_PATH: &str = "/health/";
pub const QUERY_SYNC_PATH: &str = "/query/sync";
pub const QUERY_ASYNC_PATH: &str = "/query/async";
pub const JOBS_PATH: &str = "/jobs";
pub const JOBS_SUBMIT_PATH: &str = "/jobs/submit";
pub const RAG_STATUS_PATH: &str = "/rag/status";
pub const RAG_SOURCES_PATH: &str = "/rag/sources";
pub const RAG_INDEX_PATH: &str = "/rag/index";
pub const RAG_SEARCH_PATH: &str = "/rag/search";
pub const RAG_ASK_PATH: &str = "/rag/ask-async";
pub const CHAINS_STATUS_PATH: &str = "/chains/status";
pub const CHAINS_ASK_PATH: &str = "/chains/ask-async";
pub const CHAINS_LOGS_PATH: &str = "/chains/tools/logs";
pub const DEMO_METRICS_PATH: &str = "/demo/metrics";
pub const DEMO_SYNC_PATH: &str = "/demo/sync";
pub const DEMO_ASYNC_PATH: &str = "/demo/async";

#[derive(Debug, Clone)]
pub struct Orchestrator {
    client: BackendClient,
}

impl Orchestrator {
    pub fn new(client: BackendClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &BackendClient {
        &self.client
    }

    /// Forward one request and return its body.
    pub async fn call(&self, request: &RequestDescriptor) -> ClientResult<Value> {
        Ok(self.client.call(request).await?.into_body())
    }

    async fn get(&self, path: &str) -> ClientResult<Value> {
        self.call(&RequestDescriptor::get(path)).await
    }

    async fn post<T: serde::Serialize>(&self, path: &str, body: &T) -> ClientResult<Value> {
        self.call(&RequestDescriptor::post_json(path, body)).await
    }

    pub async fn health(&self) -> ClientResult<Value> {
        self.get(HEALTH_PATH).await
    }

    pub async fn query_sync(&self, prompt: &str) -> ClientResult<Value> {
        self.post(QUERY_SYNC_PATH, &PromptRequest::new(prompt)).await
    }

    pub async fn query_async(&self, prompt: &str) -> ClientResult<Value> {
        self.post(QUERY_ASYNC_PATH, &PromptRequest::new(prompt)).await
    }

    /// Run two requests one after the other and compare their timings.
    ///
    /// The second request is only sent once the first has succeeded; if
    /// either fails the comparison fails with that error.
    pub async fn compare(
        &self,
        first: (&str, RequestDescriptor),
        second: (&str, RequestDescriptor),
    ) -> ClientResult<ComparisonReport> {
        let (first_mode, first_request) = first;
        let (second_mode, second_request) = second;

        let first_body = self.call(&first_request).await?;
        let second_body = self.call(&second_request).await?;

        let report = ComparisonReport::new(
            ModeResult::new(first_mode, first_body),
            ModeResult::new(second_mode, second_body),
        );
        tracing::debug!(
            faster = report.faster_mode(),
            delta = report.delta_seconds(),
            "comparison finished"
        );
        Ok(report)
    }

    /// Compare `/query/sync` against `/query/async` for the same prompt.
    pub async fn compare_query_modes(&self, prompt: &str) -> ClientResult<ComparisonReport> {
        let body = PromptRequest::new(prompt);
        self.compare(
            ("sync", RequestDescriptor::post_json(QUERY_SYNC_PATH, &body)),
            ("async", RequestDescriptor::post_json(QUERY_ASYNC_PATH, &body)),
        )
        .await
    }

    pub async fn rag_status(&self) -> ClientResult<Value> {
        self.get(RAG_STATUS_PATH).await
    }

    pub async fn rag_sources(&self) -> ClientResult<Value> {
        self.get(RAG_SOURCES_PATH).await
    }

    pub async fn rag_index(&self, rebuild: bool) -> ClientResult<Value> {
        self.post(RAG_INDEX_PATH, &IndexRequest { rebuild }).await
    }

    pub async fn rag_search(&self, query: &str, top_k: u32) -> ClientResult<Value> {
        let body = SearchRequest {
            query: query.to_string(),
            top_k,
        };
        self.post(RAG_SEARCH_PATH, &body).await
    }

    pub async fn rag_ask(&self, prompt: &str, top_k: u32) -> ClientResult<Value> {
        let body = AskRequest {
            prompt: prompt.to_string(),
            top_k,
        };
        self.post(RAG_ASK_PATH, &body).await
    }

    pub async fn chain_status(&self) -> ClientResult<Value> {
        self.get(CHAINS_STATUS_PATH).await
    }

    pub async fn chain_ask(&self, request: &ChainAskRequest) -> ClientResult<Value> {
        self.post(CHAINS_ASK_PATH, request).await
    }

    pub async fn chain_tool_logs(&self, limit: u32) -> ClientResult<Value> {
        let request = RequestDescriptor::get(CHAINS_LOGS_PATH).with_query("limit", &limit.to_string());
        self.call(&request).await
    }

    pub async fn demo_metrics(&self) -> ClientResult<Value> {
        self.get(DEMO_METRICS_PATH).await
    }

    pub async fn demo_sync(&self) -> ClientResult<Value> {
        self.get(DEMO_SYNC_PATH).await
    }

    pub async fn demo_async(&self) -> ClientResult<Value> {
        self.get(DEMO_ASYNC_PATH).await
    }

    /// Health, retrieval, chain and source status in one go.
    ///
    /// The four reads run concurrently on the current task; the first
    /// failure fails the whole overview.
    pub async fn overview(&self) -> ClientResult<Overview> {
        let requests = [
            RequestDescriptor::get(HEALTH_PATH),
            RequestDescriptor::get(RAG_STATUS_PATH),
            RequestDescriptor::get(CHAINS_STATUS_PATH),
            RequestDescriptor::get(RAG_SOURCES_PATH),
        ];
        let (health, rag, chains, sources) = tokio::try_join!(
            self.client.call(&requests[0]),
            self.client.call(&requests[1]),
            self.client.call(&requests[2]),
            self.client.call(&requests[3]),
        )?;

        Ok(Overview {
            health: health.json::<HealthStatus>()?,
            rag: rag.json::<RagStatus>()?,
            chains: chains.json::<ChainStatus>()?,
            sources: sources.json::<RagSources>()?,
        })
    }
}
