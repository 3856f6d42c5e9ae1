//! The console: runs commands and shows their results.

use std::future::Future;
use std::sync::Arc;

use serde_json::Value;
use tokio::task::JoinHandle;

use super::command::{Command, ParseError, HELP};
use super::render::{failure, overview_text, pretty, RenderSink, RenderStreamSink};
use crate::backend::BackendClient;
use crate::config::{validate_top_k, ClientConfig};
use crate::error::ClientResult;
use crate::models::{ChainAskRequest, JobHandle};
use crate::orchestrator::Orchestrator;
use crate::session::{SessionOutcome, StreamSessionManager};

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    /// The command was rejected or its request failed.
    Failed,
    Quit,
}

/// Command executor bound to one backend and one output.
pub struct Console {
    orchestrator: Orchestrator,
    sessions: StreamSessionManager,
    output: Arc<dyn RenderSink>,
    top_k: u32,
    tool_log_limit: u32,
    /// Prefills `/poll`; the orchestrator itself caches nothing
    last_job: Option<JobHandle>,
    stream: Option<JoinHandle<SessionOutcome>>,
}

impl Console {
    pub fn new(config: &ClientConfig, client: BackendClient, output: Arc<dyn RenderSink>) -> Self {
        Self {
            orchestrator: Orchestrator::new(client.clone()),
            sessions: StreamSessionManager::new(client),
            output,
            top_k: config.default_top_k,
            tool_log_limit: config.tool_log_limit,
            last_job: None,
            stream: None,
        }
    }

    pub fn sessions(&self) -> &StreamSessionManager {
        &self.sessions
    }

    pub fn top_k(&self) -> u32 {
        self.top_k
    }

    pub fn last_job(&self) -> Option<&JobHandle> {
        self.last_job.as_ref()
    }

    pub fn show(&self, text: &str) {
        self.output.set(text);
    }

    pub fn show_parse_error(&self, err: &ParseError) {
        if let ParseError::Unknown(name) = err {
            self.output
                .set(&format!("Unknown command {}. Type /help for a list.", name));
        }
    }

    pub async fn execute(&mut self, command: Command) -> Flow {
        tracing::debug!(?command, "executing command");

        match command {
            Command::Help => {
                self.output.set(&help_text());
                Flow::Continue
            }
            Command::Clear => {
                self.output.set("Console cleared.");
                Flow::Continue
            }
            Command::Quit => {
                self.sessions.stop();
                Flow::Quit
            }
            Command::Overview => self.refresh_overview().await,
            Command::Health => {
                self.run("Checking /health/...", "Health check", self.orchestrator.health())
                    .await
            }

            Command::QuerySync(prompt) => {
                if prompt.is_empty() {
                    return self.hint("Enter a prompt.");
                }
                self.run(
                    "Running /query/sync...",
                    "Sync query",
                    self.orchestrator.query_sync(&prompt),
                )
                .await
            }
            Command::QueryAsync(prompt) => {
                if prompt.is_empty() {
                    return self.hint("Enter a prompt.");
                }
                self.run(
                    "Running /query/async...",
                    "Async query",
                    self.orchestrator.query_async(&prompt),
                )
                .await
            }
            Command::Compare(prompt) => self.compare(&prompt).await,

            Command::JobSubmit(prompt) => self.submit_job(&prompt).await,
            Command::JobPoll(job_id) => self.poll_job(job_id).await,

            Command::Stream(prompt) => self.start_stream(&prompt),
            Command::Stop => {
                self.stop_stream();
                Flow::Continue
            }

            Command::RagIndex => {
                let flow = self
                    .run(
                        "Running RAG index...",
                        "RAG index",
                        self.orchestrator.rag_index(true),
                    )
                    .await;
                self.follow_with_overview(flow).await
            }
            Command::RagSearch(query) => {
                if query.is_empty() {
                    return self.hint("Enter a RAG query.");
                }
                self.run(
                    "Running RAG search...",
                    "RAG search",
                    self.orchestrator.rag_search(&query, self.top_k),
                )
                .await
            }
            Command::RagAsk(prompt) => {
                if prompt.is_empty() {
                    return self.hint("Enter a RAG prompt.");
                }
                self.run(
                    "Running RAG ask async...",
                    "RAG ask",
                    self.orchestrator.rag_ask(&prompt, self.top_k),
                )
                .await
            }
            Command::RagStatus => {
                self.run("Loading RAG status...", "RAG status", self.orchestrator.rag_status())
                    .await
            }
            Command::RagSources => {
                self.run(
                    "Loading RAG sources...",
                    "RAG sources",
                    self.orchestrator.rag_sources(),
                )
                .await
            }

            Command::ChainAsk {
                prompt,
                use_rag,
                use_tools,
            } => {
                if prompt.is_empty() {
                    return self.hint("Enter a chain prompt.");
                }
                let request = ChainAskRequest {
                    prompt,
                    top_k: self.top_k,
                    use_rag,
                    use_tools,
                };
                self.run("Running chain...", "Chain", self.orchestrator.chain_ask(&request))
                    .await
            }
            Command::ChainLogs => {
                self.run(
                    "Loading chain tool logs...",
                    "Tool logs",
                    self.orchestrator.chain_tool_logs(self.tool_log_limit),
                )
                .await
            }
            Command::ChainStatus => {
                self.run(
                    "Loading chain status...",
                    "Chain status",
                    self.orchestrator.chain_status(),
                )
                .await
            }

            Command::DemoMetrics => {
                self.run(
                    "Loading route latency metrics...",
                    "Metrics fetch",
                    self.orchestrator.demo_metrics(),
                )
                .await
            }
            Command::DemoSync => {
                self.run(
                    "Running /demo/sync (about 5 seconds)...",
                    "Demo sync",
                    self.orchestrator.demo_sync(),
                )
                .await
            }
            Command::DemoAsync => {
                self.run(
                    "Running /demo/async (about 5 seconds)...",
                    "Demo async",
                    self.orchestrator.demo_async(),
                )
                .await
            }

            Command::TopK(value) => self.set_top_k(value.as_deref()),
        }
    }

    /// Start streaming `prompt`, replacing any running stream.
    pub fn start_stream(&mut self, prompt: &str) -> Flow {
        if prompt.is_empty() {
            return self.hint("Enter a stream prompt.");
        }

        self.output.set("Streaming:\n");
        let sink = Arc::new(
            RenderStreamSink::new(Arc::clone(&self.output)).with_sessions(self.sessions.clone()),
        );
        let run = self.sessions.start(prompt, sink);
        tracing::debug!(session = %run.id(), "stream task spawned");

        // The replaced task, if any, was cancelled by `start` and ends on its own.
        self.stream = Some(run.spawn());
        Flow::Continue
    }

    /// Stop the running stream. Returns whether there was one.
    pub fn stop_stream(&self) -> bool {
        self.sessions.stop()
    }

    /// Wait for the most recently started stream to end.
    pub async fn finish_stream(&mut self) -> Option<SessionOutcome> {
        let handle = self.stream.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                tracing::warn!(error = %err, "stream task did not finish");
                None
            }
        }
    }

    fn hint(&self, text: &str) -> Flow {
        self.output.set(text);
        Flow::Failed
    }

    async fn run<F>(&self, progress: &str, action: &str, request: F) -> Flow
    where
        F: Future<Output = ClientResult<Value>>,
    {
        self.output.set(progress);
        match request.await {
            Ok(body) => {
                self.output.set(&pretty(&body));
                Flow::Continue
            }
            Err(err) => {
                self.output.set(&failure(action, &err));
                Flow::Failed
            }
        }
    }

    async fn refresh_overview(&self) -> Flow {
        self.output.set("Refreshing overview...");
        match self.orchestrator.overview().await {
            Ok(overview) => {
                self.output.set(&overview_text(&overview));
                Flow::Continue
            }
            Err(err) => {
                self.output.set(&failure("Overview refresh", &err));
                Flow::Failed
            }
        }
    }

    /// Show a fresh overview under the result of a command that changed
    /// backend state. A failed refresh is only logged.
    async fn follow_with_overview(&self, flow: Flow) -> Flow {
        if flow != Flow::Continue {
            return flow;
        }
        match self.orchestrator.overview().await {
            Ok(overview) => self
                .output
                .append(&format!("\n\n{}", overview_text(&overview))),
            Err(err) => {
                tracing::warn!(code = err.error_code(), error = %err, "overview refresh failed")
            }
        }
        flow
    }

    async fn compare(&self, prompt: &str) -> Flow {
        if prompt.is_empty() {
            return self.hint("Enter a prompt.");
        }

        self.output.set("Comparing /query/sync and /query/async...");
        match self.orchestrator.compare_query_modes(prompt).await {
            Ok(report) => {
                let text = serde_json::to_string_pretty(&report)
                    .unwrap_or_else(|err| format!("Compare failed:\n{}", err));
                self.output.set(&text);
                Flow::Continue
            }
            Err(err) => {
                self.output.set(&failure("Compare", &err));
                Flow::Failed
            }
        }
    }

    async fn submit_job(&mut self, prompt: &str) -> Flow {
        if prompt.is_empty() {
            return self.hint("Enter a job prompt.");
        }

        self.output.set("Submitting background job...");
        match self.orchestrator.submit_job(prompt).await {
            Ok(submission) => {
                self.output.set(&pretty(&submission.body));
                self.last_job = Some(submission.handle);
                self.follow_with_overview(Flow::Continue).await
            }
            Err(err) => {
                self.output.set(&failure("Job submit", &err));
                Flow::Failed
            }
        }
    }

    async fn poll_job(&self, job_id: Option<String>) -> Flow {
        let handle = match job_id {
            Some(id) => JobHandle::new(id),
            None => match &self.last_job {
                Some(handle) => handle.clone(),
                None => return self.hint("Enter or submit a job first."),
            },
        };

        let flow = self
            .run(
                &format!("Polling job {}...", handle),
                "Job poll",
                self.orchestrator.poll_job(&handle),
            )
            .await;
        self.follow_with_overview(flow).await
    }

    fn set_top_k(&mut self, value: Option<&str>) -> Flow {
        let Some(value) = value else {
            self.output.set(&format!("top_k = {}", self.top_k));
            return Flow::Continue;
        };

        match value.parse::<u32>().map_err(|_| value.to_string()) {
            Ok(n) => match validate_top_k(n) {
                Ok(n) => {
                    self.top_k = n;
                    self.output.set(&format!("top_k = {}", n));
                    Flow::Continue
                }
                Err(err) => self.hint(&err.to_string()),
            },
            Err(raw) => self.hint(&format!("top_k must be a number, got '{}'", raw)),
        }
    }
}

fn help_text() -> String {
    let width = HELP.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
    let mut text = String::from("Commands:\n");
    for (usage, description) in HELP {
        text.push_str(&format!("  {:<width$}  {}\n", usage, description, width = width));
    }
    text
}
