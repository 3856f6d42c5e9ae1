//! Rendering sinks and display text.
//!
//! A [`RenderSink`] receives opaque display strings. The console either
//! replaces what is shown (`set`) or adds to it (`append`); stream output is
//! appended token by token.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;

use crate::error::ClientError;
use crate::models::Overview;
use crate::session::{SessionId, SessionOutcome, StreamSessionManager, StreamSink};
use crate::sse::{Frame, FrameKind};

pub const DONE_MARKER: &str = "[DONE]";
pub const METRICS_MARKER: &str = "[metrics]";
pub const STOPPED_MARKER: &str = "[stream stopped]";

/// Destination for console output.
pub trait RenderSink: Send + Sync {
    /// Replace the current output.
    fn set(&self, text: &str);

    /// Add to the current output.
    fn append(&self, text: &str);
}

/// Writes to stdout.
///
/// `set` starts on a fresh line; `append` writes in place and flushes so
/// streamed tokens show up as they arrive.
#[derive(Debug)]
pub struct StdoutSink {
    at_line_start: AtomicBool,
}

impl Default for StdoutSink {
    fn default() -> Self {
        Self {
            at_line_start: AtomicBool::new(true),
        }
    }
}

impl StdoutSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn write(&self, text: &str, fresh_line: bool) {
        let mut out = std::io::stdout().lock();
        let needs_break = fresh_line && !self.at_line_start.load(Ordering::Relaxed);

        let result = (|| {
            if needs_break {
                out.write_all(b"\n")?;
            }
            out.write_all(text.as_bytes())?;
            if fresh_line && !text.ends_with('\n') {
                out.write_all(b"\n")?;
            }
            out.flush()
        })();
        if let Err(err) = result {
            tracing::debug!(error = %err, "stdout write failed");
            return;
        }

        if fresh_line || !text.is_empty() {
            self.at_line_start
                .store(fresh_line || text.ends_with('\n'), Ordering::Relaxed);
        }
    }
}

impl RenderSink for StdoutSink {
    fn set(&self, text: &str) {
        self.write(text, true);
    }

    fn append(&self, text: &str) {
        self.write(text, false);
    }
}

/// Keeps the output in memory.
///
/// Behaves like a text area: `set` replaces the content, `append` extends
/// it.
#[derive(Debug, Default)]
pub struct BufferSink {
    content: Mutex<String>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        self.content
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RenderSink for BufferSink {
    fn set(&self, text: &str) {
        let mut content = self.content.lock().unwrap_or_else(PoisonError::into_inner);
        content.clear();
        content.push_str(text);
    }

    fn append(&self, text: &str) {
        self.content
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(text);
    }
}

/// Two-space indented JSON.
pub fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// `"<Action> failed:\n<message>"`
pub fn failure(action: &str, err: &ClientError) -> String {
    format!("{} failed:\n{}", action, err.user_message())
}

/// Text appended for one stream frame.
pub fn frame_text(frame: &Frame) -> String {
    match frame.kind() {
        FrameKind::Done => format!("\n\n{}", DONE_MARKER),
        FrameKind::Metrics => format!("\n\n{} {}", METRICS_MARKER, frame.data),
        FrameKind::Message | FrameKind::Other(_) => frame.data.clone(),
    }
}

/// Terminal marker for a session, if its outcome has one.
///
/// A completed stream has already shown everything it had to say.
pub fn outcome_text(outcome: &SessionOutcome) -> Option<String> {
    match outcome {
        SessionOutcome::Completed { .. } => None,
        SessionOutcome::Cancelled => Some(format!("\n\n{}", STOPPED_MARKER)),
        SessionOutcome::Failed(err) => Some(format!("\n\nStream failed:\n{}", err.user_message())),
    }
}

pub fn overview_text(overview: &Overview) -> String {
    let fields = overview.fields();
    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);

    let mut text = format!(
        "Backend: {}\n",
        if overview.is_live() { "live" } else { "down" }
    );
    for (label, value) in fields {
        text.push_str(&format!("{:<width$}  {}\n", label, value, width = width));
    }
    text
}

/// Forwards stream frames and terminal markers to a [`RenderSink`].
pub struct RenderStreamSink {
    target: Arc<dyn RenderSink>,
    sessions: Option<StreamSessionManager>,
}

impl RenderStreamSink {
    pub fn new(target: Arc<dyn RenderSink>) -> Self {
        Self {
            target,
            sessions: None,
        }
    }

    /// Drop the terminal marker of a session that a newer one replaced,
    /// so it does not land under the newer session's output.
    pub fn with_sessions(mut self, sessions: StreamSessionManager) -> Self {
        self.sessions = Some(sessions);
        self
    }

    fn superseded(&self, session: SessionId) -> bool {
        self.sessions
            .as_ref()
            .and_then(StreamSessionManager::current_session)
            .is_some_and(|current| current != session)
    }
}

impl StreamSink for RenderStreamSink {
    fn on_frame(&self, _session: SessionId, frame: &Frame) {
        self.target.append(&frame_text(frame));
    }

    fn on_terminal(&self, session: SessionId, outcome: &SessionOutcome) {
        if self.superseded(session) {
            tracing::debug!(%session, "skipping marker of superseded stream");
            return;
        }
        if let Some(text) = outcome_text(outcome) {
            self.target.append(&text);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockHttpClient;
    use crate::backend::BackendClient;
    use serde_json::json;

    #[test]
    fn test_frame_markers() {
        assert_eq!(frame_text(&Frame::message("Hel")), "Hel");
        assert_eq!(
            frame_text(&Frame::new("metrics", "TTFT=0.3s")),
            "\n\n[metrics] TTFT=0.3s"
        );
        assert_eq!(frame_text(&Frame::new("done", "[DONE]")), "\n\n[DONE]");
        assert_eq!(frame_text(&Frame::new("heartbeat", "x")), "x");
    }

    #[test]
    fn test_outcome_markers() {
        assert_eq!(outcome_text(&SessionOutcome::Completed { frames: 2 }), None);
        assert_eq!(
            outcome_text(&SessionOutcome::Cancelled).as_deref(),
            Some("\n\n[stream stopped]")
        );
        assert_eq!(
            outcome_text(&SessionOutcome::Failed(ClientError::StreamUnavailable {
                status: Some(503)
            }))
            .as_deref(),
            Some("\n\nStream failed:\nStream unavailable (503)")
        );
    }

    #[test]
    fn test_failure_includes_status_and_body() {
        let err = ClientError::HttpStatus {
            status: 404,
            status_text: "Not Found".to_string(),
            body: json!({"detail": "not found"}),
        };
        assert_eq!(
            failure("Job poll", &err),
            "Job poll failed:\n404 Not Found\n{\n  \"detail\": \"not found\"\n}"
        );
    }

    #[test]
    fn test_buffer_sink_set_replaces_append_extends() {
        let sink = BufferSink::new();
        sink.set("Streaming:\n");
        sink.append("Hello");
        sink.append(" world");
        assert_eq!(sink.contents(), "Streaming:\nHello world");

        sink.set("Console cleared.");
        assert_eq!(sink.contents(), "Console cleared.");
    }

    #[test]
    fn test_render_stream_sink_forwards() {
        let buffer = Arc::new(BufferSink::new());
        let sink = RenderStreamSink::new(buffer.clone());
        let id = crate::session::SessionId::new();

        sink.on_frame(id, &Frame::message("a"));
        sink.on_frame(id, &Frame::new("done", ""));
        sink.on_terminal(id, &SessionOutcome::Cancelled);

        assert_eq!(buffer.contents(), "a\n\n[DONE]\n\n[stream stopped]");
    }

    #[tokio::test]
    async fn test_superseded_stream_marker_is_skipped() {
        let client = BackendClient::with_http("http://backend", Arc::new(MockHttpClient::new()));
        let sessions = StreamSessionManager::new(client);
        let buffer = Arc::new(BufferSink::new());
        let sink = || {
            Arc::new(RenderStreamSink::new(buffer.clone()).with_sessions(sessions.clone()))
        };

        let first = sessions.start("one", sink());
        let second = sessions.start("two", sink());
        assert!(first.await.is_cancelled());
        assert_eq!(buffer.contents(), "");

        sessions.stop();
        assert!(second.await.is_cancelled());
        assert_eq!(buffer.contents(), "\n\n[stream stopped]");
    }

    #[test]
    fn test_overview_text_aligns_labels() {
        let text = overview_text(&Overview::default());
        assert!(text.starts_with("Backend: down\n"));
        assert!(text.contains("Service           -\n"));
        assert!(text.contains("Sources detected  -\n"));
    }
}
