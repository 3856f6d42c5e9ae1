//! Single-slot stream session manager.

use std::future::IntoFuture;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_util::future::BoxFuture;
use futures_util::{FutureExt, StreamExt};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::sink::StreamSink;
use super::state::{SessionId, SessionOutcome, SessionState};
use crate::backend::{BackendClient, RequestDescriptor};
use crate::error::ClientError;
use crate::sse::frame_stream;

/// Streaming endpoint; the prompt goes in the `prompt` query parameter.
pub const STREAM_PATH: &str = "/stream/stream";

struct ActiveSession {
    id: SessionId,
    cancel: CancellationToken,
    state: SessionState,
}

struct Shared {
    client: BackendClient,
    current: Mutex<Option<ActiveSession>>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Option<ActiveSession>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Move the session to `next` if it is still current.
    fn transition(&self, id: SessionId, next: SessionState) -> bool {
        let mut current = self.lock();
        match current.as_mut() {
            Some(session) if session.id == id && session.state.can_transition_to(next) => {
                tracing::debug!(session = %id, from = ?session.state, to = ?next, "stream state");
                session.state = next;
                true
            }
            _ => false,
        }
    }

    /// Release the slot if `id` still holds it.
    fn release(&self, id: SessionId) {
        let mut current = self.lock();
        if current.as_ref().is_some_and(|session| session.id == id) {
            *current = None;
        }
    }

    async fn drive(
        &self,
        id: SessionId,
        cancel: &CancellationToken,
        path: &str,
        sink: &dyn StreamSink,
    ) -> SessionOutcome {
        let opened = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(ClientError::Cancelled),
            opened = self.client.open_stream(path) => opened,
        };

        let body = match opened {
            Ok(body) => body,
            Err(err) => return outcome_of(err),
        };

        if !self.transition(id, SessionState::Streaming) {
            return SessionOutcome::Cancelled;
        }

        let frames = frame_stream(body);
        futures_util::pin_mut!(frames);
        let mut delivered = 0;

        loop {
            let next = tokio::select! {
                biased;
                () = cancel.cancelled() => Some(Err(ClientError::Cancelled)),
                next = frames.next() => next,
            };

            match next {
                Some(Ok(frame)) => {
                    // No await between this check and delivery.
                    if cancel.is_cancelled() {
                        return SessionOutcome::Cancelled;
                    }
                    sink.on_frame(id, &frame);
                    delivered += 1;
                }
                Some(Err(err)) => return outcome_of(err),
                None => return SessionOutcome::Completed { frames: delivered },
            }
        }
    }
}

fn outcome_of(err: ClientError) -> SessionOutcome {
    if err.is_cancelled() {
        SessionOutcome::Cancelled
    } else {
        SessionOutcome::Failed(err)
    }
}

/// Everything one session needs to end cleanly.
///
/// Created by `start` and moved into the session future. Dropping it
/// before [`finish`](Self::finish) (the future was dropped unpolled,
/// timed out or aborted) cancels the session, frees the slot and reports
/// `Cancelled` to the sink.
struct SessionGuard {
    shared: Arc<Shared>,
    id: SessionId,
    cancel: CancellationToken,
    sink: Arc<dyn StreamSink>,
    finished: bool,
}

impl SessionGuard {
    async fn run(self, path: String) -> SessionOutcome {
        let outcome = self
            .shared
            .drive(self.id, &self.cancel, &path, self.sink.as_ref())
            .await;
        self.finish(&outcome);
        outcome
    }

    fn finish(mut self, outcome: &SessionOutcome) {
        self.finished = true;
        self.shared.transition(self.id, outcome.state());
        self.shared.release(self.id);

        match outcome {
            SessionOutcome::Completed { frames } => {
                tracing::info!(session = %self.id, frames, "stream completed")
            }
            SessionOutcome::Cancelled => tracing::info!(session = %self.id, "stream cancelled"),
            SessionOutcome::Failed(err) => {
                tracing::warn!(session = %self.id, code = err.error_code(), error = %err, "stream failed")
            }
        }

        self.sink.on_terminal(self.id, outcome);
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        self.cancel.cancel();
        self.shared.release(self.id);
        tracing::info!(session = %self.id, "stream dropped before it finished");
        self.sink.on_terminal(self.id, &SessionOutcome::Cancelled);
    }
}

/// Owns the process-wide "current stream" slot.
///
/// At most one session is live at a time. [`start`](Self::start) replaces
/// the slot and cancels the previous occupant in one critical section, so
/// two sessions are never current at once. Clones share the slot.
#[derive(Clone)]
pub struct StreamSessionManager {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for StreamSessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSessionManager")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl StreamSessionManager {
    pub fn new(client: BackendClient) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                current: Mutex::new(None),
            }),
        }
    }

    /// Start streaming the answer to `prompt` into `sink`.
    ///
    /// Any live session is cancelled before this returns. The returned
    /// [`SessionRun`] does the network work; await it or
    /// [`spawn`](SessionRun::spawn) it. Dropping it before it finishes,
    /// polled or not, cancels the session and frees the slot.
    pub fn start(&self, prompt: &str, sink: Arc<dyn StreamSink>) -> SessionRun {
        let id = SessionId::new();
        let cancel = CancellationToken::new();

        {
            let mut current = self.shared.lock();
            if let Some(previous) = current.take() {
                previous.cancel.cancel();
                tracing::info!(session = %previous.id, superseded_by = %id, "cancelling previous stream");
            }
            *current = Some(ActiveSession {
                id,
                cancel: cancel.clone(),
                state: SessionState::Starting,
            });
        }

        tracing::debug!(session = %id, "stream starting");

        let path = RequestDescriptor::get(STREAM_PATH)
            .with_query("prompt", prompt)
            .path()
            .to_string();
        let guard = SessionGuard {
            shared: Arc::clone(&self.shared),
            id,
            cancel,
            sink,
            finished: false,
        };
        let future = guard.run(path).boxed();

        SessionRun { id, future }
    }

    /// Cancel the current session, if any.
    ///
    /// Returns whether a session was cancelled. Calling it again, or with
    /// nothing running, does nothing.
    pub fn stop(&self) -> bool {
        let Some(session) = self.shared.lock().take() else {
            return false;
        };
        session.cancel.cancel();
        tracing::info!(session = %session.id, "stream stop requested");
        true
    }

    /// State of the current session, `Idle` when there is none.
    ///
    /// A session leaves the slot as soon as it ends, so the terminal
    /// states are reported through [`SessionOutcome`] and this reads
    /// `Idle` afterwards.
    pub fn state(&self) -> SessionState {
        self.shared
            .lock()
            .as_ref()
            .map_or(SessionState::Idle, |session| session.state)
    }

    pub fn current_session(&self) -> Option<SessionId> {
        self.shared.lock().as_ref().map(|session| session.id)
    }

    pub fn is_streaming(&self) -> bool {
        self.state().is_live()
    }
}

/// The work of one session, returned by [`StreamSessionManager::start`].
#[must_use = "a session does nothing until it is awaited or spawned"]
pub struct SessionRun {
    id: SessionId,
    future: BoxFuture<'static, SessionOutcome>,
}

impl SessionRun {
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Run on the tokio runtime.
    pub fn spawn(self) -> JoinHandle<SessionOutcome> {
        tokio::spawn(self.future)
    }
}

impl std::fmt::Debug for SessionRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRun").field("id", &self.id).finish()
    }
}

impl IntoFuture for SessionRun {
    type Output = SessionOutcome;
    type IntoFuture = BoxFuture<'static, SessionOutcome>;

    fn into_future(self) -> Self::IntoFuture {
        self.future
    }
}
