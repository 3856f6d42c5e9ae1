//! Where a session delivers what it reads.

use super::state::{SessionId, SessionOutcome};
use crate::sse::Frame;

/// Receiver for one or more stream sessions.
///
/// `on_frame` is called in arrival order and never after the session was
/// stopped or superseded. `on_terminal` is called exactly once per session
/// that ran. Both are called from the session task and must not block.
pub trait StreamSink: Send + Sync {
    fn on_frame(&self, session: SessionId, frame: &Frame);

    fn on_terminal(&self, session: SessionId, outcome: &SessionOutcome);
}
