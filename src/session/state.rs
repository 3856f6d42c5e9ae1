//! Session identifiers, lifecycle states and outcomes.

use std::fmt;

use uuid::Uuid;

use crate::error::ClientError;

/// Opaque identifier, one per `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first block is enough to tell sessions apart in logs.
        let full = self.0.simple().to_string();
        f.write_str(&full[..8])
    }
}

/// Lifecycle of a stream session.
///
/// ```text
/// Idle -> Starting -> Streaming -> {Completed | Cancelled | Failed} -> Idle
///            \-> Failed | Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Starting,
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl SessionState {
    /// Starting or Streaming.
    pub fn is_live(&self) -> bool {
        matches!(self, SessionState::Starting | SessionState::Streaming)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Cancelled | SessionState::Failed
        )
    }

    pub fn can_transition_to(&self, next: SessionState) -> bool {
        use SessionState::*;
        match (self, next) {
            (Idle, Starting) => true,
            (Starting, Streaming | Cancelled | Failed) => true,
            (Streaming, Completed | Cancelled | Failed) => true,
            (Completed | Cancelled | Failed, Idle) => true,
            _ => false,
        }
    }
}

/// How a session ended. Reported once per session.
#[derive(Debug, Clone)]
pub enum SessionOutcome {
    /// The peer closed the stream.
    Completed { frames: usize },
    /// `stop()` or a newer `start()` ended it.
    Cancelled,
    /// The stream could not be opened or the read failed.
    Failed(ClientError),
}

impl SessionOutcome {
    /// Terminal state this outcome corresponds to.
    pub fn state(&self) -> SessionState {
        match self {
            SessionOutcome::Completed { .. } => SessionState::Completed,
            SessionOutcome::Cancelled => SessionState::Cancelled,
            SessionOutcome::Failed(_) => SessionState::Failed,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, SessionOutcome::Cancelled)
    }
}
