//! Stream session management.
//!
//! [`StreamSessionManager`] owns the single "current stream" slot. A
//! session reads `/stream/stream`, parses frames and hands them to a
//! [`StreamSink`] until the peer closes, the read fails, or it is stopped
//! or superseded.

mod manager;
mod sink;
mod state;

pub use manager::{SessionRun, StreamSessionManager, STREAM_PATH};
pub use sink::StreamSink;
pub use state::{SessionId, SessionOutcome, SessionState};
