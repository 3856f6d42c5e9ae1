//! Event-stream (`text/event-stream`) frame parser.
//!
//! The backend streams answers as:
//! - `event: metrics` / `data: TTFT=...` - first-token telemetry
//! - `data: <token>` - payload text (event name defaults to `message`)
//! - `event: done` / `data: [DONE]` - end-of-answer marker
//!
//! Frames are separated by a blank line (`\n\n`).
//!
//! # Module structure
//! - `frame` - [`Frame`], [`FrameKind`] and segment field extraction
//! - `decoder` - push-style [`FrameDecoder`] fed with raw chunks
//! - `stream` - pull-style [`frame_stream`] over a body stream

mod decoder;
mod frame;
mod stream;

pub use decoder::FrameDecoder;
pub use frame::{Frame, FrameKind, DEFAULT_EVENT};
pub use stream::frame_stream;
