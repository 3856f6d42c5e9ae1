//! Frame type and per-segment field extraction.

/// Event name used when a segment has no `event:` line.
pub const DEFAULT_EVENT: &str = "message";

/// One `(event, data)` unit extracted from an event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: String,
    pub data: String,
}

/// What the console does with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameKind<'a> {
    /// Payload text, shown verbatim
    Message,
    /// Side-channel telemetry (e.g. `TTFT=0.412s`)
    Metrics,
    /// End-of-answer marker; the transport closes on its own
    Done,
    /// Anything else the backend may send
    Other(&'a str),
}

impl Frame {
    pub fn new(event: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            data: data.into(),
        }
    }

    /// A frame with the default event name.
    pub fn message(data: impl Into<String>) -> Self {
        Self::new(DEFAULT_EVENT, data)
    }

    pub fn kind(&self) -> FrameKind<'_> {
        match self.event.as_str() {
            "message" => FrameKind::Message,
            "metrics" => FrameKind::Metrics,
            "done" => FrameKind::Done,
            other => FrameKind::Other(other),
        }
    }

    /// Extract a frame from one delimiter-free segment.
    ///
    /// `event:` and `data:` values are trimmed. When a field appears more
    /// than once the last occurrence wins, so multi-line `data:` payloads
    /// keep only their final line. Other lines, comments included, are
    /// ignored.
    pub fn from_segment(segment: &str) -> Self {
        let mut event = DEFAULT_EVENT;
        let mut data = "";

        for line in segment.split('\n') {
            if let Some(rest) = line.strip_prefix("event:") {
                event = rest.trim();
            }
            if let Some(rest) = line.strip_prefix("data:") {
                data = rest.trim();
            }
        }

        Self::new(event, data)
    }
}
