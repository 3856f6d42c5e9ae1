//! Recording stream sink for testing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::session::{SessionId, SessionOutcome, StreamSink};
use crate::sse::Frame;

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone)]
pub enum SinkEvent {
    Frame(SessionId, Frame),
    Terminal(SessionId, SessionOutcome),
}

/// Sink that records every call, in order.
///
/// Tests can await a number of frames or terminal markers instead of
/// sleeping.
#[derive(Debug)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
    frame_count: watch::Sender<usize>,
    terminal_count: watch::Sender<usize>,
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            frame_count: watch::channel(0).0,
            terminal_count: watch::channel(0).0,
        }
    }
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> MutexGuard<'_, Vec<SinkEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.locked().clone()
    }

    /// Every delivered frame, across sessions.
    pub fn frames(&self) -> Vec<Frame> {
        self.locked()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Frame(_, frame) => Some(frame.clone()),
                SinkEvent::Terminal(..) => None,
            })
            .collect()
    }

    pub fn frames_for(&self, session: SessionId) -> Vec<Frame> {
        self.locked()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Frame(id, frame) if *id == session => Some(frame.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn terminals(&self) -> Vec<(SessionId, SessionOutcome)> {
        self.locked()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Terminal(id, outcome) => Some((*id, outcome.clone())),
                SinkEvent::Frame(..) => None,
            })
            .collect()
    }

    pub fn terminal_count(&self) -> usize {
        *self.terminal_count.borrow()
    }

    /// Wait until at least `count` frames were delivered.
    pub async fn wait_for_frames(&self, count: usize) {
        let mut rx = self.frame_count.subscribe();
        let _ = rx.wait_for(|n| *n >= count).await;
    }

    /// Wait until at least `count` sessions reported their outcome.
    pub async fn wait_for_terminals(&self, count: usize) {
        let mut rx = self.terminal_count.subscribe();
        let _ = rx.wait_for(|n| *n >= count).await;
    }
}

impl StreamSink for RecordingSink {
    fn on_frame(&self, session: SessionId, frame: &Frame) {
        self.locked().push(SinkEvent::Frame(session, frame.clone()));
        self.frame_count.send_modify(|n| *n += 1);
    }

    fn on_terminal(&self, session: SessionId, outcome: &SessionOutcome) {
        self.locked()
            .push(SinkEvent::Terminal(session, outcome.clone()));
        self.terminal_count.send_modify(|n| *n += 1);
    }
}
