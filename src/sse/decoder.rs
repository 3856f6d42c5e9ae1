//! Incremental frame decoder.
//!
//! Bytes are buffered raw and only complete segments are decoded as UTF-8.
//! The `\n\n` delimiter never occurs inside a multi-byte sequence, so a
//! character split across chunks is reassembled before it is decoded.

use super::frame::Frame;

const DELIMITER: &[u8] = b"\n\n";

/// Stateful decoder that turns arbitrary byte chunks into frames.
///
/// The output for a payload does not depend on how it was chunked.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buffer: Vec<u8>,
    /// Offset before which the buffer holds no delimiter
    scan_from: usize,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return every frame it completed, in order.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        self.buffer.extend_from_slice(chunk);

        let mut frames = Vec::new();
        let mut start = 0;
        let mut search = self.scan_from;

        while let Some(offset) = find_delimiter(&self.buffer[search..]) {
            let end = search + offset;
            let segment = &self.buffer[start..end];
            if !segment.is_empty() {
                frames.push(Frame::from_segment(&String::from_utf8_lossy(segment)));
            }
            start = end + DELIMITER.len();
            search = start;
        }

        if start > 0 {
            self.buffer.drain(..start);
        }
        // A delimiter may straddle this chunk and the next one.
        self.scan_from = self.buffer.len().saturating_sub(DELIMITER.len() - 1);

        frames
    }

    /// Bytes held back waiting for a delimiter.
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    /// End of input: discard the unterminated remainder.
    ///
    /// Returns how many bytes were dropped.
    pub fn finish(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        self.scan_from = 0;
        dropped
    }
}

fn find_delimiter(haystack: &[u8]) -> Option<usize> {
    haystack
        .windows(DELIMITER.len())
        .position(|window| window == DELIMITER)
}
