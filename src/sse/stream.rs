//! Lazy frame stream over a byte stream.

use std::collections::VecDeque;

use bytes::Bytes;
use futures_util::stream::{self, Stream, StreamExt};

use super::decoder::FrameDecoder;
use super::frame::Frame;
use crate::error::ClientError;
use crate::traits::HttpError;

struct State<S> {
    bytes: S,
    decoder: FrameDecoder,
    ready: VecDeque<Frame>,
    finished: bool,
}

/// Wrap a body stream into a stream of frames.
///
/// Frames are produced in arrival order, one at a time, pulling more bytes
/// only when none are ready. The stream ends when the body ends (the
/// unterminated remainder is dropped) or after the first transport error,
/// which is yielded once. It cannot be restarted.
pub fn frame_stream<S>(bytes: S) -> impl Stream<Item = Result<Frame, ClientError>> + Send
where
    S: Stream<Item = Result<Bytes, HttpError>> + Send + Unpin,
{
    let state = State {
        bytes,
        decoder: FrameDecoder::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        loop {
            if let Some(frame) = state.ready.pop_front() {
                return Some((Ok(frame), state));
            }
            if state.finished {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    state.ready.extend(state.decoder.feed(&chunk));
                }
                Some(Err(err)) => {
                    state.finished = true;
                    return Some((Err(ClientError::from(err)), state));
                }
                None => {
                    let dropped = state.decoder.finish();
                    if dropped > 0 {
                        tracing::debug!(dropped, "discarding unterminated event at end of stream");
                    }
                    state.finished = true;
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunks(parts: &[&'static str]) -> impl Stream<Item = Result<Bytes, HttpError>> + Send + Unpin {
        stream::iter(
            parts
                .iter()
                .copied()
                .map(|p| Ok(Bytes::from_static(p.as_bytes())))
                .collect::<Vec<_>>(),
        )
    }

    #[tokio::test]
    async fn test_frames_in_order_across_chunks() {
        let frames: Vec<_> = frame_stream(chunks(&[
            "event: metrics\nda",
            "ta: TTFT=0.1s\n\ndata: Hel",
            "lo\n\ndata: world\n\nevent: done\ndata: [DONE]\n\n",
        ]))
        .collect()
        .await;

        let frames: Vec<Frame> = frames.into_iter().map(Result::unwrap).collect();
        assert_eq!(
            frames,
            vec![
                Frame::new("metrics", "TTFT=0.1s"),
                Frame::message("Hello"),
                Frame::message("world"),
                Frame::new("done", "[DONE]"),
            ]
        );
    }

    #[tokio::test]
    async fn test_trailing_unterminated_event_dropped() {
        let frames: Vec<_> = frame_stream(chunks(&["data: a\n\ndata: b"])).collect().await;
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0].as_ref().unwrap(), &Frame::message("a"));
    }

    #[tokio::test]
    async fn test_transport_error_ends_stream() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"data: a\n\n")),
            Err(HttpError::Io("connection reset".to_string())),
            Ok(Bytes::from_static(b"data: never\n\n")),
        ]);

        let items: Vec<_> = frame_stream(body).collect().await;
        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(
            items[1],
            Err(ClientError::Network(HttpError::Io(_)))
        ));
    }

    #[tokio::test]
    async fn test_empty_body() {
        let frames: Vec<_> = frame_stream(chunks(&[])).collect().await;
        assert!(frames.is_empty());
    }
}
