//! Upstream-to-caller SSE stream relay
//!
//! [`relay_stream`] turns the raw upstream SSE byte stream into the
//! caller-facing frame format, one `data: {"content": ...}\n\n` frame per
//! decoded delta, terminated by `data: [DONE]\n\n`. The output stream ends
//! immediately after the terminal frame; remaining upstream input is not
//! read. Dropping the output stream drops the upstream body, which cancels
//! the in-flight read on caller disconnect.

mod sse;

pub use sse::{RelayEvent, SseLineParser, DONE_SENTINEL};

use std::collections::VecDeque;

use bytes::Bytes;
use futures::stream::BoxStream;
use futures::{Stream, StreamExt};

use crate::providers::ProviderError;

/// Caller-facing SSE frame stream.
pub type RelayStream = BoxStream<'static, Result<Bytes, ProviderError>>;

struct RelayState<E> {
    upstream: BoxStream<'static, Result<Bytes, E>>,
    parser: SseLineParser,
    pending: VecDeque<RelayEvent>,
    failed: bool,
}

/// Re-encode an upstream SSE byte stream as caller-facing SSE frames.
///
/// An upstream read error is yielded once as a stream error, after which
/// the stream ends; the connection handler aborts the response on it.
pub fn relay_stream<S, E>(upstream: S) -> RelayStream
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    E: Into<ProviderError> + Send + 'static,
{
    let state = RelayState {
        upstream: upstream.boxed(),
        parser: SseLineParser::new(),
        pending: VecDeque::new(),
        failed: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((Ok(event.to_sse()), state));
            }
            if state.failed || state.parser.is_done() {
                return None;
            }
            match state.upstream.next().await {
                Some(Ok(chunk)) => {
                    state.pending.extend(state.parser.feed(&chunk));
                }
                Some(Err(e)) => {
                    state.failed = true;
                    return Some((Err(e.into()), state));
                }
                None => return None,
            }
        }
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn upstream(
        chunks: Vec<Result<Bytes, ProviderError>>,
    ) -> impl Stream<Item = Result<Bytes, ProviderError>> + Send + 'static {
        stream::iter(chunks)
    }

    async fn collect_frames(s: RelayStream) -> Vec<Result<Bytes, ProviderError>> {
        s.collect().await
    }

    #[tokio::test]
    async fn test_documented_scenario() {
        let frames = collect_frames(relay_stream(upstream(vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            )),
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n",
            )),
            Ok(Bytes::from_static(b"data: [DONE]\n\n")),
        ])))
        .await;

        let expected: Vec<Bytes> = vec![
            Bytes::from_static(b"data: {\"content\":\"Hi\"}\n\n"),
            Bytes::from_static(b"data: {\"content\":\" there\"}\n\n"),
            Bytes::from_static(b"data: [DONE]\n\n"),
        ];
        let actual: Vec<Bytes> = frames.into_iter().map(|f| f.unwrap()).collect();
        assert_eq!(actual, expected);
    }

    #[tokio::test]
    async fn test_stream_ends_after_done() {
        let frames = collect_frames(relay_stream(upstream(vec![
            Ok(Bytes::from_static(b"data: [DONE]\n\n")),
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
            )),
        ])))
        .await;

        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].as_ref().unwrap(),
            &Bytes::from_static(b"data: [DONE]\n\n")
        );
    }

    #[tokio::test]
    async fn test_malformed_frame_does_not_terminate_stream() {
        let frames = collect_frames(relay_stream(upstream(vec![
            Ok(Bytes::from_static(b"data: {broken\n\n")),
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
            )),
            Ok(Bytes::from_static(b"data: [DONE]\n\n")),
        ])))
        .await;

        let actual: Vec<Bytes> = frames.into_iter().map(|f| f.unwrap()).collect();
        assert_eq!(
            actual,
            vec![
                Bytes::from_static(b"data: {\"content\":\"ok\"}\n\n"),
                Bytes::from_static(b"data: [DONE]\n\n"),
            ]
        );
    }

    #[tokio::test]
    async fn test_upstream_error_is_propagated_then_stream_ends() {
        let frames = collect_frames(relay_stream(upstream(vec![
            Ok(Bytes::from_static(
                b"data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\n\n",
            )),
            Err(ProviderError::Network("connection reset".to_string())),
            Ok(Bytes::from_static(b"data: [DONE]\n\n")),
        ])))
        .await;

        assert_eq!(frames.len(), 2);
        assert!(frames[0].is_ok());
        assert!(matches!(frames[1], Err(ProviderError::Network(_))));
    }

    #[tokio::test]
    async fn test_upstream_end_without_done_ends_stream() {
        let frames = collect_frames(relay_stream(upstream(vec![Ok(Bytes::from_static(
            b"data: {\"choices\":[{\"delta\":{\"content\":\"partial\"}}]}\n\n",
        ))])))
        .await;

        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0].as_ref().unwrap(),
            &Bytes::from_static(b"data: {\"content\":\"partial\"}\n\n")
        );
    }
}
