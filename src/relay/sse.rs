//! Incremental SSE decoding of upstream token streams
//!
//! The upstream body arrives as arbitrary byte chunks that need not align
//! with event boundaries: a single `data: ` line can be fractured across
//! two reads. [`SseLineParser`] buffers the partial trailing line between
//! feeds so every line is decoded exactly once. Splitting at `\n` is safe
//! for UTF-8 since continuation bytes never equal `0x0A`.

use bytes::Bytes;
use tracing::warn;

use crate::protocol::StreamFragment;
use crate::providers::deepseek::types::StreamChunk;

/// Literal marker a provider sends as the last event of its stream.
pub const DONE_SENTINEL: &str = "[DONE]";

const DATA_PREFIX: &str = "data: ";

/// One caller-facing relay event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayEvent {
    /// An incremental fragment of assistant text.
    Delta(StreamFragment),
    /// End of stream.
    Done,
}

impl RelayEvent {
    /// Encode the event as a caller-facing SSE frame.
    pub fn to_sse(&self) -> Bytes {
        match self {
            RelayEvent::Delta(fragment) => {
                let payload = serde_json::to_string(fragment).unwrap_or_default();
                Bytes::from(format!("data: {}\n\n", payload))
            }
            RelayEvent::Done => Bytes::from_static(b"data: [DONE]\n\n"),
        }
    }
}

/// Stateful decoder for the upstream SSE byte stream.
///
/// Feed raw chunks as they arrive; complete `data: ` lines are decoded into
/// [`RelayEvent`]s. A malformed payload is logged and skipped without
/// failing the stream. After the `[DONE]` sentinel the parser is closed and
/// ignores all further input.
#[derive(Debug, Default)]
pub struct SseLineParser {
    buffer: Vec<u8>,
    done: bool,
}

impl SseLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been decoded.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Feed a chunk of upstream bytes, returning the events it completed.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<RelayEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        self.buffer.extend_from_slice(chunk);

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);

            let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
                continue;
            };

            if payload == DONE_SENTINEL {
                self.done = true;
                self.buffer.clear();
                events.push(RelayEvent::Done);
                break;
            }

            match serde_json::from_str::<StreamChunk>(payload) {
                Ok(chunk) => {
                    let content = chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content);
                    if let Some(content) = content {
                        if !content.is_empty() {
                            events.push(RelayEvent::Delta(StreamFragment { content }));
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "skipping malformed stream frame");
                }
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(content: &str) -> RelayEvent {
        RelayEvent::Delta(StreamFragment {
            content: content.to_string(),
        })
    }

    #[test]
    fn test_single_delta_event() {
        let mut parser = SseLineParser::new();
        let events = parser.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n");
        assert_eq!(events, vec![delta("Hi")]);
    }

    #[test]
    fn test_done_sentinel_closes_parser() {
        let mut parser = SseLineParser::new();
        let events = parser.feed(b"data: [DONE]\n\n");
        assert_eq!(events, vec![RelayEvent::Done]);
        assert!(parser.is_done());

        let after = parser.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n");
        assert!(after.is_empty());
    }

    #[test]
    fn test_events_after_done_in_same_chunk_are_dropped() {
        let mut parser = SseLineParser::new();
        let chunk = concat!(
            "data: [DONE]\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"late\"}}]}\n\n",
        );
        let events = parser.feed(chunk.as_bytes());
        assert_eq!(events, vec![RelayEvent::Done]);
    }

    #[test]
    fn test_line_fractured_across_chunks() {
        let mut parser = SseLineParser::new();

        let first = parser.feed(b"data: {\"choices\":[{\"delta\":{\"con");
        assert!(first.is_empty());

        let second = parser.feed(b"tent\":\"Hello\"}}]}\n\n");
        assert_eq!(second, vec![delta("Hello")]);
    }

    #[test]
    fn test_multiple_events_in_one_chunk() {
        let mut parser = SseLineParser::new();
        let chunk = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"Hi\"}}]}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\" there\"}}]}\n\n",
            "data: [DONE]\n\n",
        );
        let events = parser.feed(chunk.as_bytes());
        assert_eq!(events, vec![delta("Hi"), delta(" there"), RelayEvent::Done]);
    }

    #[test]
    fn test_malformed_payload_is_skipped() {
        let mut parser = SseLineParser::new();
        let chunk = concat!(
            "data: {\"choices\":[{\"delta\":{\"content\":\"ok\"}}]}\n\n",
            "data: {not json}\n\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"still ok\"}}]}\n\n",
        );
        let events = parser.feed(chunk.as_bytes());
        assert_eq!(events, vec![delta("ok"), delta("still ok")]);
    }

    #[test]
    fn test_empty_and_comment_lines_ignored() {
        let mut parser = SseLineParser::new();
        let chunk = concat!(
            ": keep-alive\n",
            "\n",
            "event: message\n",
            "data: {\"choices\":[{\"delta\":{\"content\":\"x\"}}]}\n\n",
        );
        let events = parser.feed(chunk.as_bytes());
        assert_eq!(events, vec![delta("x")]);
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut parser = SseLineParser::new();
        let events =
            parser.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"Win\"}}]}\r\n\r\n");
        assert_eq!(events, vec![delta("Win")]);
    }

    #[test]
    fn test_empty_delta_content_not_emitted() {
        let mut parser = SseLineParser::new();
        let events = parser.feed(b"data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}\n\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_role_only_delta_not_emitted() {
        let mut parser = SseLineParser::new();
        let events = parser.feed(b"data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}\n\n");
        assert!(events.is_empty());
    }

    #[test]
    fn test_unicode_delta_split_mid_character() {
        let mut parser = SseLineParser::new();
        let full = "data: {\"choices\":[{\"delta\":{\"content\":\"你好 🌍\"}}]}\n\n";
        let bytes = full.as_bytes();

        let mut events = Vec::new();
        for chunk in bytes.chunks(7) {
            events.extend(parser.feed(chunk));
        }

        assert_eq!(events, vec![delta("你好 🌍")]);
    }

    #[test]
    fn test_to_sse_encoding() {
        assert_eq!(
            delta("Hi").to_sse(),
            Bytes::from_static(b"data: {\"content\":\"Hi\"}\n\n")
        );
        assert_eq!(
            RelayEvent::Done.to_sse(),
            Bytes::from_static(b"data: [DONE]\n\n")
        );
    }
}
