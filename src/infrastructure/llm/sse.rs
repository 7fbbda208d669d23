//! Incremental decoding of `text/event-stream` bodies returned by vendors

use futures::StreamExt;
use std::collections::VecDeque;
use tracing::debug;

use super::http_client::ByteStream;
use crate::domain::{DomainError, TextStream};

/// Prefix carried by every payload line
const DATA_PREFIX: &str = "data:";

/// What a vendor-specific parser made of one payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseLine {
    /// Not a text delta (role header, ping, usage, unparseable JSON, ...)
    Skip,
    /// Incremental assistant text
    Text(String),
    /// Vendor end-of-stream sentinel
    Done,
}

/// Splits a byte stream into complete lines, holding partial lines across reads
#[derive(Debug, Default)]
pub struct SseLineDecoder {
    buffer: Vec<u8>,
}

impl SseLineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every line it completes.
    ///
    /// Bytes are kept raw until a newline arrives so multi-byte characters
    /// split across chunks decode intact.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buffer.extend_from_slice(chunk);

        let mut lines = Vec::new();
        while let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&line[..line.len() - 1]);
            lines.push(text.trim_end_matches('\r').to_string());
        }

        lines
    }

    /// Whatever is left once the body ends without a trailing newline
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            return None;
        }

        let rest = std::mem::take(&mut self.buffer);
        Some(String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string())
    }
}

/// Payload of a `data:` line, or `None` for comments, `event:` lines and blanks
pub fn data_payload(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(str::trim)
}

struct DecodeState<F> {
    bytes: ByteStream,
    decoder: SseLineDecoder,
    pending: VecDeque<String>,
    parse: F,
    exhausted: bool,
    finished: bool,
}

/// Turn a vendor SSE body into a stream of text fragments.
///
/// `parse` sees each `data:` payload and decides whether it carries text,
/// ends the stream, or is ignored. The stream ends after the sentinel, at
/// the end of the body, or after the first error; the byte stream (and
/// with it the vendor connection) is dropped as soon as it ends.
pub fn decode_text_stream<F>(provider: &'static str, bytes: ByteStream, parse: F) -> TextStream
where
    F: Fn(&str) -> Result<SseLine, DomainError> + Send + 'static,
{
    let state = DecodeState {
        bytes,
        decoder: SseLineDecoder::new(),
        pending: VecDeque::new(),
        parse,
        exhausted: false,
        finished: false,
    };

    let stream = futures::stream::unfold(state, move |mut state| async move {
        loop {
            if state.finished {
                return None;
            }

            if let Some(line) = state.pending.pop_front() {
                let Some(payload) = data_payload(&line) else {
                    continue;
                };

                match (state.parse)(payload) {
                    Ok(SseLine::Skip) => continue,
                    Ok(SseLine::Text(text)) => return Some((Ok(text), state)),
                    Ok(SseLine::Done) => {
                        debug!(provider = provider, "Vendor stream reached end sentinel");
                        return None;
                    }
                    Err(e) => {
                        state.finished = true;
                        return Some((Err(e), state));
                    }
                }
            }

            if state.exhausted {
                return None;
            }

            match state.bytes.next().await {
                Some(Ok(chunk)) => {
                    let lines = state.decoder.push(&chunk);
                    state.pending.extend(lines);
                }
                Some(Err(e)) => {
                    state.finished = true;
                    return Some((Err(e), state));
                }
                None => {
                    state.exhausted = true;
                    if let Some(rest) = state.decoder.finish() {
                        state.pending.push_back(rest);
                    }
                }
            }
        }
    });

    Box::pin(stream)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures::stream;

    fn byte_stream(chunks: Vec<&'static str>) -> ByteStream {
        Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))),
        ))
    }

    fn parse_text_field(payload: &str) -> Result<SseLine, DomainError> {
        if payload == "[DONE]" {
            return Ok(SseLine::Done);
        }

        let value: serde_json::Value = match serde_json::from_str(payload) {
            Ok(value) => value,
            Err(_) => return Ok(SseLine::Skip),
        };

        Ok(value["delta"]["text"]
            .as_str()
            .map(|t| SseLine::Text(t.to_string()))
            .unwrap_or(SseLine::Skip))
    }

    async fn collect(stream: TextStream) -> Vec<Result<String, DomainError>> {
        stream.collect().await
    }

    #[test]
    fn test_decoder_holds_partial_line() {
        let mut decoder = SseLineDecoder::new();

        assert!(decoder.push(b"data: {\"delta\":").is_empty());
        let lines = decoder.push(b"{\"text\":\"hi\"}}\n\n");

        assert_eq!(lines, vec!["data: {\"delta\":{\"text\":\"hi\"}}", ""]);
        assert!(decoder.finish().is_none());
    }

    #[test]
    fn test_decoder_handles_crlf_and_split_utf8() {
        let mut decoder = SseLineDecoder::new();
        let snowman = "☃".as_bytes();

        assert!(decoder.push(&[b'a', snowman[0]]).is_empty());
        let lines = decoder.push(&[snowman[1], snowman[2], b'\r', b'\n']);

        assert_eq!(lines, vec!["a☃"]);
    }

    #[test]
    fn test_data_payload() {
        assert_eq!(data_payload("data: {\"a\":1}"), Some("{\"a\":1}"));
        assert_eq!(data_payload("data:[DONE]"), Some("[DONE]"));
        assert_eq!(data_payload("event: ping"), None);
        assert_eq!(data_payload(": keep-alive"), None);
        assert_eq!(data_payload(""), None);
    }

    #[tokio::test]
    async fn test_line_split_across_reads_yields_one_fragment() {
        let bytes = byte_stream(vec!["data: {\"delta\":", "{\"text\":\"hi\"}}\n\n"]);

        let items = collect(decode_text_stream("test", bytes, parse_text_field)).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_malformed_json_is_skipped() {
        let bytes = byte_stream(vec![
            "data: {\"delta\":{\"text\":\"a\"}}\n",
            "data: {not json\n",
            "data: {\"delta\":{\"text\":\"b\"}}\n",
        ]);

        let items = collect(decode_text_stream("test", bytes, parse_text_field)).await;
        let texts: Vec<String> = items.into_iter().map(|r| r.unwrap()).collect();

        assert_eq!(texts, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_sentinel_stops_reading() {
        let bytes = byte_stream(vec![
            "data: {\"delta\":{\"text\":\"a\"}}\n\ndata: [DONE]\n\n",
            "data: {\"delta\":{\"text\":\"after\"}}\n\n",
        ]);

        let items = collect(decode_text_stream("test", bytes, parse_text_field)).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "a");
    }

    #[tokio::test]
    async fn test_trailing_line_without_newline_is_parsed() {
        let bytes = byte_stream(vec!["data: {\"delta\":{\"text\":\"tail\"}}"]);

        let items = collect(decode_text_stream("test", bytes, parse_text_field)).await;

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].as_ref().unwrap(), "tail");
    }

    #[tokio::test]
    async fn test_transport_error_is_terminal() {
        let chunks: Vec<Result<Bytes, DomainError>> = vec![
            Ok(Bytes::from_static(b"data: {\"delta\":{\"text\":\"a\"}}\n")),
            Err(DomainError::network("test", "connection reset")),
            Ok(Bytes::from_static(b"data: {\"delta\":{\"text\":\"b\"}}\n")),
        ];
        let bytes: ByteStream = Box::pin(stream::iter(chunks));

        let items = collect(decode_text_stream("test", bytes, parse_text_field)).await;

        assert_eq!(items.len(), 2);
        assert!(items[0].is_ok());
        assert!(matches!(items[1], Err(DomainError::Network { .. })));
    }
}
