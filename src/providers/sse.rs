//! Incremental server-sent events decoder
//!
//! The Gemini streaming endpoint (`alt=sse`) delivers one JSON payload per
//! SSE event. Network chunks do not respect event boundaries, so the decoder
//! buffers bytes until a blank line closes an event and only then yields the
//! event's `data:` payload.
//!
//! Lines may end in `\n`, `\r\n` or a lone `\r`.
//!
//! Field handling:
//!
//! - `data:` lines are joined with `\n` (one leading space is stripped).
//! - Lines starting with `:` are comments and are ignored.
//! - `event:`, `id:` and `retry:` are ignored; the endpoint does not use them.
//! - Events with no data are dropped.

use crate::error::{DebateError, Result};

/// Splits a byte stream into SSE `data` payloads
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: String,
    // Trailing bytes of a UTF-8 sequence cut in half by a chunk boundary.
    partial_utf8: Vec<u8>,
    // Last character seen was `\r`; a following `\n` belongs to it.
    after_cr: bool,
}

impl SseDecoder {
    /// Creates an empty decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one network chunk and returns every payload it completed
    ///
    /// # Arguments
    ///
    /// * `chunk` - Raw bytes as received from the transport
    ///
    /// # Returns
    ///
    /// Returns the data payloads of all events closed by this chunk, in order
    ///
    /// # Errors
    ///
    /// Returns error if the bytes are not valid UTF-8
    ///
    /// # Examples
    ///
    /// ```
    /// use debate_arena::providers::sse::SseDecoder;
    ///
    /// let mut decoder = SseDecoder::new();
    /// assert!(decoder.push(b"data: {\"a\"").unwrap().is_empty());
    /// let events = decoder.push(b":1}\n\n").unwrap();
    /// assert_eq!(events, vec!["{\"a\":1}".to_string()]);
    /// ```
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        self.partial_utf8.extend_from_slice(chunk);

        let valid_up_to = match std::str::from_utf8(&self.partial_utf8) {
            Ok(_) => self.partial_utf8.len(),
            Err(e) if e.error_len().is_none() => e.valid_up_to(),
            Err(e) => {
                return Err(
                    DebateError::Stream(format!("Invalid UTF-8 in event stream: {}", e)).into(),
                )
            }
        };

        let rest = self.partial_utf8.split_off(valid_up_to);
        let text = String::from_utf8(std::mem::replace(&mut self.partial_utf8, rest))
            .map_err(|e| DebateError::Stream(format!("Invalid UTF-8 in event stream: {}", e)))?;

        self.normalize_into_buffer(&text);

        let mut payloads = Vec::new();
        while let Some(pos) = self.buffer.find("\n\n") {
            let block: String = self.buffer.drain(..pos + 2).collect();
            if let Some(data) = parse_event(&block) {
                payloads.push(data);
            }
        }
        Ok(payloads)
    }

    /// Appends `text` with `\r\n` and lone `\r` line endings turned into `\n`
    fn normalize_into_buffer(&mut self, text: &str) {
        for ch in text.chars() {
            match ch {
                '\r' => {
                    self.buffer.push('\n');
                    self.after_cr = true;
                }
                '\n' if self.after_cr => self.after_cr = false,
                _ => {
                    self.buffer.push(ch);
                    self.after_cr = false;
                }
            }
        }
    }

    /// Flushes a final event that was not followed by a blank line
    ///
    /// # Returns
    ///
    /// Returns the payload of the trailing event, if any
    pub fn finish(&mut self) -> Option<String> {
        self.partial_utf8.clear();
        self.after_cr = false;
        let block = std::mem::take(&mut self.buffer);
        parse_event(&block)
    }
}

/// Extracts the joined `data:` value of one event block
fn parse_event(block: &str) -> Option<String> {
    let data_lines: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|value| value.strip_prefix(' ').unwrap_or(value))
        .collect();

    if data_lines.is_empty() {
        return None;
    }

    let data = data_lines.join("\n");
    if data.trim().is_empty() {
        None
    } else {
        Some(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_event() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: {\"x\":1}\n\n").unwrap();
        assert_eq!(events, vec![r#"{"x":1}"#]);
    }

    #[test]
    fn test_two_events_in_one_chunk() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: first\n\ndata: second\n\n").unwrap();
        assert_eq!(events, vec!["first", "second"]);
    }

    #[test]
    fn test_event_split_across_chunks() {
        let body = b"data: {\"text\":\"Welcome\"}\n\ndata: {\"text\":\"!\"}\n\n";
        for split in 1..body.len() {
            let mut decoder = SseDecoder::new();
            let mut events = decoder.push(&body[..split]).unwrap();
            events.extend(decoder.push(&body[split..]).unwrap());
            assert_eq!(
                events,
                vec![r#"{"text":"Welcome"}"#, r#"{"text":"!"}"#],
                "split at {}",
                split
            );
        }
    }

    #[test]
    fn test_crlf_line_endings() {
        let mut decoder = SseDecoder::new();
        let mut events = decoder.push(b"data: one\r").unwrap();
        events.extend(decoder.push(b"\n\r\ndata: two\r\n\r\n").unwrap());
        assert_eq!(events, vec!["one", "two"]);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let body = "data: caf\u{e9}\n\n".as_bytes();
        let cut = body.iter().position(|b| *b == 0xC3).unwrap() + 1;

        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&body[..cut]).unwrap().is_empty());
        let events = decoder.push(&body[cut..]).unwrap();
        assert_eq!(events, vec!["caf\u{e9}"]);
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&[b'd', 0xFF, b'\n']).is_err());
    }

    #[test]
    fn test_multiline_data_joined() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: a\ndata: b\n\n").unwrap();
        assert_eq!(events, vec!["a\nb"]);
    }

    #[test]
    fn test_comments_and_empty_events_dropped() {
        let mut decoder = SseDecoder::new();
        let events = decoder
            .push(b": keep-alive\n\nevent: message\n\ndata: real\n\n")
            .unwrap();
        assert_eq!(events, vec!["real"]);
    }

    #[test]
    fn test_finish_flushes_trailing_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: tail").unwrap().is_empty());
        assert_eq!(decoder.finish(), Some("tail".to_string()));
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_bare_cr_line_endings() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data: a\r\rdata: b\r\r").unwrap();
        assert_eq!(events, vec!["a", "b"]);
    }

    #[test]
    fn test_crlf_split_between_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: a\r").unwrap().is_empty());
        assert_eq!(decoder.push(b"\n\r").unwrap(), vec!["a"]);
        // The LF completing that CRLF must not open another blank line.
        let events = decoder.push(b"\ndata: b\r\n\r\n").unwrap();
        assert_eq!(events, vec!["b"]);
    }
}
