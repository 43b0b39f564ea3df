//! Incremental `text/event-stream` decoder
//!
//! Only `data:` fields matter here. Consecutive `data:` lines are joined
//! with `\n` and a blank line dispatches the event. Comment lines (`:`)
//! and the `event`, `id` and `retry` fields are ignored. Lines may end in
//! `\n` or `\r\n`, and chunks may split anywhere, even inside a UTF-8
//! sequence.
//!
//! A line or event larger than the size limit is a transport error; the
//! decoder does not buffer an unterminated stream forever.

use imhotep_core::{AppError, Result};

/// Largest line or accumulated event payload accepted (1 MiB)
pub const MAX_EVENT_BYTES: usize = 1024 * 1024;

#[derive(Debug)]
pub struct SseDecoder {
    pending: Vec<u8>,
    data: Option<String>,
    max_event_bytes: usize,
}

impl Default for SseDecoder {
    fn default() -> Self {
        Self::with_limit(MAX_EVENT_BYTES)
    }
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limit(max_event_bytes: usize) -> Self {
        Self {
            pending: Vec::new(),
            data: None,
            max_event_bytes,
        }
    }

    /// Feed a chunk and collect every event it completes
    pub fn feed(&mut self, chunk: &[u8]) -> Result<Vec<String>> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let mut line: Vec<u8> = self.pending.drain(..=pos).collect();
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
            self.check_data_size()?;
        }

        if self.pending.len() > self.max_event_bytes {
            let len = self.pending.len();
            self.pending.clear();
            return Err(AppError::Transport(format!(
                "event stream line exceeds {} bytes ({} buffered without a newline)",
                self.max_event_bytes, len
            )));
        }
        Ok(events)
    }

    fn check_data_size(&mut self) -> Result<()> {
        let len = self.data.as_ref().map_or(0, String::len);
        if len > self.max_event_bytes {
            self.data = None;
            return Err(AppError::Transport(format!(
                "event stream payload exceeds {} bytes",
                self.max_event_bytes
            )));
        }
        Ok(())
    }

    /// True when part of an event is buffered but not yet dispatched
    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty() || self.data.is_some()
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.data.take();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            match &mut self.data {
                Some(buffer) => {
                    buffer.push('\n');
                    buffer.push_str(value);
                }
                None => self.data = Some(value.to_string()),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn test_single_event() {
        let mut d = SseDecoder::new();
        let events = assert_ok!(d.feed(b"data: {\"type\":\"progress\"}\n\n"));
        assert_eq!(events, vec![r#"{"type":"progress"}"#.to_string()]);
        assert!(!d.has_partial());
    }

    #[test]
    fn test_multiline_data_is_joined() {
        let mut d = SseDecoder::new();
        let events = assert_ok!(d.feed(b"data: {\"a\":\ndata: 1}\n\n"));
        assert_eq!(events, vec!["{\"a\":\n1}".to_string()]);
    }

    #[test]
    fn test_comments_and_other_fields_ignored() {
        let mut d = SseDecoder::new();
        let events = assert_ok!(d.feed(b": keep-alive\n\nevent: message\nid: 7\nretry: 1000\ndata:x\n\n"));
        assert_eq!(events, vec!["x".to_string()]);
    }

    #[test]
    fn test_crlf_and_split_chunks() {
        let mut d = SseDecoder::new();
        assert!(assert_ok!(d.feed(b"data: hel")).is_empty());
        assert!(assert_ok!(d.feed(b"lo\r\n")).is_empty());
        assert!(d.has_partial());
        assert_eq!(assert_ok!(d.feed(b"\r\ndata: two\r\n\r\n")), vec!["hello", "two"]);
    }

    #[test]
    fn test_split_inside_utf8_sequence() {
        let mut d = SseDecoder::new();
        let bytes = "data: café\n\n".as_bytes();
        let split = bytes.len() - 3;
        assert!(assert_ok!(d.feed(&bytes[..split])).is_empty());
        assert_eq!(assert_ok!(d.feed(&bytes[split..])), vec!["café".to_string()]);
    }

    #[test]
    fn test_blank_lines_without_data_dispatch_nothing() {
        let mut d = SseDecoder::new();
        assert!(assert_ok!(d.feed(b"\n\n\n")).is_empty());
    }

    #[test]
    fn test_unterminated_line_over_limit_is_transport_error() {
        let mut d = SseDecoder::with_limit(16);
        assert_ok!(d.feed(b"data: 0123"));

        let err = assert_err!(d.feed(b"456789abcdef"));
        assert!(matches!(err, AppError::Transport(_)));
        assert!(err.to_string().contains("16 bytes"));
        assert!(!d.has_partial());
    }

    #[test]
    fn test_accumulated_data_over_limit_is_transport_error() {
        let mut d = SseDecoder::with_limit(16);
        assert_ok!(d.feed(b"data: 0123456789\n"));

        let err = assert_err!(d.feed(b"data: 0123456789\n"));
        assert!(err.to_string().contains("payload exceeds 16 bytes"));
    }

    #[test]
    fn test_events_within_limit_still_decode() {
        let mut d = SseDecoder::with_limit(16);
        let events = assert_ok!(d.feed(b"data: short\n\ndata: also\n\n"));
        assert_eq!(events, vec!["short", "also"]);
    }
}
