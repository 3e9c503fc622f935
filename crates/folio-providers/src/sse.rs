//! Incremental decoder for upstream `text/event-stream` bodies.
//!
//! Network chunks do not respect frame boundaries: a frame, a line, or even
//! a UTF-8 sequence may be split across reads. The decoder buffers bytes and
//! only emits complete events.

use folio_core::error::{FolioError, Result};
use serde_json::Value;

/// Terminal marker sent by OpenAI-compatible backends.
pub const DONE_MARKER: &str = "[DONE]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// Payload of one event; multiple `data:` lines are joined with `\n`.
    Data(String),
    /// The `[DONE]` marker.
    Done,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one network chunk; returns the events it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.buf.extend_from_slice(chunk);
        let mut events = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line);
            let line = line.trim_end_matches(['\n', '\r']);
            self.process_line(line, &mut events);
        }
        events
    }

    /// Flush a trailing event that was not terminated by a blank line.
    pub fn finish(&mut self) -> Vec<SseEvent> {
        let mut events = Vec::new();
        if !self.buf.is_empty() {
            let rest = std::mem::take(&mut self.buf);
            let line = String::from_utf8_lossy(&rest).trim_end_matches('\r').to_string();
            self.process_line(&line, &mut events);
        }
        self.dispatch(&mut events);
        events
    }

    fn process_line(&mut self, line: &str, events: &mut Vec<SseEvent>) {
        if line.is_empty() {
            self.dispatch(events);
        } else if let Some(value) = line.strip_prefix("data:") {
            self.data.push(value.strip_prefix(' ').unwrap_or(value).to_string());
        }
        // `event:`, `id:`, `retry:` and `:` comments carry nothing we use.
    }

    fn dispatch(&mut self, events: &mut Vec<SseEvent>) {
        if self.data.is_empty() {
            return;
        }
        let payload = std::mem::take(&mut self.data).join("\n");
        if payload.trim() == DONE_MARKER {
            events.push(SseEvent::Done);
        } else {
            events.push(SseEvent::Data(payload));
        }
    }
}

/// Text delta of one chat completion chunk, if it carries any.
///
/// An `error` object in the payload becomes a provider error.
pub fn delta_content(payload: &str) -> Result<Option<String>> {
    let json: Value = serde_json::from_str(payload)?;
    if let Some(err) = json.get("error") {
        let message = err["message"].as_str().map(String::from).unwrap_or_else(|| err.to_string());
        return Err(FolioError::Provider(message));
    }
    Ok(json["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|s| !s.is_empty())
        .map(String::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(content: &str) -> String {
        format!("data: {{\"choices\":[{{\"delta\":{{\"content\":\"{content}\"}}}}]}}\n\n")
    }

    #[test]
    fn test_frames_split_across_chunks() {
        let wire = format!("{}{}data: [DONE]\n\n", chunk("Hel"), chunk("lo"));
        let bytes = wire.as_bytes();
        let mut decoder = SseDecoder::new();
        let mut events = Vec::new();
        for piece in bytes.chunks(7) {
            events.extend(decoder.push(piece));
        }
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], SseEvent::Done);
        let text: Vec<_> = events[..2]
            .iter()
            .filter_map(|e| match e {
                SseEvent::Data(d) => delta_content(d).unwrap(),
                SseEvent::Done => None,
            })
            .collect();
        assert_eq!(text.concat(), "Hello");
    }

    #[test]
    fn test_split_utf8_sequence() {
        let wire = chunk("café");
        let bytes = wire.as_bytes();
        let split = wire.find('é').unwrap() + 1;
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(&bytes[..split]).is_empty());
        let events = decoder.push(&bytes[split..]);
        let SseEvent::Data(payload) = &events[0] else {
            panic!("expected data event");
        };
        assert_eq!(delta_content(payload).unwrap().as_deref(), Some("café"));
    }

    #[test]
    fn test_crlf_comments_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": keep-alive\r\n\r\nevent: message\r\ndata: a\r\ndata: b\r\n\r\n");
        assert_eq!(events, vec![SseEvent::Data("a\nb".into())]);
    }

    #[test]
    fn test_finish_flushes_unterminated_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: [DONE]").is_empty());
        assert_eq!(decoder.finish(), vec![SseEvent::Done]);
        assert!(decoder.finish().is_empty());
    }

    #[test]
    fn test_delta_content_variants() {
        assert_eq!(delta_content(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(), None);
        assert_eq!(delta_content(r#"{"choices":[{"delta":{"content":""}}]}"#).unwrap(), None);
        let err = delta_content(r#"{"error":{"message":"rate limited"}}"#).unwrap_err();
        assert!(matches!(err, FolioError::Provider(m) if m == "rate limited"));
        assert!(matches!(delta_content("not json"), Err(FolioError::Json(_))));
    }
}
