//! Server-Sent Events framing.
//!
//! [`SseDecoder`] turns an arbitrarily chunked byte stream into discrete
//! [`SseFrame`] records. Chunk boundaries carry no meaning: bytes are
//! buffered until a full newline-terminated line is available, so a multi-byte
//! UTF-8 codepoint split by the transport is reassembled before decoding.
//! Decoding the typed event out of a frame lives in
//! [`streaming::events`](crate::streaming::events).

/// Cross-chunk line buffering shared by the SSE decoder and the
/// newline-delimited batch results decoder.
///
/// Lines are only materialized once their terminating `\n` has arrived, which
/// keeps partial UTF-8 sequences intact in the byte buffer (a continuation
/// byte can never be `\n`).
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    /// Appends a chunk of raw bytes.
    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Pops the next complete line, without its `\n` (or `\r\n`) terminator.
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let mut line: Vec<u8> = self.buf.drain(..=pos).collect();
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Some(String::from_utf8_lossy(&line).into_owned())
    }

    /// Drains whatever is left as a final, unterminated line.
    pub(crate) fn take_remainder(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        Some(String::from_utf8_lossy(&rest).into_owned())
    }
}

/// Raw SSE record: optional event type plus data payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseFrame {
    /// Event type from the `event:` field.
    pub event: Option<String>,
    /// Data payload; multiple `data:` lines are joined with `\n`.
    pub data: String,
}

impl SseFrame {
    /// Whether this frame is the `[DONE]` end-of-stream sentinel.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.data.trim() == "[DONE]"
    }

    fn is_empty(&self) -> bool {
        self.event.is_none() && self.data.is_empty()
    }
}

/// Incremental SSE record decoder.
///
/// Feed transport chunks with [`push`](Self::push); complete frames come back
/// as they close. Output is single-pass: a decoder is bound to one stream and
/// reusing it after exhaustion is meaningless.
#[derive(Debug, Default)]
pub struct SseDecoder {
    lines: LineBuffer,
    current: SseFrame,
}

impl SseDecoder {
    /// Creates a fresh decoder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes a chunk of bytes and returns all frames completed by it.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseFrame> {
        self.lines.push(chunk);

        let mut frames = Vec::new();
        while let Some(line) = self.lines.next_line() {
            if line.is_empty() {
                // Blank line closes the record.
                if !self.current.is_empty() {
                    frames.push(std::mem::take(&mut self.current));
                }
            } else {
                self.accept_field(&line);
            }
        }
        frames
    }

    /// Flushes any buffered partial record at end of input.
    pub fn flush(&mut self) -> Option<SseFrame> {
        if let Some(line) = self.lines.take_remainder() {
            self.accept_field(&line);
        }
        if self.current.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.current))
        }
    }

    fn accept_field(&mut self, line: &str) {
        if line.starts_with(':') {
            // Comment line, ignored.
            return;
        }
        if let Some(value) = line.strip_prefix("event:") {
            self.current.event = Some(value.trim().to_string());
        } else if let Some(value) = line.strip_prefix("data:") {
            let value = value.strip_prefix(' ').unwrap_or(value);
            if !self.current.data.is_empty() {
                self.current.data.push('\n');
            }
            self.current.data.push_str(value);
        }
        // Other fields (id:, retry:) are ignored per the SSE spec.
    }
}
