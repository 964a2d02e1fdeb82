//! Incremental stream decoding
//!
//! Turns raw response bytes into plain-text fragments. Decoders are pure and
//! synchronous: the generator feeds them whatever the network hands over and
//! they buffer until a full record is available, so the output does not depend
//! on where the reads were split.

pub mod gemini;
pub mod openai;
pub mod qwen;

pub use gemini::GeminiDecoder;

/// One decoded unit of a vendor stream.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodeEvent {
    /// Text to append to the accumulated output
    Fragment(String),
    /// The vendor signalled logical completion
    Finished,
    /// A record that could not be decoded; decoding continues
    Malformed { record: String, error: String },
}

/// Vendor stream decoder.
///
/// `feed` may be called any number of times with arbitrary slices of the body;
/// `finish` flushes a trailing record once the body ends.
/// After `Finished` has been emitted, further input is ignored.
pub trait StreamDecoder: Send {
    fn feed(&mut self, chunk: &[u8]) -> Vec<DecodeEvent>;

    fn finish(&mut self) -> Vec<DecodeEvent>;
}

/// Parse SSE lines and extract data content
///
/// Accepts both `data: x` and `data:x`.
pub(super) fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix("data:")
        .map(|data| data.strip_prefix(' ').unwrap_or(data))
}

/// Byte line buffer
///
/// 按字节缓存，只有遇到完整的一行才做 UTF-8 解码，跨块截断的多字节字符不会被破坏
#[derive(Debug, Default)]
pub(crate) struct LineBuffer {
    buf: Vec<u8>,
}

impl LineBuffer {
    pub(crate) fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Next complete line, trimmed (handles `\r\n`)
    pub(crate) fn next_line(&mut self) -> Option<String> {
        let pos = self.buf.iter().position(|&b| b == b'\n')?;
        let line: Vec<u8> = self.buf.drain(..=pos).collect();
        Some(String::from_utf8_lossy(&line).trim().to_string())
    }

    /// Whatever is left after the body ended without a final newline
    pub(crate) fn take_rest(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.buf);
        let line = String::from_utf8_lossy(&rest).trim().to_string();
        (!line.is_empty()).then_some(line)
    }
}

/// Result of decoding one SSE `data:` payload
#[derive(Debug, Default, PartialEq)]
pub(crate) struct SsePayload {
    pub text: Option<String>,
    pub done: bool,
}

/// Line-oriented SSE decoder shared by the vendors that speak SSE.
///
/// `[DONE]` ends the stream; other fields (`id:`, `event:`, `:` comments)
/// are ignored; every `data:` payload goes through `decode_payload`.
pub struct SseDecoder {
    lines: LineBuffer,
    finished: bool,
    decode_payload: fn(&str) -> Result<SsePayload, serde_json::Error>,
}

impl SseDecoder {
    pub(crate) fn new(decode_payload: fn(&str) -> Result<SsePayload, serde_json::Error>) -> Self {
        Self {
            lines: LineBuffer::default(),
            finished: false,
            decode_payload,
        }
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<DecodeEvent>) {
        if self.finished || line.is_empty() {
            return;
        }

        let Some(data) = parse_sse_line(line) else {
            return;
        };

        if data == "[DONE]" {
            self.finished = true;
            events.push(DecodeEvent::Finished);
            return;
        }

        if data.is_empty() {
            return;
        }

        match (self.decode_payload)(data) {
            Ok(payload) => {
                if let Some(text) = payload.text
                    && !text.is_empty()
                {
                    events.push(DecodeEvent::Fragment(text));
                }
                if payload.done {
                    self.finished = true;
                    events.push(DecodeEvent::Finished);
                }
            }
            Err(e) => events.push(DecodeEvent::Malformed {
                record: data.to_string(),
                error: e.to_string(),
            }),
        }
    }
}

impl StreamDecoder for SseDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.lines.push(chunk);
        while let Some(line) = self.lines.next_line() {
            self.handle_line(&line, &mut events);
        }
        events
    }

    fn finish(&mut self) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        if let Some(line) = self.lines.take_rest() {
            self.handle_line(&line, &mut events);
        }
        events
    }
}

/// Feeds `body` to `decoder` in pieces of `chunk_size` bytes and collects everything
#[cfg(test)]
pub(crate) fn decode_in_chunks(
    decoder: &mut dyn StreamDecoder,
    body: &[u8],
    chunk_size: usize,
) -> Vec<DecodeEvent> {
    let mut events = Vec::new();
    for piece in body.chunks(chunk_size.max(1)) {
        events.extend(decoder.feed(piece));
    }
    events.extend(decoder.finish());
    events
}

/// Concatenated fragment text of a decode run
#[cfg(test)]
pub(crate) fn fragments_text(events: &[DecodeEvent]) -> String {
    events
        .iter()
        .filter_map(|event| match event {
            DecodeEvent::Fragment(text) => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
