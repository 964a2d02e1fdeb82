use serde::Deserialize;

use super::{DecodeEvent, StreamDecoder};

/// Gemini streaming response block
#[derive(Debug, Deserialize)]
struct GeminiStreamChunk {
    pub candidates: Option<Vec<GeminiStreamCandidate>>,
    /// 流内错误对象（如配额耗尽）
    pub error: Option<GeminiStreamError>,
}

#[derive(Debug, Deserialize)]
struct GeminiStreamCandidate {
    pub content: Option<GeminiStreamContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiStreamContent {
    pub parts: Option<Vec<GeminiStreamPart>>,
}

#[derive(Debug, Deserialize)]
struct GeminiStreamPart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiStreamError {
    #[serde(default)]
    pub message: String,
}

/// Decoder for `streamGenerateContent` responses
///
/// Without `alt=sse` Gemini streams one JSON array whose elements arrive
/// as they are generated:
/// ```text
/// [{"candidates":[{"content":{"parts":[{"text":"Hello"}],"role":"model"}}]}
/// ,{"candidates":[{"content":{"parts":[{"text":" world"}],"role":"model"},"finishReason":"STOP"}]}
/// ]
/// ```
///
/// Element boundaries are found with a brace scanner that skips string
/// literals, so an element may span any number of lines and reads.
#[derive(Debug, Default)]
pub struct GeminiDecoder {
    buf: Vec<u8>,
    /// 已扫描到的位置
    scanned: usize,
    depth: usize,
    in_string: bool,
    escaped: bool,
    /// 当前对象在 buf 中的起始位置
    start: Option<usize>,
    finished: bool,
}

impl GeminiDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    fn decode_object(record: &[u8], events: &mut Vec<DecodeEvent>) {
        let record = String::from_utf8_lossy(record);
        match serde_json::from_str::<GeminiStreamChunk>(&record) {
            Ok(chunk) => {
                if let Some(error) = chunk.error {
                    events.push(DecodeEvent::Malformed {
                        record: record.into_owned(),
                        error: format!("Gemini stream error: {}", error.message),
                    });
                    return;
                }

                let parts = chunk
                    .candidates
                    .and_then(|candidates| candidates.into_iter().next())
                    .and_then(|candidate| candidate.content)
                    .and_then(|content| content.parts)
                    .unwrap_or_default();

                for part in parts {
                    if let Some(text) = part.text
                        && !text.is_empty()
                    {
                        events.push(DecodeEvent::Fragment(text));
                    }
                }
            }
            Err(e) => events.push(DecodeEvent::Malformed {
                record: record.into_owned(),
                error: e.to_string(),
            }),
        }
    }

    /// 丢弃已处理的字节，保留未闭合对象
    fn compact(&mut self) {
        match self.start {
            Some(start) => {
                self.buf.drain(..start);
                self.scanned -= start;
                self.start = Some(0);
            }
            None => {
                self.buf.clear();
                self.scanned = 0;
            }
        }
    }
}

impl StreamDecoder for GeminiDecoder {
    fn feed(&mut self, chunk: &[u8]) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        if self.finished {
            return events;
        }

        self.buf.extend_from_slice(chunk);

        while self.scanned < self.buf.len() {
            let byte = self.buf[self.scanned];

            if self.in_string {
                if self.escaped {
                    self.escaped = false;
                } else if byte == b'\\' {
                    self.escaped = true;
                } else if byte == b'"' {
                    self.in_string = false;
                }
            } else {
                match byte {
                    b'"' if self.depth > 0 => self.in_string = true,
                    b'{' => {
                        if self.depth == 0 {
                            self.start = Some(self.scanned);
                        }
                        self.depth += 1;
                    }
                    b'}' if self.depth > 0 => {
                        self.depth -= 1;
                        if self.depth == 0
                            && let Some(start) = self.start.take()
                        {
                            Self::decode_object(&self.buf[start..=self.scanned], &mut events);
                        }
                    }
                    // 顶层数组闭合
                    b']' if self.depth == 0 => {
                        self.finished = true;
                        self.buf.clear();
                        self.scanned = 0;
                        events.push(DecodeEvent::Finished);
                        return events;
                    }
                    // '[' ',' 与空白
                    _ => {}
                }
            }

            self.scanned += 1;
        }

        self.compact();
        events
    }

    fn finish(&mut self) -> Vec<DecodeEvent> {
        let mut events = Vec::new();
        if let Some(start) = self.start.take() {
            let rest = String::from_utf8_lossy(&self.buf[start..]).trim().to_string();
            if !rest.is_empty() {
                events.push(DecodeEvent::Malformed {
                    record: rest,
                    error: "truncated JSON object at end of stream".to_string(),
                });
            }
        }
        self.buf.clear();
        self.scanned = 0;
        self.depth = 0;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::streaming::{decode_in_chunks, fragments_text};
    use pretty_assertions::assert_eq;

    const BODY: &str = concat!(
        "[{\"candidates\": [{\"content\": {\"parts\": [{\"text\": \"{\\\"titles\\\": [\"}],\"role\": \"model\"}}]}\n",
        ",\r\n{\n  \"candidates\": [\n    {\"content\": {\"parts\": [{\"text\": \"{\\\"title\\\": \\\"A } ]\\\"\"}, {\"text\": \"，中文\"}], \"role\": \"model\"},\n     \"finishReason\": \"STOP\"}\n  ]\n}\n",
        "]",
    );

    #[test]
    fn test_gemini_array_stream() {
        let mut decoder = GeminiDecoder::new();
        let events = decoder.feed(BODY.as_bytes());

        assert_eq!(
            events,
            vec![
                DecodeEvent::Fragment("{\"titles\": [".into()),
                DecodeEvent::Fragment("{\"title\": \"A } ]\"".into()),
                DecodeEvent::Fragment("，中文".into()),
                DecodeEvent::Finished,
            ]
        );
    }

    #[test]
    fn test_gemini_chunk_boundary_independence() {
        let whole = decode_in_chunks(&mut GeminiDecoder::new(), BODY.as_bytes(), BODY.len());
        for size in [1, 2, 3, 5, 8, 13, 50] {
            let split = decode_in_chunks(&mut GeminiDecoder::new(), BODY.as_bytes(), size);
            assert_eq!(split, whole, "chunk size {}", size);
        }
        assert_eq!(fragments_text(&whole), "{\"titles\": [{\"title\": \"A } ]\"，中文");
    }

    #[test]
    fn test_gemini_ignores_input_after_array_end() {
        let mut decoder = GeminiDecoder::new();
        let events = decoder.feed(b"[]");
        assert_eq!(events, vec![DecodeEvent::Finished]);
        assert!(
            decoder
                .feed(b"{\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"x\"}]}}]}")
                .is_empty()
        );
    }

    #[test]
    fn test_gemini_error_element_is_malformed() {
        let body = "[{\"error\": {\"code\": 429, \"message\": \"Resource has been exhausted\"}}]";
        let events = GeminiDecoder::new().feed(body.as_bytes());
        assert_eq!(events.len(), 2);
        assert!(matches!(
            &events[0],
            DecodeEvent::Malformed { error, .. } if error.contains("Resource has been exhausted")
        ));
        assert_eq!(events[1], DecodeEvent::Finished);
    }

    #[test]
    fn test_gemini_truncated_object_reported_on_finish() {
        let mut decoder = GeminiDecoder::new();
        assert!(decoder.feed(b"[{\"candidates\": [{\"content\"").is_empty());
        let events = decoder.finish();
        assert!(matches!(&events[..], [DecodeEvent::Malformed { .. }]));
    }

    #[test]
    fn test_gemini_candidate_without_text_is_skipped() {
        let body = "[{\"candidates\": [{\"finishReason\": \"STOP\"}]}]";
        assert_eq!(
            GeminiDecoder::new().feed(body.as_bytes()),
            vec![DecodeEvent::Finished]
        );
    }
}
