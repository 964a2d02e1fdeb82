use serde::Deserialize;

use super::{SseDecoder, SsePayload};

/// DashScope streaming chunk
#[derive(Debug, Deserialize)]
struct QwenStreamChunk {
    output: QwenOutput,
}

#[derive(Debug, Deserialize)]
struct QwenOutput {
    #[serde(default)]
    choices: Vec<QwenChoice>,
    /// `result_format = "text"` 时的输出
    text: Option<String>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QwenChoice {
    message: Option<QwenMessage>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QwenMessage {
    content: Option<String>,
}

/// Decoder for DashScope text-generation streams
///
/// SSE format (`X-DashScope-SSE: enable`, incremental output):
/// ```text
/// id:1
/// event:result
/// :HTTP_STATUS/200
/// data:{"output":{"choices":[{"message":{"content":"Hello","role":"assistant"},"finish_reason":"null"}]}}
///
/// id:2
/// event:result
/// :HTTP_STATUS/200
/// data:{"output":{"choices":[{"message":{"content":" world","role":"assistant"},"finish_reason":"stop"}]}}
/// ```
pub fn decoder() -> SseDecoder {
    SseDecoder::new(decode_payload)
}

/// DashScope 用字符串 "null" 表示未结束
fn is_finish_reason(reason: Option<&str>) -> bool {
    matches!(reason, Some(r) if !r.is_empty() && r != "null")
}

fn decode_payload(data: &str) -> Result<SsePayload, serde_json::Error> {
    let chunk: QwenStreamChunk = serde_json::from_str(data)?;
    let output = chunk.output;
    let choice = output.choices.into_iter().next();

    let done = is_finish_reason(output.finish_reason.as_deref())
        || is_finish_reason(choice.as_ref().and_then(|c| c.finish_reason.as_deref()));

    let text = choice
        .and_then(|c| c.message)
        .and_then(|m| m.content)
        .or(output.text);

    Ok(SsePayload { text, done })
}
