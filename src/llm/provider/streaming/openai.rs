use serde::Deserialize;

use super::{SseDecoder, SsePayload};

/// delta structure of OpenAI streaming response
#[derive(Debug, Deserialize)]
struct OpenAIDelta {
    #[serde(default)]
    pub choices: Vec<OpenAIDeltaChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIDeltaChoice {
    #[serde(default)]
    pub delta: Option<OpenAIDeltaContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIDeltaContent {
    pub content: Option<String>,
}

/// Decoder for OpenAI chat completion streams
///
/// SSE format:
/// ```text
/// data: {"id":"...","choices":[{"delta":{"content":"Hello"}}]}
///
/// data: {"id":"...","choices":[{"delta":{"content":" world"}}]}
///
/// data: [DONE]
/// ```
pub fn decoder() -> SseDecoder {
    SseDecoder::new(decode_payload)
}

fn decode_payload(data: &str) -> Result<SsePayload, serde_json::Error> {
    let delta: OpenAIDelta = serde_json::from_str(data)?;

    // usage 等尾包没有 choices
    let Some(choice) = delta.choices.into_iter().next() else {
        return Ok(SsePayload::default());
    };

    Ok(SsePayload {
        text: choice.delta.and_then(|d| d.content),
        done: choice.finish_reason.is_some(),
    })
}
