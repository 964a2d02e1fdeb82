//! Test utilities for provider and generator tests

use crate::config::NetworkConfig;
use crate::llm::GenerationRequest;

/// 在测试中安装 rustls crypto provider
///
/// reqwest 0.13 + rustls-no-provider 需要手动安装 crypto provider，
/// 生产代码在 main.rs 中完成，测试需要单独调用。
/// 多次调用是安全的（install_default 失败时忽略即可）。
pub fn ensure_crypto_provider() {
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// `NetworkConfig` with short timeouts so failing tests do not hang
pub fn test_network_config() -> NetworkConfig {
    NetworkConfig {
        first_byte_timeout: 5,
        stream_timeout: 10,
        ..Default::default()
    }
}

/// A request aimed at a mock server
///
/// # Parameters
/// - `provider` - provider id (`qwen`, `gemini`, `chatgpt`)
/// - `base_url` - Mock server URL (e.g., from `mockito::Server`)
pub fn test_request(provider: &str, base_url: &str) -> GenerationRequest {
    GenerationRequest::new(provider, "sk-test-1234567890", "Write about Rust")
        .with_endpoint(Some(base_url.to_string()))
}

/// A valid article JSON document
pub fn article_json() -> String {
    serde_json::json!({
        "titles": [
            { "title": "Rust in Production", "score": 9.5 },
            { "title": "Why Rust", "score": 8 },
            { "title": "Ownership Explained", "score": 7.5 },
            { "title": "Fearless Concurrency", "score": 7 },
            { "title": "Rust for Beginners", "score": 6 }
        ],
        "content": "# Rust\n\nRust is a systems programming language.",
        "tags": ["rust", "systems", "memory", "safety", "performance", "concurrency"]
    })
    .to_string()
}

/// Splits `text` into pieces of at most `size` chars
pub fn split_chars(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// OpenAI SSE body streaming `text` in pieces of `size` chars
pub fn openai_sse_body(text: &str, size: usize) -> String {
    let mut body = String::new();
    for piece in split_chars(text, size) {
        let event = serde_json::json!({
            "choices": [{ "delta": { "content": piece }, "finish_reason": null }]
        });
        body.push_str(&format!("data: {}\n\n", event));
    }
    body.push_str("data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n");
    body.push_str("data: [DONE]\n\n");
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_chars_keeps_multibyte() {
        assert_eq!(split_chars("你好ab", 3), vec!["你好a", "b"]);
    }

    #[test]
    fn test_article_json_is_valid_article() {
        assert!(crate::llm::parse_article(&article_json()).is_ok());
    }
}
