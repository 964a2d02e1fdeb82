//! OpenAI (ChatGPT) chat completions request builder
//!
//! ```toml
//! [llm.providers.chatgpt]
//! api_key = "sk-..."
//! model = "gpt-3.5-turbo"
//! endpoint = "https://api.openai.com" # optional, any OpenAI-compatible gateway
//! ```

use serde_json::json;

use super::utils::{DEFAULT_OPENAI_BASE, OPENAI_API_SUFFIX, complete_endpoint};
use super::{ProviderKind, ProviderRequest};
use crate::llm::GenerationRequest;

pub(super) fn build_request(request: &GenerationRequest) -> ProviderRequest {
    let base = request.endpoint.as_deref().unwrap_or(DEFAULT_OPENAI_BASE);
    let url = complete_endpoint(base, OPENAI_API_SUFFIX);
    let model = ProviderKind::ChatGpt.resolve_model(&request.model);

    let body = json!({
        "model": model,
        "messages": [{ "role": "user", "content": request.prompt }],
        "stream": true,
    });

    ProviderRequest::post_json(url, body)
        .with_header("Authorization", format!("Bearer {}", request.api_key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_openai_request_shape() {
        let request = GenerationRequest::new("chatgpt", "sk-test-1234567890", "写一篇关于 Rust 的文章");
        let built = build_request(&request);

        assert_eq!(built.url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(built.method, reqwest::Method::POST);
        assert_eq!(built.header("Authorization"), Some("Bearer sk-test-1234567890"));
        assert_eq!(built.header("Content-Type"), Some("application/json"));
        assert_eq!(
            built.body,
            json!({
                "model": "gpt-3.5-turbo",
                "messages": [{ "role": "user", "content": "写一篇关于 Rust 的文章" }],
                "stream": true,
            })
        );
    }

    #[test]
    fn test_openai_custom_endpoint_and_model() {
        let request = GenerationRequest::new("chatgpt", "sk-test-1234567890", "p")
            .with_model("gpt-4o-mini")
            .with_endpoint(Some("https://gateway.example.com/v1".to_string()));
        let built = build_request(&request);

        assert_eq!(built.url, "https://gateway.example.com/v1/chat/completions");
        assert_eq!(built.body["model"], "gpt-4o-mini");
    }
}
