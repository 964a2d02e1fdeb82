//! Alibaba DashScope (Qwen) text-generation request builder
//!
//! Streaming is switched on by the `X-DashScope-SSE: enable` header;
//! `incremental_output` makes each event carry only the new text.

use serde_json::json;

use super::utils::{DEFAULT_QWEN_BASE, QWEN_API_SUFFIX, complete_endpoint};
use super::{ProviderKind, ProviderRequest};
use crate::llm::GenerationRequest;

pub(super) fn build_request(request: &GenerationRequest) -> ProviderRequest {
    let base = request.endpoint.as_deref().unwrap_or(DEFAULT_QWEN_BASE);
    let url = complete_endpoint(base, QWEN_API_SUFFIX);
    let model = ProviderKind::Qwen.resolve_model(&request.model);

    let body = json!({
        "model": model,
        "input": {
            "messages": [{ "role": "user", "content": request.prompt }],
        },
        "parameters": {
            "result_format": "message",
            "incremental_output": true,
        },
    });

    ProviderRequest::post_json(url, body)
        .with_header("Authorization", format!("Bearer {}", request.api_key))
        .with_header("X-DashScope-SSE", "enable")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_qwen_request_shape() {
        let request = GenerationRequest::new("qwen", "sk-dashscope-123456", "prompt text");
        let built = build_request(&request);

        assert_eq!(
            built.url,
            "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation"
        );
        assert_eq!(built.header("Authorization"), Some("Bearer sk-dashscope-123456"));
        assert_eq!(built.header("X-DashScope-SSE"), Some("enable"));
        assert_eq!(built.body["model"], "qwen-plus");
        assert_eq!(built.body["input"]["messages"][0]["role"], "user");
        assert_eq!(built.body["input"]["messages"][0]["content"], "prompt text");
        assert_eq!(built.body["parameters"]["result_format"], "message");
        assert_eq!(built.body["parameters"]["incremental_output"], true);
    }

    #[test]
    fn test_qwen_model_override() {
        let request = GenerationRequest::new("qwen", "sk-dashscope-123456", "p").with_model("qwen-max");
        assert_eq!(build_request(&request).body["model"], "qwen-max");
    }
}
