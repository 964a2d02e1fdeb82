//! Google Gemini `streamGenerateContent` request builder
//!
//! The key travels as the `key` query parameter; there is no auth header.
//!
//! ```toml
//! [llm.providers.gemini]
//! api_key = "AIza..."
//! model = "gemini-pro"
//! ```

use serde_json::json;

use super::utils::DEFAULT_GEMINI_BASE;
use super::{ProviderKind, ProviderRequest};
use crate::llm::GenerationRequest;

pub(super) fn build_request(request: &GenerationRequest) -> ProviderRequest {
    let base = request.endpoint.as_deref().unwrap_or(DEFAULT_GEMINI_BASE);
    let model = ProviderKind::Gemini.resolve_model(&request.model);
    let url = format!(
        "{}/v1beta/models/{}:streamGenerateContent?key={}",
        base.trim_end_matches('/'),
        model,
        request.api_key
    );

    let body = json!({
        "contents": [{ "parts": [{ "text": request.prompt }] }],
    });

    ProviderRequest::post_json(url, body)
}
