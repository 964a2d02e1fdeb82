//! Provider utility functions
//!
//! Endpoint completion, proxy URL rewriting and API key masking

use crate::config::ProxyMode;

/// DashScope (Qwen) default base URL
pub const DEFAULT_QWEN_BASE: &str = "https://dashscope.aliyuncs.com";

/// DashScope text-generation endpoint suffix
pub const QWEN_API_SUFFIX: &str = "/api/v1/services/aigc/text-generation/generation";

/// Gemini default base URL
pub const DEFAULT_GEMINI_BASE: &str = "https://generativelanguage.googleapis.com";

/// OpenAI default base URL
pub const DEFAULT_OPENAI_BASE: &str = "https://api.openai.com";

/// OpenAI API endpoint suffix
pub const OPENAI_API_SUFFIX: &str = "/v1/chat/completions";

/// Smart completion API endpoint
///
/// # Behavior
/// 1. Remove trailing slashes
/// 2. Check whether the URL contains the full path
/// 3. If incomplete, automatically complete suffix
///
/// # Example
/// ```
/// use article_forge::llm::provider::utils::complete_endpoint;
///
/// assert_eq!(
///     complete_endpoint("https://api.deepseek.com", "/v1/chat/completions"),
///     "https://api.deepseek.com/v1/chat/completions"
/// );
///
/// assert_eq!(
///     complete_endpoint("https://api.deepseek.com/v1", "/v1/chat/completions"),
///     "https://api.deepseek.com/v1/chat/completions"
/// );
/// ```
pub fn complete_endpoint(base_url: &str, expected_suffix: &str) -> String {
    let url = base_url.trim_end_matches('/');
    let suffix = expected_suffix.trim_start_matches('/');

    if url.ends_with(suffix) {
        return url.to_string();
    }

    // url "https://api.com/v1" + suffix "v1/chat/completions" -> only "/chat/completions" is missing
    let suffix_parts: Vec<&str> = suffix.split('/').collect();
    for i in 0..suffix_parts.len() {
        let partial_suffix = suffix_parts[..=i].join("/");
        if url.ends_with(&partial_suffix) {
            let remaining_suffix = &suffix_parts[i + 1..].join("/");
            if remaining_suffix.is_empty() {
                return url.to_string();
            }
            return format!("{}/{}", url, remaining_suffix);
        }
    }

    if is_complete_api_path(url) {
        return url.to_string();
    }

    format!("{}/{}", url, suffix)
}

/// Path depth >= 2 is treated as a user-defined complete API path
fn is_complete_api_path(url: &str) -> bool {
    let path = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .and_then(|rest| rest.split_once('/'))
        .map(|(_, path)| path)
        .unwrap_or("");

    path.split('/').filter(|s| !s.is_empty()).count() >= 2
}

/// Routes a vendor URL through a prefix-style relay.
///
/// The relay receives the full vendor URL as its path:
/// `<proxy>/<vendor url>`.
///
/// # Example
/// ```
/// use article_forge::llm::provider::utils::apply_proxy_prefix;
///
/// assert_eq!(
///     apply_proxy_prefix("http://127.0.0.1:8080/", "https://api.openai.com/v1/chat/completions"),
///     "http://127.0.0.1:8080/https://api.openai.com/v1/chat/completions"
/// );
/// ```
pub fn apply_proxy_prefix(proxy_url: &str, target_url: &str) -> String {
    format!("{}/{}", proxy_url.trim().trim_end_matches('/'), target_url)
}

/// Schemes accepted for each proxy mode
pub fn proxy_schemes(mode: ProxyMode) -> &'static [&'static str] {
    match mode {
        ProxyMode::Prefix => &["http://", "https://"],
        // reqwest socks feature
        ProxyMode::Forward => &["http://", "https://", "socks5://", "socks5h://"],
    }
}

/// Whether a proxy address is usable in `mode` (non-blank, supported scheme)
pub fn is_valid_proxy_url(proxy_url: &str, mode: ProxyMode) -> bool {
    let trimmed = proxy_url.trim();
    let rest = proxy_schemes(mode)
        .iter()
        .find_map(|scheme| trimmed.strip_prefix(scheme));
    matches!(rest, Some(host) if !host.is_empty())
}

/// Mask API key to prevent log leaks
///
/// # rule
/// - length > 8: display first 4 characters + `...` + last 4 characters
/// - length <= 8: display `****`
///
/// # Example
/// ```
/// use article_forge::llm::provider::utils::mask_api_key;
///
/// assert_eq!(mask_api_key("sk-ant-api03-abcdefgh"), "sk-a...efgh");
/// assert_eq!(mask_api_key("short"), "****");
/// assert_eq!(mask_api_key(""), "****");
/// ```
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "****".to_string()
    }
}

/// Replaces every occurrence of `secret` in `text` with its masked form
pub fn redact(text: &str, secret: &str) -> String {
    if secret.is_empty() {
        return text.to_string();
    }
    text.replace(secret, &mask_api_key(secret))
}
