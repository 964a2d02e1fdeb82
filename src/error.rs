use thiserror::Error;

use crate::llm::article::ArticleRejection;

pub type Result<T> = std::result::Result<T, ForgeError>;

#[derive(Error, Debug)]
pub enum ForgeError {
    /// 请求字段缺失或非法，在任何网络调用之前检测
    #[error("Invalid generation request: {0}")]
    Validation(String),

    #[error("Unsupported provider: '{0}' (expected one of: qwen, gemini, chatgpt)")]
    UnsupportedProvider(String),

    /// 非 2xx 状态码、网络失败或不可恢复的流
    #[error("{provider} transport error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Transport {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// 累积文本无法通过文章结构校验，`raw` 保留完整原文用于诊断
    #[error("Malformed model response: {reason}")]
    MalformedResponse { reason: ArticleRejection, raw: String },

    #[error("Generation cancelled")]
    Cancelled,

    #[error("{provider} request timed out waiting for {stage} after {seconds}s")]
    Timeout {
        provider: String,
        stage: &'static str,
        seconds: u64,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration parsing error: {0}")]
    ConfigParse(#[from] config::ConfigError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("History error: {0}")]
    History(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ForgeError {
    /// 获取错误的解决建议
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            ForgeError::Validation(msg) if msg.contains("api_key") => Some(
                "Add 'api_key = \"...\"' under [llm.providers.<name>] in ~/.config/article-forge/config.toml",
            ),
            ForgeError::Validation(msg) if msg.contains("proxy_url") => {
                Some(
                    "Proxy URL must start with http:// or https:// (socks5:// and socks5h:// need proxy.mode = \"forward\"), e.g. http://127.0.0.1:8080",
                )
            }
            ForgeError::UnsupportedProvider(_) => {
                Some("Use one of the supported providers: qwen, gemini, chatgpt")
            }
            ForgeError::Transport {
                status: Some(401), ..
            } => Some("Check that your API key is correct, valid and has remaining quota"),
            ForgeError::Transport {
                status: Some(403), ..
            } => Some(
                "Access denied. Check the API key permissions, whether a proxy is required, or whether your IP is restricted",
            ),
            ForgeError::Transport {
                status: Some(429), ..
            } => Some("Rate limit exceeded. Wait a moment and try again, or upgrade your API plan"),
            ForgeError::Transport {
                status: Some(500..=599),
                ..
            } => Some("API service is temporarily unavailable. Try again in a few moments"),
            ForgeError::Transport { status: None, .. } | ForgeError::Network(_) => Some(
                "Check your network connection and proxy settings. Gemini/ChatGPT may require a proxy in some regions",
            ),
            ForgeError::Timeout { .. } => Some(
                "The API did not respond in time. Check the network or raise [network] timeouts in the config",
            ),
            ForgeError::MalformedResponse { .. } => Some(
                "The model did not return the expected article JSON. Try again or use --verbose to see the raw response",
            ),
            ForgeError::Config(msg) if msg.contains("not found in config") => Some(
                "Check ~/.config/article-forge/config.toml or use the built-in providers: qwen, gemini, chatgpt",
            ),
            _ => None,
        }
    }

    /// 稳定的错误码，用于 JSON 输出
    pub fn code(&self) -> &'static str {
        match self {
            ForgeError::Validation(_) => "VALIDATION_ERROR",
            ForgeError::UnsupportedProvider(_) => "UNSUPPORTED_PROVIDER",
            ForgeError::Transport { .. } => "TRANSPORT_ERROR",
            ForgeError::MalformedResponse { .. } => "MALFORMED_RESPONSE",
            ForgeError::Cancelled => "CANCELLED",
            ForgeError::Timeout { .. } => "TIMEOUT",
            ForgeError::Config(_) | ForgeError::ConfigParse(_) => "CONFIG_ERROR",
            ForgeError::Network(_) => "NETWORK_ERROR",
            ForgeError::Io(_) => "IO_ERROR",
            ForgeError::Serde(_) => "SERIALIZATION_ERROR",
            ForgeError::History(_) => "HISTORY_ERROR",
            ForgeError::InvalidInput(_) => "INVALID_INPUT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(status: Option<u16>) -> ForgeError {
        ForgeError::Transport {
            provider: "ChatGPT".to_string(),
            status,
            message: "boom".to_string(),
        }
    }

    // === Validation 分支 ===

    #[test]
    fn test_suggestion_missing_api_key() {
        let err = ForgeError::Validation("api_key must not be empty".to_string());
        assert!(err.suggestion().unwrap().contains("[llm.providers.<name>]"));
    }

    #[test]
    fn test_suggestion_bad_proxy_url() {
        let err = ForgeError::Validation("proxy_url must start with http".to_string());
        assert!(err.suggestion().unwrap().contains("http://"));
    }

    // === Transport 分支 ===

    #[test]
    fn test_suggestion_transport_401() {
        let suggestion = transport(Some(401)).suggestion().unwrap();
        assert!(suggestion.contains("API key"));
    }

    #[test]
    fn test_suggestion_transport_403_mentions_proxy() {
        let suggestion = transport(Some(403)).suggestion().unwrap();
        assert!(suggestion.contains("proxy"));
    }

    #[test]
    fn test_suggestion_transport_5xx() {
        for status in [500, 502, 503] {
            let suggestion = transport(Some(status)).suggestion().unwrap();
            assert!(suggestion.contains("temporarily unavailable"));
        }
    }

    #[test]
    fn test_suggestion_transport_without_status_is_network() {
        let suggestion = transport(None).suggestion().unwrap();
        assert!(suggestion.contains("network"));
    }

    #[test]
    fn test_transport_display_includes_status() {
        assert_eq!(
            transport(Some(401)).to_string(),
            "ChatGPT transport error (401): boom"
        );
        assert_eq!(transport(None).to_string(), "ChatGPT transport error: boom");
    }

    #[test]
    fn test_malformed_display_carries_reason() {
        let err = ForgeError::MalformedResponse {
            reason: ArticleRejection::TitlesLength(3),
            raw: "{}".to_string(),
        };
        assert!(err.to_string().contains("titles length != 5"));
        assert!(err.suggestion().is_some());
    }

    // === 无建议的分支 ===

    #[test]
    fn test_suggestion_returns_none_for_other_errors() {
        let cases = vec![
            ForgeError::Cancelled,
            ForgeError::InvalidInput("bad".to_string()),
            ForgeError::History("missing".to_string()),
            ForgeError::Config("some random config error".to_string()),
        ];

        for err in cases {
            assert!(
                err.suggestion().is_none(),
                "Expected None for {:?}, got {:?}",
                err,
                err.suggestion()
            );
        }
    }

    #[test]
    fn test_error_codes_are_distinct_for_generation_kinds() {
        let codes = [
            ForgeError::Validation(String::new()).code(),
            ForgeError::UnsupportedProvider(String::new()).code(),
            transport(None).code(),
            ForgeError::Cancelled.code(),
            ForgeError::Timeout {
                provider: String::new(),
                stage: "first byte",
                seconds: 1,
            }
            .code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
