//! Vendor adapters
//!
//! Each vendor contributes a request builder (`qwen`, `gemini`, `openai`)
//! and a stream decoder (`streaming::*`). Dispatch is a closed enum.

pub mod gemini;
pub mod openai;
pub mod qwen;
pub mod streaming;
pub mod utils;

#[cfg(test)]
pub mod test_utils;

use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use reqwest::{Client, Method};
use serde::{Deserialize, Serialize};

use crate::config::{NetworkConfig, ProxyMode};
use crate::error::{ForgeError, Result};
use crate::llm::GenerationRequest;
use streaming::{GeminiDecoder, StreamDecoder};
use utils::{apply_proxy_prefix, mask_api_key};

/// 全局 HTTP 客户端（共享连接池）
static HTTP_CLIENT: OnceLock<Client> = OnceLock::new();

/// 全局 HTTP 客户端初始化错误信息
///
/// 如果第一次创建失败，保存错误字符串以避免后续重复创建。
static HTTP_CLIENT_ERROR: OnceLock<String> = OnceLock::new();

fn user_agent() -> String {
    format!(
        "{}/{} ({})",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS
    )
}

/// 获取或创建全局 HTTP 客户端
///
/// 使用 OnceLock 确保只创建一次，所有生成调用共享同一个连接池。
/// 第一次调用时的 NetworkConfig 决定 connect timeout。
/// 不设置整体 timeout：流式读取的超时由 generator 控制。
pub(crate) fn create_http_client(network_config: &NetworkConfig) -> Result<Client> {
    if let Some(client) = HTTP_CLIENT.get() {
        return Ok(client.clone());
    }

    if let Some(err_msg) = HTTP_CLIENT_ERROR.get() {
        return Err(ForgeError::Config(format!(
            "HTTP client initialization failed earlier: {}",
            err_msg
        )));
    }

    match Client::builder()
        .user_agent(user_agent())
        .connect_timeout(Duration::from_secs(network_config.connect_timeout))
        .build()
    {
        Ok(client) => {
            let _ = HTTP_CLIENT.set(client.clone());
            Ok(client)
        }
        Err(e) => {
            let err_msg = e.to_string();
            let _ = HTTP_CLIENT_ERROR.set(err_msg.clone());
            Err(ForgeError::Config(format!(
                "Failed to create HTTP client: {}",
                err_msg
            )))
        }
    }
}

/// 创建走正向代理的专用客户端（不缓存，代理地址可能随请求变化）
pub(crate) fn create_proxied_client(
    network_config: &NetworkConfig,
    proxy_url: &str,
) -> Result<Client> {
    let proxy = reqwest::Proxy::all(proxy_url.trim()).map_err(|e| {
        ForgeError::Validation(format!("proxy_url '{}' is not usable: {}", proxy_url, e))
    })?;

    Client::builder()
        .user_agent(user_agent())
        .connect_timeout(Duration::from_secs(network_config.connect_timeout))
        .proxy(proxy)
        .build()
        .map_err(|e| ForgeError::Config(format!("Failed to create proxied HTTP client: {}", e)))
}

/// Supported vendors.
///
/// Adding a vendor means one variant here, one request builder and one decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Alibaba DashScope (Qwen)
    Qwen,
    /// Google Gemini
    Gemini,
    /// OpenAI ChatGPT
    #[serde(rename = "chatgpt")]
    ChatGpt,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [ProviderKind::Qwen, ProviderKind::Gemini, ProviderKind::ChatGpt];

    /// Returns the default model name for this vendor.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::Qwen => "qwen-plus",
            ProviderKind::Gemini => "gemini-pro",
            ProviderKind::ChatGpt => "gpt-3.5-turbo",
        }
    }

    /// Human-readable vendor name used in messages and logs.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::Qwen => "Qwen",
            ProviderKind::Gemini => "Gemini",
            ProviderKind::ChatGpt => "ChatGPT",
        }
    }

    /// Resolves the model to send: empty means the vendor default.
    pub fn resolve_model<'a>(&self, model: &'a str) -> &'a str {
        let trimmed = model.trim();
        if trimmed.is_empty() {
            self.default_model()
        } else {
            trimmed
        }
    }

    /// Builds the vendor HTTP request. Deterministic for identical input.
    pub fn build_request(&self, request: &GenerationRequest) -> ProviderRequest {
        let mut built = match self {
            ProviderKind::Qwen => qwen::build_request(request),
            ProviderKind::Gemini => gemini::build_request(request),
            ProviderKind::ChatGpt => openai::build_request(request),
        };

        if request.proxy_mode == ProxyMode::Prefix
            && let Some(proxy_url) = request.proxy_url.as_deref()
        {
            built.url = apply_proxy_prefix(proxy_url, &built.url);
        }

        built
    }

    /// A fresh decoder for one response body.
    pub fn decoder(&self) -> Box<dyn StreamDecoder> {
        match self {
            ProviderKind::Qwen => Box::new(streaming::qwen::decoder()),
            ProviderKind::Gemini => Box::new(GeminiDecoder::new()),
            ProviderKind::ChatGpt => Box::new(streaming::openai::decoder()),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::Qwen => write!(f, "qwen"),
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::ChatGpt => write!(f, "chatgpt"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ForgeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "qwen" | "dashscope" => Ok(ProviderKind::Qwen),
            "gemini" => Ok(ProviderKind::Gemini),
            "chatgpt" | "openai" => Ok(ProviderKind::ChatGpt),
            _ => Err(ForgeError::UnsupportedProvider(s.to_string())),
        }
    }
}

/// A fully described vendor HTTP request, ready to send.
#[derive(Clone, PartialEq)]
pub struct ProviderRequest {
    pub url: String,
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl ProviderRequest {
    pub(crate) fn post_json(url: String, body: serde_json::Value) -> Self {
        Self {
            url,
            method: Method::POST,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    pub(crate) fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// `key=` 查询参数中的密钥打码
fn mask_url_key(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let masked: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some(("key", value)) => format!("key={}", mask_api_key(value)),
            _ => pair.to_string(),
        })
        .collect();

    format!("{}?{}", base, masked.join("&"))
}

impl fmt::Debug for ProviderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let headers: Vec<(String, String)> = self
            .headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("authorization") {
                    let token = value.strip_prefix("Bearer ").unwrap_or(value);
                    (name.clone(), format!("Bearer {}", mask_api_key(token)))
                } else {
                    (name.clone(), value.clone())
                }
            })
            .collect();

        f.debug_struct("ProviderRequest")
            .field("url", &mask_url_key(&self.url))
            .field("method", &self.method)
            .field("headers", &headers)
            .field("body", &self.body)
            .finish()
    }
}
