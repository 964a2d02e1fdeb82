//! Proxy configuration structures.

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::llm::provider::utils::{is_valid_proxy_url, proxy_schemes};

/// How the proxy address is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProxyMode {
    /// Relay reached as `<proxy>/<full vendor URL>`.
    #[default]
    Prefix,
    /// Forward proxy configured on the client (http, https, socks5, socks5h).
    Forward,
}

/// Proxy configuration.
///
/// Gemini and ChatGPT are unreachable from some regions without one.
///
/// # Example
/// ```toml
/// [proxy]
/// enabled = true
/// url = "http://127.0.0.1:8080"
/// mode = "prefix" # or "forward"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ProxyConfig {
    /// Whether requests go through the proxy.
    #[serde(default)]
    pub enabled: bool,

    /// Proxy address.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub mode: ProxyMode,
}

impl ProxyConfig {
    /// The proxy address to use, if the proxy is switched on.
    pub fn effective_url(&self) -> Option<String> {
        if !self.enabled {
            return None;
        }
        self.url.clone()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        match self.url.as_deref() {
            Some(url) if is_valid_proxy_url(url, self.mode) => Ok(()),
            Some(url) => Err(ForgeError::Config(format!(
                "proxy.url '{}' must start with one of {} in {:?} mode",
                url,
                proxy_schemes(self.mode).join(", "),
                self.mode
            ))),
            None => Err(ForgeError::Config(
                "proxy.enabled is true but proxy.url is not set".to_string(),
            )),
        }
    }
}
