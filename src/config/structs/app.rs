//! Top-level application configuration.

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};

use super::llm::{LLMConfig, ProviderConfig};
use super::network::NetworkConfig;
use super::proxy::ProxyConfig;

/// Application configuration.
///
/// Effective configuration is merged from multiple sources (low to high):
/// 1. Rust defaults (`Default` + `serde(default)`)
/// 2. User-level config file (platform-specific config directory)
/// 3. `ARTICLE_FORGE__*` environment variables
/// 4. CI mode overrides (`CI=1` + `ARTICLE_FORGE_CI_*`)
///
/// # Configuration File Locations
/// - Linux: `~/.config/article-forge/config.toml`
/// - macOS: `~/Library/Application Support/article-forge/config.toml`
/// - Windows: `%APPDATA%\article-forge\config\config.toml`
///
/// # Example
/// ```toml
/// [llm]
/// default_provider = "qwen"
///
/// [llm.providers.qwen]
/// api_key = "sk-..."
/// model = "qwen-plus"
///
/// [proxy]
/// enabled = true
/// url = "http://127.0.0.1:8080"
///
/// [ui]
/// colored = true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct AppConfig {
    /// LLM provider and prompt settings.
    #[serde(default)]
    pub llm: LLMConfig,

    /// Proxy used for vendor requests.
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// HTTP timeouts and decode tolerance.
    #[serde(default)]
    pub network: NetworkConfig,

    /// Terminal UI behavior.
    #[serde(default)]
    pub ui: UIConfig,

    /// Local article history.
    #[serde(default)]
    pub history: HistoryConfig,
}

impl AppConfig {
    /// Validates configuration consistency.
    pub fn validate(&self) -> Result<()> {
        if !self.llm.providers.is_empty()
            && !self.llm.providers.contains_key(&self.llm.default_provider)
        {
            return Err(ForgeError::Config(format!(
                "default_provider '{}' not found in config [llm.providers]",
                self.llm.default_provider
            )));
        }

        for (name, provider) in &self.llm.providers {
            provider.validate(name)?;
        }
        self.proxy.validate()?;
        self.network.validate()?;
        self.history.validate()?;
        Ok(())
    }

    /// Provider settings by name.
    ///
    /// Built-in vendor names (`qwen`, `gemini`, `chatgpt` and aliases) resolve
    /// even without a config section, so the error about the missing key is
    /// reported by request validation instead.
    pub fn provider(&self, name: &str) -> Result<ProviderConfig> {
        if let Some(config) = self.llm.providers.get(name) {
            return Ok(config.clone());
        }
        if name.parse::<crate::llm::provider::ProviderKind>().is_ok() {
            return Ok(ProviderConfig::default());
        }
        Err(ForgeError::Config(format!(
            "Provider '{}' not found in config",
            name
        )))
    }
}

/// UI configuration.
///
/// # Fields
/// - `colored`: enable colored output (default: `true`)
/// - `streaming`: print fragments as they arrive (default: `true`)
///
/// # Example
/// ```toml
/// [ui]
/// colored = true
/// streaming = true
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UIConfig {
    /// Whether to enable color output.
    #[serde(default = "default_true")]
    pub colored: bool,

    /// Whether to enable streaming output (real-time typing effect).
    #[serde(default = "default_true")]
    pub streaming: bool,
}

impl Default for UIConfig {
    fn default() -> Self {
        Self {
            colored: true,
            streaming: true,
        }
    }
}

/// History configuration.
///
/// # Fields
/// - `enabled`: record generated articles (default: `true`)
/// - `max_items`: oldest items are dropped beyond this count (default: `100`)
///
/// # Example
/// ```toml
/// [history]
/// enabled = true
/// max_items = 100
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HistoryConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_max_items")]
    pub max_items: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_items: default_max_items(),
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_items == 0 {
            return Err(ForgeError::Config("history.max_items cannot be 0".into()));
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_max_items() -> usize {
    100
}
