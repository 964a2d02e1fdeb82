//! LLM provider configuration structures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::llm::provider::ProviderKind;

/// Provider configuration.
///
/// Settings for one entry under `[llm.providers.<name>]`.
///
/// # Fields
/// - `kind`: vendor adapter (optional; inferred from the provider name)
/// - `endpoint`: custom base URL (optional)
/// - `api_key`: API key
/// - `model`: model name (empty means the vendor default)
///
/// # Example
/// ```toml
/// [llm.providers.qwen]
/// api_key = "sk-..."
/// model = "qwen-max"
///
/// [llm.providers.deepseek]
/// kind = "chatgpt"
/// endpoint = "https://api.deepseek.com"
/// api_key = "sk-..."
/// model = "deepseek-chat"
/// ```
#[derive(Clone, Default, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Vendor adapter used for this entry.
    ///
    /// If omitted, it is inferred from the provider name.
    #[serde(default)]
    pub kind: Option<ProviderKind>,

    /// API base URL.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// API key.
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Model name.
    #[serde(default)]
    pub model: String,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use crate::llm::provider::utils::mask_api_key;
        let masked_key = self.api_key.as_deref().map(mask_api_key);
        f.debug_struct("ProviderConfig")
            .field("kind", &self.kind)
            .field("endpoint", &self.endpoint)
            .field("api_key", &masked_key)
            .field("model", &self.model)
            .finish()
    }
}

impl ProviderConfig {
    /// Vendor adapter for the entry called `name`.
    pub fn resolve_kind(&self, name: &str) -> Result<ProviderKind> {
        match self.kind {
            Some(kind) => Ok(kind),
            None => name.parse(),
        }
    }

    /// Validates provider configuration.
    pub fn validate(&self, name: &str) -> Result<()> {
        self.resolve_kind(name).map_err(|_| {
            ForgeError::Config(format!(
                "Provider '{}': cannot infer vendor from name, set kind = \"qwen\" | \"gemini\" | \"chatgpt\"",
                name
            ))
        })?;
        if let Some(ref key) = self.api_key
            && key.trim().is_empty()
        {
            return Err(ForgeError::Config(format!(
                "Provider '{}': api_key is empty",
                name
            )));
        }
        if let Some(ref endpoint) = self.endpoint
            && !(endpoint.starts_with("http://") || endpoint.starts_with("https://"))
        {
            return Err(ForgeError::Config(format!(
                "Provider '{}': endpoint '{}' must start with http:// or https://",
                name, endpoint
            )));
        }
        Ok(())
    }
}

/// LLM configuration.
///
/// # Fields
/// - `default_provider`: provider name used when `--provider` is not given
/// - `providers`: per-provider settings map
/// - `prompt_template`: replaces the built-in article prompt (optional)
///
/// # Example
/// ```toml
/// [llm]
/// default_provider = "qwen"
///
/// [llm.providers.qwen]
/// api_key = "sk-..."
///
/// [llm.providers.chatgpt]
/// api_key = "sk-..."
/// model = "gpt-4o-mini"
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LLMConfig {
    /// Provider name used by default.
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Provider settings keyed by provider name.
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,

    /// Custom article prompt with `{{keywords}}`-style placeholders.
    #[serde(default)]
    pub prompt_template: Option<String>,
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            prompt_template: None,
        }
    }
}

fn default_provider() -> String {
    "qwen".to_string()
}
