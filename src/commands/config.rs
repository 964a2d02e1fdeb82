use crate::cli::ConfigAction;
use crate::config::{self, AppConfig, load_config};
use crate::error::{ForgeError, Result};
use crate::llm::provider::ProviderKind;
use crate::llm::provider::utils::mask_api_key;
use crate::ui;

pub fn run(action: Option<ConfigAction>, colored: bool) -> Result<()> {
    // 默认行为：show
    match action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(),
        ConfigAction::Path => path(colored),
        ConfigAction::Validate => validate(colored),
    }
}

/// 打印生效配置（api_key 不参与序列化）
fn show() -> Result<()> {
    let config = load_config()?;
    println!("{}", render_effective(&config)?);
    Ok(())
}

fn render_effective(config: &AppConfig) -> Result<String> {
    toml::to_string_pretty(config)
        .map_err(|e| ForgeError::Config(format!("Failed to render config: {}", e)))
}

fn path(colored: bool) -> Result<()> {
    let path = config::get_config_path()
        .ok_or_else(|| ForgeError::Config("Cannot determine the config directory".into()))?;
    println!("{}", path.display());
    if !path.exists() {
        ui::warning("File does not exist yet; built-in defaults are in effect", colored);
    }
    Ok(())
}

/// 验证配置
fn validate(colored: bool) -> Result<()> {
    ui::step("1/2", "Loading configuration...", colored);
    let config = load_config()?;
    ui::success("Configuration loaded", colored);

    ui::step("2/2", "Checking providers...", colored);
    config.validate()?;

    for line in provider_report(&config) {
        println!("  • {}", line);
    }

    let default = config.provider(&config.llm.default_provider)?;
    if default.api_key.as_deref().is_none_or(|k| k.trim().is_empty()) {
        ui::warning(
            &format!(
                "Default provider '{}' has no api_key; generation will fail",
                config.llm.default_provider
            ),
            colored,
        );
    } else {
        ui::success(
            &format!(
                "Configuration is valid (default provider: {})",
                config.llm.default_provider
            ),
            colored,
        );
    }
    Ok(())
}

/// One line per configured (or built-in) provider.
fn provider_report(config: &AppConfig) -> Vec<String> {
    let mut names: Vec<String> = config.llm.providers.keys().cloned().collect();
    if names.is_empty() {
        names = ProviderKind::ALL.iter().map(ToString::to_string).collect();
    }
    names.sort_unstable();

    names
        .into_iter()
        .filter_map(|name| {
            let provider = config.provider(&name).ok()?;
            let kind = provider.resolve_kind(&name).ok()?;
            let key = provider
                .api_key
                .as_deref()
                .map(mask_api_key)
                .unwrap_or_else(|| "(no api_key)".to_string());
            let default_marker = if name == config.llm.default_provider {
                " [default]"
            } else {
                ""
            };
            Some(format!(
                "{}{}: {} / {} / {}",
                name,
                default_marker,
                kind.display_name(),
                kind.resolve_model(&provider.model),
                key
            ))
        })
        .collect()
}
