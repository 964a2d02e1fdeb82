// 配置加载逻辑
//
// 此文件负责从文件、环境变量和 CI 模式加载配置。

use config::{Config, Environment, File};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

use super::structs::{AppConfig, ProviderConfig};
use crate::error::{ForgeError, Result};
use crate::llm::provider::ProviderKind;

/// 应用名，决定配置目录与数据目录
const APP_NAME: &str = "article-forge";

/// 环境变量前缀
const ENV_PREFIX: &str = "ARTICLE_FORGE";

/// 加载应用配置
///
/// 配置加载优先级（从高到低）：
/// 1. CI 模式覆盖（`CI=1` + `ARTICLE_FORGE_CI_*`）
/// 2. 环境变量（ARTICLE_FORGE__* 前缀，双下划线表示嵌套）
///    - 例如：`ARTICLE_FORGE__LLM__DEFAULT_PROVIDER=gemini`
///    - 例如：`ARTICLE_FORGE__PROXY__ENABLED=true`
/// 3. 配置文件（~/.config/article-forge/config.toml）
/// 4. 默认值（来自 structs 的 Default trait 和 serde(default) 属性）
pub fn load_config() -> Result<AppConfig> {
    load_config_from(get_config_path().as_deref())
}

/// 从指定配置文件加载（文件不存在时只使用默认值与环境变量）
pub fn load_config_from(config_path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = Config::builder();

    // 1. 加载配置文件（如果存在）
    if let Some(config_path) = config_path
        && config_path.exists()
    {
        tracing::debug!("Loading config file: {}", config_path.display());
        builder = builder.add_source(File::from(config_path));
    }

    // 2. 加载环境变量（优先级高于文件）
    // 使用双下划线作为嵌套层级分隔符，避免与字段名中的单下划线冲突
    // 例如：ARTICLE_FORGE__LLM__DEFAULT_PROVIDER -> llm.default_provider
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    // 构建并反序列化配置
    let config = builder.build()?;
    let mut app_config: AppConfig = config.try_deserialize()?;

    // 3. CI 模式覆盖（优先级最高）
    apply_ci_mode_overrides(&mut app_config)?;

    Ok(app_config)
}

/// 应用 CI 模式环境变量覆盖
///
/// 当 `CI=1` 时，从以下环境变量构建 provider 配置：
/// - `ARTICLE_FORGE_CI_PROVIDER`: "qwen", "gemini", 或 "chatgpt"（必需）
/// - `ARTICLE_FORGE_CI_API_KEY`: API key（必需）
/// - `ARTICLE_FORGE_CI_MODEL`: 模型名称（可选，默认使用厂商默认模型）
/// - `ARTICLE_FORGE_CI_ENDPOINT`: 自定义端点（可选）
///
/// 该 provider 将被注入为 "ci" 并设为 default_provider。
fn apply_ci_mode_overrides(config: &mut AppConfig) -> Result<()> {
    use std::env;

    if env::var("CI").ok().as_deref() != Some("1") {
        return Ok(());
    }

    // CI 环境里未配置 provider 时保持普通加载行为
    let Ok(provider) = env::var("ARTICLE_FORGE_CI_PROVIDER") else {
        return Ok(());
    };

    let kind: ProviderKind = provider.parse().map_err(|_| {
        ForgeError::Config(format!(
            "Invalid ARTICLE_FORGE_CI_PROVIDER '{}'. Must be 'qwen', 'gemini', or 'chatgpt'.",
            provider
        ))
    })?;

    let api_key = env::var("ARTICLE_FORGE_CI_API_KEY").map_err(|_| {
        ForgeError::Config(
            "CI mode enabled but ARTICLE_FORGE_CI_API_KEY not set.".to_string(),
        )
    })?;

    let provider_config = ProviderConfig {
        kind: Some(kind),
        endpoint: env::var("ARTICLE_FORGE_CI_ENDPOINT").ok(),
        api_key: Some(api_key),
        model: env::var("ARTICLE_FORGE_CI_MODEL").unwrap_or_default(),
    };

    config
        .llm
        .providers
        .insert("ci".to_string(), provider_config);
    config.llm.default_provider = "ci".to_string();

    tracing::info!("CI mode enabled, using ARTICLE_FORGE_CI_PROVIDER={}", kind);

    Ok(())
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// 获取配置文件路径
///
/// 返回 ~/.config/article-forge/config.toml
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.toml"))
}

/// 获取配置目录路径
pub fn get_config_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().to_path_buf())
}

/// 获取数据目录路径（历史记录等）
pub fn get_data_dir() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.data_dir().to_path_buf())
}
