//! Configuration: TOML file + `ARTICLE_FORGE__*` environment overrides.

mod loader;
mod structs;

pub use loader::{get_config_dir, get_config_path, get_data_dir, load_config, load_config_from};
pub use structs::{
    AppConfig, HistoryConfig, LLMConfig, NetworkConfig, ProviderConfig, ProxyConfig, ProxyMode,
    UIConfig,
};
