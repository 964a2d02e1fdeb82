mod app;
mod llm;
mod network;
mod proxy;

pub use app::{AppConfig, HistoryConfig, UIConfig};
pub use llm::{LLMConfig, ProviderConfig};
pub use network::NetworkConfig;
pub use proxy::{ProxyConfig, ProxyMode};
