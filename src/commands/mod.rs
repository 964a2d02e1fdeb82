//! Command implementations.
//!
//! # Modules
//! - `generate` - Article generation flow.
//! - `history` - History browsing and title selection.
//! - `export` - Export a saved article.
//! - `config` - Configuration inspection.
//! - `format` - Output format definition.
//! - `options` - Command option structs.
//! - `json` - JSON output helpers.
//!
//! # Architecture
//! ```text
//! CLI (cli.rs)
//!   ├── commands/generate.rs ─> llm::Generator ─> history::HistoryStore
//!   ├── commands/history.rs
//!   ├── commands/export.rs  ─> export.rs
//!   └── commands/config.rs
//! ```

/// Configuration show/path/validate commands.
pub mod config;
/// Export command.
pub mod export;
/// Output format types and parsing helpers.
pub mod format;
/// Article generation command flow.
pub mod generate;
/// History management commands.
pub mod history;
/// Shared JSON output helpers.
pub mod json;
/// Shared command option structs.
pub mod options;

pub use format::OutputFormat;
pub use options::{GenerateArgs, GenerateOptions};
