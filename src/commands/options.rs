//! Command option structs
//!
//! Built from parsed CLI arguments and passed to the command runners, so the
//! runners never depend on clap types directly.
//!
//! # Example
//! ```no_run
//! use article_forge::commands::options::GenerateOptions;
//! use article_forge::commands::format::OutputFormat;
//! use article_forge::llm::prompt::ArticleOptions;
//!
//! let options = GenerateOptions {
//!     article: ArticleOptions::new("rust ownership"),
//!     provider_override: None,
//!     model_override: None,
//!     proxy_override: None,
//!     no_history: false,
//!     format: OutputFormat::Text,
//!     verbose: false,
//! };
//! ```

use super::format::OutputFormat;
use crate::config::AppConfig;
use crate::llm::prompt::{ArticleLength, ArticleOptions, ArticleType, WritingStyle};

/// Generate command options
///
/// # Field description
/// - `article`: keywords and article settings rendered into the prompt
/// - `provider_override`: `--provider`, otherwise `llm.default_provider`
/// - `model_override`: `--model`, otherwise the provider's configured model
/// - `proxy_override`: `--proxy`, otherwise `[proxy]` when enabled
/// - `no_history`: skip saving the result
/// - `format`: output format
#[derive(Debug, Clone)]
pub struct GenerateOptions<'a> {
    pub article: ArticleOptions,
    pub provider_override: Option<&'a str>,
    pub model_override: Option<&'a str>,
    pub proxy_override: Option<&'a str>,
    pub no_history: bool,
    pub format: OutputFormat,
    pub verbose: bool,
}

/// Raw `generate` arguments, as parsed by clap.
#[derive(Debug, Clone, Copy)]
pub struct GenerateArgs<'a> {
    pub keywords: &'a [String],
    pub length: ArticleLength,
    pub style: WritingStyle,
    pub article_type: ArticleType,
    pub language: &'a str,
    pub provider: Option<&'a str>,
    pub model: Option<&'a str>,
    pub proxy: Option<&'a str>,
    pub no_history: bool,
    pub format: &'a str,
    pub json: bool,
}

impl<'a> GenerateOptions<'a> {
    /// Constructed from CLI parameters
    ///
    /// Multiple keyword arguments are joined with `", "`.
    pub fn from_cli(args: GenerateArgs<'a>, verbose: bool) -> Self {
        let article = ArticleOptions {
            keywords: args.keywords.join(", "),
            length: args.length,
            style: args.style,
            article_type: args.article_type,
            language: args.language.to_string(),
        };

        Self {
            article,
            provider_override: args.provider,
            model_override: args.model,
            proxy_override: args.proxy,
            no_history: args.no_history,
            format: OutputFormat::from_cli(args.format, args.json),
            verbose,
        }
    }

    /// Provider name to use
    pub fn provider_name<'c>(&self, config: &'c AppConfig) -> &'c str
    where
        'a: 'c,
    {
        self.provider_override
            .unwrap_or(config.llm.default_provider.as_str())
    }

    /// Get valid colored settings
    ///
    /// JSON/Markdown output always disables colors.
    pub fn effective_colored(&self, config: &AppConfig) -> bool {
        self.format.effective_colored(config.ui.colored)
    }
}
