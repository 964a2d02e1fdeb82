use std::path::PathBuf;

use clap::{Parser, Subcommand, builder::styling};

use crate::llm::prompt::{ArticleLength, ArticleType, WritingStyle};

const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::Green.on_default().bold())
    .usage(styling::AnsiColor::Green.on_default().bold())
    .literal(styling::AnsiColor::Cyan.on_default().bold())
    .placeholder(styling::AnsiColor::Cyan.on_default());

#[derive(Parser)]
#[command(name = "article-forge")]
#[command(author, version, long_about = None)]
#[command(about = "Generate articles (5 scored titles, 6 tags, markdown body) with Qwen, Gemini or ChatGPT")]
#[command(styles = STYLES)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an article from keywords
    Generate {
        /// Keywords describing the article topic
        #[arg(required = true, num_args = 1..)]
        keywords: Vec<String>,

        /// Target length
        #[arg(short, long, value_enum, default_value_t)]
        length: ArticleLength,

        /// Writing style
        #[arg(short, long, value_enum, default_value_t)]
        style: WritingStyle,

        /// Article type
        #[arg(short = 't', long = "type", value_enum, default_value_t)]
        article_type: ArticleType,

        /// Output language code (zh-CN, en, ja, ...)
        #[arg(long, default_value = "zh-CN")]
        language: String,

        /// Provider name (qwen, gemini, chatgpt or a configured custom name)
        #[arg(short, long)]
        provider: Option<String>,

        /// Override the provider's model
        #[arg(short, long)]
        model: Option<String>,

        /// Proxy URL for this call (overrides [proxy] in the config)
        #[arg(long)]
        proxy: Option<String>,

        /// Do not save the article to history
        #[arg(long)]
        no_history: bool,

        /// Output format: text | json | markdown | html
        #[arg(short, long, default_value = "text")]
        format: String,

        /// Shortcut for --format json
        #[arg(long)]
        json: bool,
    },

    /// Browse and manage generated articles
    History {
        #[command(subcommand)]
        action: Option<HistoryAction>,

        /// Shortcut for JSON output
        #[arg(long, global = true)]
        json: bool,
    },

    /// Export an article from history
    Export {
        /// History item id
        id: String,

        /// Output format: text | markdown | json | html
        #[arg(short, long, default_value = "markdown")]
        format: String,

        /// Title to use (1-5); defaults to the selected or first title
        #[arg(long)]
        title: Option<usize>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum HistoryAction {
    /// List saved articles (newest first)
    List,

    /// Show one article
    Show {
        /// History item id
        id: String,
    },

    /// Delete one article
    Delete {
        /// History item id
        id: String,
    },

    /// Delete all articles
    Clear,

    /// Select the title to use for an article
    Select {
        /// History item id
        id: String,

        /// Title number (1-5)
        index: usize,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Print the effective configuration (API keys masked)
    Show,

    /// Print the configuration file path
    Path,

    /// Validate configuration
    Validate,
}
