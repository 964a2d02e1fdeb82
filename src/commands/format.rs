use std::str::FromStr;

/// Output format enum
///
/// Unified processing of `--format` and `--json`; shared by terminal output
/// and article export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable terminal output / plain text export.
    #[default]
    Text,
    /// Machine-readable JSON.
    Json,
    /// Markdown (`# title`, `#tags`, body).
    Markdown,
    /// HTML fragment rendered from the markdown body.
    Html,
}

impl FromStr for OutputFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "markdown" | "md" => Self::Markdown,
            "html" | "htm" => Self::Html,
            _ => Self::Text,
        })
    }
}

impl OutputFormat {
    /// Parse output format from CLI parameters
    ///
    /// `--json` takes precedence over `--format`
    pub fn from_cli(format: &str, json: bool) -> Self {
        if json {
            Self::Json
        } else {
            format.parse().unwrap_or_default()
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }

    /// JSON/Markdown/HTML go to stdout untouched: no spinner, no step lines, no color.
    pub fn is_machine_readable(&self) -> bool {
        matches!(self, Self::Json | Self::Markdown | Self::Html)
    }

    /// Get the effective colored setting (color disabled in machine-readable format)
    pub fn effective_colored(&self, config_colored: bool) -> bool {
        !self.is_machine_readable() && config_colored
    }

    /// File extension used when exporting into a directory.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Text => "txt",
            Self::Json => "json",
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}
