use std::path::Path;

use super::format::OutputFormat;
use crate::config::AppConfig;
use crate::error::{ForgeError, Result};
use crate::export;
use crate::history::HistoryStore;
use crate::ui;

/// 执行 export 命令（公开接口）
pub fn run(
    id: &str,
    format: &str,
    title: Option<usize>,
    output: Option<&Path>,
    config: &AppConfig,
) -> Result<()> {
    let store = HistoryStore::open_default(&config.history)?;
    let format: OutputFormat = format.parse().unwrap_or_default();
    let rendered = render_item(&store, id, format, title)?;

    match output {
        Some(path) => {
            // 目标是目录时按 id 命名
            let path = if path.is_dir() {
                path.join(format!("{}.{}", id, format.extension()))
            } else {
                path.to_path_buf()
            };
            std::fs::write(&path, &rendered)?;
            ui::success(&format!("Exported {} to {}", id, path.display()), config.ui.colored);
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

/// Renders a history item; `title` is 1-based and overrides the saved selection.
pub fn render_item(
    store: &HistoryStore,
    id: &str,
    format: OutputFormat,
    title: Option<usize>,
) -> Result<String> {
    let item = store.get(id)?;

    let index = match title {
        Some(0) => {
            return Err(ForgeError::InvalidInput(
                "title index starts at 1".to_string(),
            ));
        }
        Some(n) if n > item.article.titles.len() => {
            return Err(ForgeError::InvalidInput(format!(
                "title index {} out of range (1-{})",
                n,
                item.article.titles.len()
            )));
        }
        Some(n) => Some(n - 1),
        None => item.selected_title,
    };

    Ok(export::render(&item.article, index, format)?)
}
