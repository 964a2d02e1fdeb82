use colored::Colorize;
use serde::Serialize;

use super::json;
use crate::cli::HistoryAction;
use crate::config::AppConfig;
use crate::error::{ForgeError, Result};
use crate::history::{HistoryItem, HistoryStore};
use crate::ui;

/// `history list --json` 的条目摘要
#[derive(Debug, Serialize)]
struct HistorySummary<'a> {
    id: &'a str,
    timestamp: String,
    provider: &'a str,
    keywords: &'a str,
    title: &'a str,
}

impl<'a> From<&'a HistoryItem> for HistorySummary<'a> {
    fn from(item: &'a HistoryItem) -> Self {
        Self {
            id: &item.id,
            timestamp: item.timestamp.to_rfc3339(),
            provider: &item.provider,
            keywords: &item.options.keywords,
            title: item.title(),
        }
    }
}

/// 执行 history 命令（公开接口）
pub fn run(action: Option<HistoryAction>, json_output: bool, config: &AppConfig) -> Result<()> {
    let store = HistoryStore::open_default(&config.history)?;
    let colored = config.ui.colored && !json_output;

    let result = run_internal(action.unwrap_or(HistoryAction::List), json_output, colored, &store);
    if let Err(e) = &result
        && json_output
    {
        json::output_json_error(e)?;
    }
    result
}

/// 内部实现，store 由调用方注入（用于测试）
pub fn run_internal(
    action: HistoryAction,
    json_output: bool,
    colored: bool,
    store: &HistoryStore,
) -> Result<()> {
    match action {
        HistoryAction::List => {
            let items = store.list()?;
            if json_output {
                let summaries: Vec<HistorySummary> = items.iter().map(Into::into).collect();
                return json::output_json(summaries);
            }
            if items.is_empty() {
                println!("{}", ui::info("No articles in history yet", colored));
                return Ok(());
            }
            for item in &items {
                println!("{}", format_list_line(item, colored));
            }
        }
        HistoryAction::Show { id } => {
            let item = store.get(&id)?;
            if json_output {
                return json::output_json(&item);
            }
            print_header(&item, colored);
            println!();
            ui::print_article(&item.article, item.selected_title, colored);
        }
        HistoryAction::Delete { id } => {
            store.delete(&id)?;
            if json_output {
                return json::output_json(serde_json::json!({ "deleted": id }));
            }
            ui::success(&format!("Deleted {}", id), colored);
        }
        HistoryAction::Clear => {
            let count = store.clear()?;
            if json_output {
                return json::output_json(serde_json::json!({ "cleared": count }));
            }
            ui::success(&format!("Removed {} article(s) from history", count), colored);
        }
        HistoryAction::Select { id, index } => {
            // CLI 使用 1-based 编号
            let zero_based = index.checked_sub(1).ok_or_else(|| {
                ForgeError::InvalidInput("title index starts at 1".to_string())
            })?;
            let item = store.select_title(&id, zero_based)?;
            if json_output {
                return json::output_json(&item);
            }
            ui::success(&format!("Selected title: {}", item.title()), colored);
        }
    }
    Ok(())
}

fn format_list_line(item: &HistoryItem, colored: bool) -> String {
    let when = item
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%Y-%m-%d %H:%M");
    if colored {
        format!(
            "{}  {}  {:<8} {}  {}",
            item.id.yellow(),
            when.to_string().bright_black(),
            item.provider,
            item.title().bold(),
            format!("({})", item.options.keywords).bright_black()
        )
    } else {
        format!(
            "{}  {}  {:<8} {}  ({})",
            item.id, when, item.provider, item.title(), item.options.keywords
        )
    }
}

fn print_header(item: &HistoryItem, colored: bool) {
    let options = &item.options;
    let line = format!(
        "{} | {} | {} | {} | {} | {} | {}",
        item.id,
        item.timestamp.to_rfc3339(),
        item.provider,
        options.length,
        options.style,
        options.article_type,
        options.language
    );
    if colored {
        println!("{}", line.bright_black());
    } else {
        println!("{}", line);
    }
    println!("Keywords: {}", options.keywords);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::prompt::ArticleOptions;
    use crate::llm::{GeneratedArticle, TitleOption};

    fn seeded_store(dir: &tempfile::TempDir) -> (HistoryStore, String) {
        let store = HistoryStore::new(dir.path().join("history.json"), 10);
        let article = GeneratedArticle {
            titles: (0..5)
                .map(|i| TitleOption {
                    title: format!("Title {}", i + 1),
                    score: 8.0,
                })
                .collect(),
            content: "body".to_string(),
            tags: (0..6).map(|i| format!("t{}", i)).collect(),
        };
        let item = store.add(ArticleOptions::new("rust"), "qwen", article).unwrap();
        (store, item.id)
    }

    #[test]
    fn test_select_is_one_based() {
        let dir = tempfile::tempdir().unwrap();
        let (store, id) = seeded_store(&dir);

        run_internal(
            HistoryAction::Select {
                id: id.clone(),
                index: 2,
            },
            false,
            false,
            &store,
        )
        .unwrap();
        assert_eq!(store.get(&id).unwrap().title(), "Title 2");

        let err = run_internal(HistoryAction::Select { id, index: 0 }, false, false, &store)
            .unwrap_err();
        assert!(matches!(err, ForgeError::InvalidInput(_)));
    }

    #[test]
    fn test_delete_missing_item() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = seeded_store(&dir);
        let err = run_internal(
            HistoryAction::Delete {
                id: "nope".to_string(),
            },
            false,
            false,
            &store,
        )
        .unwrap_err();
        assert!(matches!(err, ForgeError::History(_)));
    }

    #[test]
    fn test_list_line_plain() {
        let dir = tempfile::tempdir().unwrap();
        let (store, id) = seeded_store(&dir);
        let item = store.get(&id).unwrap();
        let line = format_list_line(&item, false);
        assert!(line.starts_with(&id));
        assert!(line.contains("Title 1"));
        assert!(line.ends_with("(rust)"));
    }

    #[test]
    fn test_clear_and_list_json() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = seeded_store(&dir);
        run_internal(HistoryAction::Clear, true, false, &store).unwrap();
        run_internal(HistoryAction::List, true, false, &store).unwrap();
        assert!(store.list().unwrap().is_empty());
    }
}
