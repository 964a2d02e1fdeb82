//! Local article history
//!
//! A single JSON file (`history.json` in the platform data dir), newest
//! item first, capped at `[history] max_items`.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{self, HistoryConfig};
use crate::error::{ForgeError, Result};
use crate::llm::GeneratedArticle;
use crate::llm::prompt::ArticleOptions;

const HISTORY_FILE: &str = "history.json";

/// One generated article with the options it was generated from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub options: ArticleOptions,
    pub provider: String,
    /// Index into `article.titles` chosen by the user
    #[serde(default)]
    pub selected_title: Option<usize>,
    pub article: GeneratedArticle,
}

impl HistoryItem {
    /// Selected title, or the first one.
    pub fn title(&self) -> &str {
        &self.article.title_or_first(self.selected_title).title
    }
}

/// JSON file backed history store.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: PathBuf,
    max_items: usize,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>, max_items: usize) -> Self {
        Self {
            path: path.into(),
            max_items: max_items.max(1),
        }
    }

    /// Store in the platform data directory.
    pub fn open_default(config: &HistoryConfig) -> Result<Self> {
        let dir = config::get_data_dir().ok_or_else(|| {
            ForgeError::History("Cannot determine the data directory".to_string())
        })?;
        Ok(Self::new(dir.join(HISTORY_FILE), config.max_items))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<HistoryItem>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items: Vec<HistoryItem> = serde_json::from_str(&content)
            .map_err(|e| self.corrupted(e.to_string()))?;

        // 文件可被手动编辑，反序列化绕过了文章校验
        for item in &items {
            item.article
                .validate()
                .map_err(|reason| self.corrupted(format!("item '{}': {}", item.id, reason)))?;
        }
        Ok(items)
    }

    fn corrupted(&self, detail: String) -> ForgeError {
        ForgeError::History(format!("{} is corrupted: {}", self.path.display(), detail))
    }

    /// 先写临时文件再 rename，避免中途失败留下半截 JSON
    fn save(&self, items: &[HistoryItem]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string_pretty(items)?)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Records a new article; returns the stored item.
    pub fn add(
        &self,
        options: ArticleOptions,
        provider: &str,
        article: GeneratedArticle,
    ) -> Result<HistoryItem> {
        let mut items = self.load()?;

        let timestamp = Utc::now();
        let mut id = timestamp.timestamp_millis();
        while items.iter().any(|item| item.id == id.to_string()) {
            id += 1;
        }

        let item = HistoryItem {
            id: id.to_string(),
            timestamp,
            options,
            provider: provider.to_string(),
            selected_title: None,
            article,
        };

        items.insert(0, item.clone());
        items.truncate(self.max_items);
        self.save(&items)?;

        tracing::debug!("History item {} saved to {}", item.id, self.path.display());
        Ok(item)
    }

    /// All items, newest first.
    pub fn list(&self) -> Result<Vec<HistoryItem>> {
        self.load()
    }

    pub fn get(&self, id: &str) -> Result<HistoryItem> {
        self.load()?
            .into_iter()
            .find(|item| item.id == id)
            .ok_or_else(|| not_found(id))
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        let mut items = self.load()?;
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(not_found(id));
        }
        self.save(&items)
    }

    /// Removes everything; returns how many items were removed.
    pub fn clear(&self) -> Result<usize> {
        let count = self.load()?.len();
        self.save(&[])?;
        Ok(count)
    }

    /// Remembers which title (0-based) the user picked.
    pub fn select_title(&self, id: &str, index: usize) -> Result<HistoryItem> {
        let mut items = self.load()?;
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or_else(|| not_found(id))?;

        if index >= item.article.titles.len() {
            return Err(ForgeError::InvalidInput(format!(
                "title index {} out of range (1-{})",
                index + 1,
                item.article.titles.len()
            )));
        }
        item.selected_title = Some(index);
        let updated = item.clone();

        self.save(&items)?;
        Ok(updated)
    }
}

fn not_found(id: &str) -> ForgeError {
    ForgeError::History(format!("No history item with id '{}'", id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::TitleOption;
    use pretty_assertions::assert_eq;

    fn article(title: &str) -> GeneratedArticle {
        GeneratedArticle {
            titles: (0..5)
                .map(|i| TitleOption {
                    title: format!("{} {}", title, i),
                    score: 9.0 - i as f64,
                })
                .collect(),
            content: "# Body".to_string(),
            tags: (0..6).map(|i| format!("tag{}", i)).collect(),
        }
    }

    fn store(dir: &tempfile::TempDir, max_items: usize) -> HistoryStore {
        HistoryStore::new(dir.path().join("nested").join(HISTORY_FILE), max_items)
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(store(&dir, 10).list().unwrap().is_empty());
    }

    #[test]
    fn test_add_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 10);

        let saved = store
            .add(ArticleOptions::new("rust"), "qwen", article("Rust"))
            .unwrap();
        let loaded = store.get(&saved.id).unwrap();

        assert_eq!(loaded, saved);
        assert_eq!(loaded.title(), "Rust 0");
        assert!(store.path().exists());
    }

    #[test]
    fn test_newest_first_and_capped() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 2);

        let first = store.add(ArticleOptions::new("a"), "qwen", article("A")).unwrap();
        let second = store.add(ArticleOptions::new("b"), "qwen", article("B")).unwrap();
        let third = store.add(ArticleOptions::new("c"), "qwen", article("C")).unwrap();

        let ids: Vec<String> = store.list().unwrap().into_iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![third.id, second.id]);
        assert!(store.get(&first.id).is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 10);
        let a = store.add(ArticleOptions::new("a"), "qwen", article("A")).unwrap();
        let b = store.add(ArticleOptions::new("b"), "qwen", article("B")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_delete_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 10);
        let a = store.add(ArticleOptions::new("a"), "qwen", article("A")).unwrap();
        store.add(ArticleOptions::new("b"), "gemini", article("B")).unwrap();

        store.delete(&a.id).unwrap();
        assert!(matches!(store.delete(&a.id), Err(ForgeError::History(_))));
        assert_eq!(store.list().unwrap().len(), 1);

        assert_eq!(store.clear().unwrap(), 1);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_select_title() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 10);
        let item = store.add(ArticleOptions::new("a"), "qwen", article("T")).unwrap();

        let updated = store.select_title(&item.id, 3).unwrap();
        assert_eq!(updated.selected_title, Some(3));
        assert_eq!(store.get(&item.id).unwrap().title(), "T 3");

        assert!(matches!(
            store.select_title(&item.id, 5),
            Err(ForgeError::InvalidInput(_))
        ));
        assert!(matches!(
            store.select_title("missing", 0),
            Err(ForgeError::History(_))
        ));
    }

    #[test]
    fn test_corrupted_file_is_history_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 10);
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();

        assert!(matches!(store.list(), Err(ForgeError::History(msg)) if msg.contains("corrupted")));
    }

    #[test]
    fn test_hand_edited_item_without_titles_is_history_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(&dir, 10);
        let item = store.add(ArticleOptions::new("a"), "qwen", article("T")).unwrap();

        let mut raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        raw[0]["article"]["titles"] = serde_json::json!([]);
        fs::write(store.path(), raw.to_string()).unwrap();

        for result in [store.list().map(|_| ()), store.get(&item.id).map(|_| ())] {
            assert!(matches!(
                result,
                Err(ForgeError::History(msg)) if msg.contains("titles length != 5 (got 0)")
            ));
        }
    }
}
