//! Article schema and response validation.
//!
//! Models return the article as a JSON object, often wrapped in prose or a
//! markdown fence. [`parse_article`] is the single entry point that extracts the
//! object and checks it against the fixed schema:
//!
//! ```json
//! {
//!   "titles": [{"title": "...", "score": 9}, ... exactly 5 ...],
//!   "content": "markdown body",
//!   "tags": ["...", ... exactly 6 ...]
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Number of title candidates every article must carry.
pub const TITLE_COUNT: usize = 5;

/// Number of tags every article must carry.
pub const TAG_COUNT: usize = 6;

/// Inclusive upper bound of a title score.
pub const MAX_TITLE_SCORE: f64 = 10.0;

/// Error preview maximum length
const PREVIEW_LENGTH: usize = 500;

/// One scored title candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleOption {
    pub title: String,
    pub score: f64,
}

/// A validated article.
///
/// Only constructed by [`parse_article`] (or read back from history and
/// re-checked with [`GeneratedArticle::validate`]), so the counts and bounds below always hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedArticle {
    /// Exactly [`TITLE_COUNT`] entries, in model order.
    pub titles: Vec<TitleOption>,
    /// Markdown body.
    pub content: String,
    /// Exactly [`TAG_COUNT`] entries, most relevant first.
    pub tags: Vec<String>,
}

impl GeneratedArticle {
    /// Title at `index`, falling back to the first one.
    pub fn title_or_first(&self, index: Option<usize>) -> &TitleOption {
        index
            .and_then(|i| self.titles.get(i))
            .unwrap_or(&self.titles[0])
    }

    /// Re-checks the schema for an article that did not come from
    /// [`parse_article`], e.g. one read back from a hand-edited file.
    pub fn validate(&self) -> Result<(), ArticleRejection> {
        let value =
            serde_json::to_value(self).map_err(|e| ArticleRejection::InvalidJson(e.to_string()))?;
        let object = value.as_object().ok_or(ArticleRejection::NotAnObject)?;
        validate_titles(object)?;
        validate_content(object)?;
        validate_tags(object)?;
        Ok(())
    }

    /// Index of the highest scored title (first one wins on ties).
    pub fn best_title_index(&self) -> usize {
        self.titles
            .iter()
            .enumerate()
            .fold(0, |best, (i, t)| {
                if t.score > self.titles[best].score {
                    i
                } else {
                    best
                }
            })
    }
}

/// Why a response was rejected.
///
/// Every structural check has its own variant so callers can show an
/// actionable message instead of a generic failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArticleRejection {
    #[error("no JSON object found")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("top-level JSON value is not an object")]
    NotAnObject,

    #[error("titles missing")]
    TitlesMissing,

    #[error("titles is not an array")]
    TitlesNotArray,

    #[error("titles length != 5 (got {0})")]
    TitlesLength(usize),

    #[error("title #{index} has an empty or non-string title")]
    TitleText { index: usize },

    #[error("title #{index} has a non-numeric score")]
    TitleScoreType { index: usize },

    #[error("title #{index} score {score} out of range [0, 10]")]
    TitleScoreRange { index: usize, score: f64 },

    #[error("content missing")]
    ContentMissing,

    #[error("content is empty or not a string")]
    ContentInvalid,

    #[error("tags missing")]
    TagsMissing,

    #[error("tags is not an array")]
    TagsNotArray,

    #[error("tags length != 6 (got {0})")]
    TagsLength(usize),

    #[error("tag #{index} is empty or not a string")]
    TagInvalid { index: usize },
}

/// Parses and validates accumulated model output.
///
/// Pure and deterministic: the same text always yields the same outcome.
///
/// # Example
/// ```
/// use article_forge::llm::article::{parse_article, ArticleRejection};
///
/// assert_eq!(
///     parse_article("no json here"),
///     Err(ArticleRejection::NoJsonObject)
/// );
/// ```
pub fn parse_article(text: &str) -> Result<GeneratedArticle, ArticleRejection> {
    let span = extract_json_span(text).ok_or(ArticleRejection::NoJsonObject)?;
    let value: Value =
        serde_json::from_str(span).map_err(|e| ArticleRejection::InvalidJson(e.to_string()))?;
    let object = value.as_object().ok_or(ArticleRejection::NotAnObject)?;

    let titles = validate_titles(object)?;
    let content = validate_content(object)?;
    let tags = validate_tags(object)?;

    Ok(GeneratedArticle {
        titles,
        content,
        tags,
    })
}

/// Greedy outer-brace match: first `{` through last `}`.
fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn validate_titles(object: &Map<String, Value>) -> Result<Vec<TitleOption>, ArticleRejection> {
    let titles = object
        .get("titles")
        .filter(|v| !v.is_null())
        .ok_or(ArticleRejection::TitlesMissing)?
        .as_array()
        .ok_or(ArticleRejection::TitlesNotArray)?;

    if titles.len() != TITLE_COUNT {
        return Err(ArticleRejection::TitlesLength(titles.len()));
    }

    titles
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let title = entry
                .get("title")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .ok_or(ArticleRejection::TitleText { index })?;
            let score = entry
                .get("score")
                .and_then(Value::as_f64)
                .ok_or(ArticleRejection::TitleScoreType { index })?;
            if !(0.0..=MAX_TITLE_SCORE).contains(&score) {
                return Err(ArticleRejection::TitleScoreRange { index, score });
            }
            Ok(TitleOption {
                title: title.to_string(),
                score,
            })
        })
        .collect()
}

fn validate_content(object: &Map<String, Value>) -> Result<String, ArticleRejection> {
    let content = object
        .get("content")
        .filter(|v| !v.is_null())
        .ok_or(ArticleRejection::ContentMissing)?;
    content
        .as_str()
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .ok_or(ArticleRejection::ContentInvalid)
}

fn validate_tags(object: &Map<String, Value>) -> Result<Vec<String>, ArticleRejection> {
    let tags = object
        .get("tags")
        .filter(|v| !v.is_null())
        .ok_or(ArticleRejection::TagsMissing)?
        .as_array()
        .ok_or(ArticleRejection::TagsNotArray)?;

    if tags.len() != TAG_COUNT {
        return Err(ArticleRejection::TagsLength(tags.len()));
    }

    tags.iter()
        .enumerate()
        .map(|(index, tag)| {
            tag.as_str()
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .ok_or(ArticleRejection::TagInvalid { index })
        })
        .collect()
}

/// Truncate string for error preview (safe handling of multibyte characters)
pub fn truncate_for_preview(s: &str) -> String {
    if s.len() <= PREVIEW_LENGTH {
        return s.to_string();
    }
    // Find the last char boundary that does not exceed max_len
    let boundary = s
        .char_indices()
        .map(|(i, _)| i)
        .take_while(|&i| i <= PREVIEW_LENGTH)
        .last()
        .unwrap_or(0);
    format!("{}...", &s[..boundary])
}
