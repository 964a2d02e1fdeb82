//! Article prompt rendering
//!
//! The template asks the model for a single JSON object matching the
//! article schema (5 scored titles, markdown content, 6 tags).

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Built-in article prompt. Placeholders are `{{name}}`.
const ARTICLE_PROMPT_TEMPLATE: &str = r#"# AI 文章生成

你是一位专业的内容创作者，需要根据用户提供的关键词和要求生成高质量的文章。

## 文章要求

- **关键词**: {{keywords}}
- **文章长度**: {{articleLength}}
- **写作风格**: {{writingStyle}}
- **文章类型**: {{articleType}}
- **输出语言**: {{language}} - **请使用此语言撰写所有内容（包括标题、正文和标签）**

## 输出格式要求

请严格按照以下 JSON 格式输出，不要包含任何其他文字说明：

```json
{
  "titles": [
    { "title": "标题1", "score": 9 },
    { "title": "标题2", "score": 8 },
    { "title": "标题3", "score": 8 },
    { "title": "标题4", "score": 7 },
    { "title": "标题5", "score": 7 }
  ],
  "content": "文章正文内容，使用 Markdown 格式...",
  "tags": ["标签1", "标签2", "标签3", "标签4", "标签5", "标签6"]
}
```

## 详细说明

### 1. titles（5个标题）
- 提供5个不同的标题选项，每个包含 `title` 和 `score`
- 评分使用10分制：9-10分非常吸引人且SEO友好，7-8分较好，5-6分一般
- 标题应包含核心关键词，长度适中（建议15-30个字符），符合文章类型特点

### 2. content（文章内容）
根据文章长度要求生成相应字数的内容：
- **短文(short)**: 300-500字
- **中篇(medium)**: 800-1500字
- **长文(long)**: 2000字以上

根据写作风格调整语言特点：
- **正式专业(professional)**: 使用专业术语，逻辑严谨，语言正式
- **轻松随意(casual)**: 语言轻松，可适当使用口语化表达，贴近读者
- **学术严谨(report)**: 引用数据，注重论证，使用学术语言
- **创意文学(creative)**: 富有想象力，使用修辞手法，文笔优美
- **营销推广(marketing)**: 突出卖点，使用号召性语言，引导行动

根据文章类型组织结构：
- **博客文章(blog)**: 引言 → 主体内容（2-3个要点）→ 总结
- **新闻稿(news)**: 导语 → 详细报道 → 背景信息
- **产品描述(product)**: 产品介绍 → 特点优势 → 使用场景 → 购买建议
- **SEO文章(seo)**: 关键词布局合理，包含小标题，段落分明
- **教程指南(tutorial)**: 步骤清晰，使用编号列表，包含注意事项

内容使用 Markdown 格式，结构清晰，自然融入关键词，避免堆砌。

### 3. tags（6个标签）
- 提供6个相关标签，按与内容的相关度从高到低排序
- 第1-2个为核心关键词，第3-4个为次要相关词，第5-6个为扩展相关词

## 注意事项

1. **必须返回有效的 JSON 格式**
2. **不要在 JSON 前后添加任何说明文字**
3. **content 字段中的换行符使用 `\n`**，不要使用实际换行
4. **确保所有字符串正确转义**，特别是引号、换行符等特殊字符
5. **严格遵守字数要求**

现在，请根据以上要求生成文章。"#;

/// Target article length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArticleLength {
    Short,
    #[default]
    Medium,
    Long,
}

impl ArticleLength {
    fn describe(&self) -> &'static str {
        match self {
            ArticleLength::Short => "短文(300-500字)",
            ArticleLength::Medium => "中篇(800-1500字)",
            ArticleLength::Long => "长文(2000字以上)",
        }
    }
}

/// Writing style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WritingStyle {
    #[default]
    Professional,
    Casual,
    Report,
    Creative,
    Marketing,
}

impl WritingStyle {
    fn describe(&self) -> &'static str {
        match self {
            WritingStyle::Professional => "正式专业",
            WritingStyle::Casual => "轻松随意",
            WritingStyle::Report => "学术严谨",
            WritingStyle::Creative => "创意文学",
            WritingStyle::Marketing => "营销推广",
        }
    }
}

/// Article type, drives the expected structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArticleType {
    #[default]
    Blog,
    News,
    Product,
    Seo,
    Tutorial,
}

impl ArticleType {
    fn describe(&self) -> &'static str {
        match self {
            ArticleType::Blog => "博客文章",
            ArticleType::News => "新闻稿",
            ArticleType::Product => "产品描述",
            ArticleType::Seo => "SEO文章",
            ArticleType::Tutorial => "教程指南",
        }
    }
}

macro_rules! display_as_value {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.to_possible_value() {
                    Some(value) => f.write_str(value.get_name()),
                    None => Ok(()),
                }
            }
        })*
    };
}

display_as_value!(ArticleLength, WritingStyle, ArticleType);

/// Output language display name for a language code; unknown codes pass through.
pub fn language_name(code: &str) -> &str {
    match code {
        "zh" | "zh-CN" => "简体中文",
        "zh-TW" => "繁體中文",
        "en" => "English",
        "ja" => "日本語",
        "ko" => "한국어",
        "fr" => "Français",
        "de" => "Deutsch",
        "es" => "Español",
        "ru" => "Русский",
        "pt" => "Português",
        other => other,
    }
}

/// User-facing article options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleOptions {
    pub keywords: String,
    #[serde(default)]
    pub length: ArticleLength,
    #[serde(default)]
    pub style: WritingStyle,
    #[serde(default)]
    pub article_type: ArticleType,
    /// Language code, e.g. `zh-CN`, `en`
    pub language: String,
}

impl ArticleOptions {
    pub fn new(keywords: impl Into<String>) -> Self {
        Self {
            keywords: keywords.into(),
            length: ArticleLength::default(),
            style: WritingStyle::default(),
            article_type: ArticleType::default(),
            language: "zh-CN".to_string(),
        }
    }
}

/// Renders the article prompt.
///
/// `custom_template` replaces the built-in template; it may use the same
/// `{{keywords}}`, `{{articleLength}}`, `{{writingStyle}}`, `{{articleType}}`
/// and `{{language}}` placeholders.
pub fn build_article_prompt(options: &ArticleOptions, custom_template: Option<&str>) -> String {
    let template = custom_template.unwrap_or(ARTICLE_PROMPT_TEMPLATE);

    template
        .replace("{{keywords}}", options.keywords.trim())
        .replace("{{articleLength}}", options.length.describe())
        .replace("{{writingStyle}}", options.style.describe())
        .replace("{{articleType}}", options.article_type.describe())
        .replace("{{language}}", language_name(&options.language))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_prompt_fills_all_placeholders() {
        let options = ArticleOptions {
            keywords: " Rust, 所有权 ".to_string(),
            length: ArticleLength::Long,
            style: WritingStyle::Casual,
            article_type: ArticleType::Tutorial,
            language: "en".to_string(),
        };
        let prompt = build_article_prompt(&options, None);

        assert!(prompt.contains("**关键词**: Rust, 所有权\n"));
        assert!(prompt.contains("**文章长度**: 长文(2000字以上)"));
        assert!(prompt.contains("**写作风格**: 轻松随意"));
        assert!(prompt.contains("**文章类型**: 教程指南"));
        assert!(prompt.contains("**输出语言**: English"));
        assert!(!prompt.contains("{{"));
    }

    #[test]
    fn test_prompt_describes_article_schema() {
        let prompt = build_article_prompt(&ArticleOptions::new("rust"), None);
        assert!(prompt.contains("\"titles\""));
        assert!(prompt.contains("\"content\""));
        assert!(prompt.contains("\"tags\""));
    }

    #[test]
    fn test_custom_template() {
        let options = ArticleOptions::new("tokio");
        let prompt = build_article_prompt(&options, Some("Write about {{keywords}} in {{language}}"));
        assert_eq!(prompt, "Write about tokio in 简体中文");
    }

    #[test]
    fn test_unknown_language_passes_through() {
        assert_eq!(language_name("it"), "it");
        assert_eq!(language_name("ja"), "日本語");
    }

    #[test]
    fn test_option_display_matches_cli_values() {
        assert_eq!(ArticleLength::Short.to_string(), "short");
        assert_eq!(WritingStyle::Marketing.to_string(), "marketing");
        assert_eq!(ArticleType::Seo.to_string(), "seo");
    }

    #[test]
    fn test_options_serde_defaults() {
        let options: ArticleOptions =
            serde_json::from_str(r#"{"keywords":"k","language":"en"}"#).unwrap();
        assert_eq!(options.length, ArticleLength::Medium);
        assert_eq!(options.style, WritingStyle::Professional);
        assert_eq!(options.article_type, ArticleType::Blog);
    }
}
