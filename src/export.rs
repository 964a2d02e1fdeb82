//! Article export renderings
//!
//! All formats lead with the chosen title, then the tags, then the body.

use pulldown_cmark::{Event, Options, Parser, Tag, html};
use serde::Serialize;

use crate::commands::format::OutputFormat;
use crate::llm::GeneratedArticle;

/// Markdown: `# title`, `#tag` line, body.
pub fn to_markdown(article: &GeneratedArticle, title_index: Option<usize>) -> String {
    let title = &article.title_or_first(title_index).title;
    let mut out = String::new();

    if !title.is_empty() {
        out.push_str(&format!("# {}\n\n", title));
    }
    if !article.tags.is_empty() {
        out.push_str(&hashtags(&article.tags));
        out.push_str("\n\n");
    }
    out.push_str(&article.content);
    out
}

/// Plain text: title line, `#tag` line, body with markdown markup removed.
pub fn to_text(article: &GeneratedArticle, title_index: Option<usize>) -> String {
    let title = &article.title_or_first(title_index).title;
    let body = strip_markdown(&article.content);
    // 纯标记内容（例如只有分隔线）去掉后为空，保留原文
    let body = if body.is_empty() {
        article.content.trim()
    } else {
        body.as_str()
    };
    format!("{}\n\n{}\n\n{}", title, hashtags(&article.tags), body)
}

/// HTML fragment: `<h1>` title, `<p>` tag line, rendered body.
pub fn to_html(article: &GeneratedArticle, title_index: Option<usize>) -> String {
    let title = &article.title_or_first(title_index).title;
    let mut out = format!(
        "<h1>{}</h1>\n<p>{}</p>\n",
        escape_html(title),
        escape_html(&hashtags(&article.tags))
    );
    html::push_html(&mut out, Parser::new_ext(&article.content, markdown_options()));
    out
}

/// Markdown to plain text: markup dropped, block structure kept as line breaks.
pub fn strip_markdown(markdown: &str) -> String {
    let mut out = String::new();
    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak => out.push('\n'),
            Event::End(Tag::TableCell) => out.push('\t'),
            Event::End(Tag::Item | Tag::TableHead | Tag::TableRow) => end_block(&mut out, 1),
            Event::End(
                Tag::Paragraph
                | Tag::Heading(..)
                | Tag::BlockQuote
                | Tag::CodeBlock(_)
                | Tag::List(_)
                | Tag::Table(_),
            )
            | Event::Rule => end_block(&mut out, 2),
            _ => {}
        }
    }
    out.trim().to_string()
}

/// GFM 表格、删除线、任务列表
fn markdown_options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Ends the current block with exactly `newlines` line breaks.
fn end_block(out: &mut String, newlines: usize) {
    let kept = out.trim_end_matches(['\n', '\t']).len();
    out.truncate(kept);
    if !out.is_empty() {
        out.push_str(&"\n".repeat(newlines));
    }
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Serialize)]
struct ExportJson<'a> {
    title: &'a str,
    tags: &'a [String],
    content: &'a str,
    titles: &'a [crate::llm::TitleOption],
}

/// JSON document with the chosen title and all alternatives.
pub fn to_json(
    article: &GeneratedArticle,
    title_index: Option<usize>,
) -> serde_json::Result<String> {
    let export = ExportJson {
        title: &article.title_or_first(title_index).title,
        tags: &article.tags,
        content: &article.content,
        titles: &article.titles,
    };
    serde_json::to_string_pretty(&export)
}

/// Renders in the requested format.
pub fn render(
    article: &GeneratedArticle,
    title_index: Option<usize>,
    format: OutputFormat,
) -> serde_json::Result<String> {
    match format {
        OutputFormat::Text => Ok(to_text(article, title_index)),
        OutputFormat::Markdown => Ok(to_markdown(article, title_index)),
        OutputFormat::Html => Ok(to_html(article, title_index)),
        OutputFormat::Json => to_json(article, title_index),
    }
}

fn hashtags(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("#{}", tag))
        .collect::<Vec<_>>()
        .join(" ")
}
