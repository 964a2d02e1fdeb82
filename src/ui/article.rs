use colored::Colorize;

use crate::llm::GeneratedArticle;

use super::colors::score;

/// Numbered title list; `selected` gets a marker.
pub fn format_titles(article: &GeneratedArticle, selected: Option<usize>, colored: bool) -> String {
    let selected = selected.unwrap_or(0);
    article
        .titles
        .iter()
        .enumerate()
        .map(|(i, t)| {
            let marker = if i == selected { "➜" } else { " " };
            let title = if colored && i == selected {
                t.title.bold().to_string()
            } else {
                t.title.clone()
            };
            format!("{} {}. [{}] {}", marker, i + 1, score(t.score, colored), title)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `#tag` line.
pub fn format_tags(tags: &[String], colored: bool) -> String {
    let line = tags
        .iter()
        .map(|t| format!("#{}", t))
        .collect::<Vec<_>>()
        .join(" ");
    if colored { line.cyan().to_string() } else { line }
}

/// Prints titles, tags and body to stdout.
pub fn print_article(article: &GeneratedArticle, selected: Option<usize>, colored: bool) {
    let heading = |s: &str| {
        if colored {
            s.bold().underline().to_string()
        } else {
            s.to_string()
        }
    };

    println!("{}", heading("Titles"));
    println!("{}", format_titles(article, selected, colored));
    println!();
    println!("{}", heading("Tags"));
    println!("{}", format_tags(&article.tags, colored));
    println!();
    println!("{}", heading("Content"));
    println!("{}", article.content);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::TitleOption;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_titles_marks_selection() {
        let article = GeneratedArticle {
            titles: vec![
                TitleOption {
                    title: "A".to_string(),
                    score: 9.0,
                },
                TitleOption {
                    title: "B".to_string(),
                    score: 7.5,
                },
            ],
            content: String::new(),
            tags: vec![],
        };
        assert_eq!(
            format_titles(&article, Some(1), false),
            "  1. [ 9.0] A\n➜ 2. [ 7.5] B"
        );
    }

    #[test]
    fn test_format_tags() {
        let tags = vec!["rust".to_string(), "异步".to_string()];
        assert_eq!(format_tags(&tags, false), "#rust #异步");
    }
}
