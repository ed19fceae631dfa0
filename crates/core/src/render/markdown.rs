use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static BOLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("bold regex"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Markup(String);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

enum Block {
    Paragraph(Vec<String>),
    List(Vec<String>),
}

pub fn render(text: &str) -> Markup {
    let mut blocks: Vec<Block> = Vec::new();
    let mut current: Option<Block> = None;

    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            blocks.extend(current.take());
            continue;
        }

        let bullet = trimmed
            .strip_prefix("- ")
            .or_else(|| trimmed.strip_prefix("* "));
        let continues = matches!(
            (bullet.is_some(), &current),
            (true, Some(Block::List(_))) | (false, Some(Block::Paragraph(_)))
        );
        if !continues {
            blocks.extend(current.take());
        }

        let html = inline(bullet.unwrap_or(trimmed).trim());
        match current.as_mut() {
            Some(Block::List(items) | Block::Paragraph(items)) => items.push(html),
            None if bullet.is_some() => current = Some(Block::List(vec![html])),
            None => current = Some(Block::Paragraph(vec![html])),
        }
    }
    blocks.extend(current);

    let html: Vec<String> = blocks
        .into_iter()
        .map(|block| match block {
            Block::Paragraph(lines) => format!("<p>{}</p>", lines.join("<br>")),
            Block::List(items) => {
                let items: String = items.iter().map(|i| format!("<li>{i}</li>")).collect();
                format!("<ul>{items}</ul>")
            }
        })
        .collect();

    Markup(html.join("\n"))
}

fn inline(line: &str) -> String {
    BOLD.replace_all(&escape(line), "<strong>$1</strong>").into_owned()
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_tags_are_escaped() {
        let html = render("<script>alert('x')</script>");
        assert_eq!(
            html.as_str(),
            "<p>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;</p>"
        );
        assert!(!html.as_str().contains("<script>"));
    }

    #[test]
    fn bold_inside_escaped_text() {
        let html = render("**Top 1: XOM** - BUY & hold \"tight\"");
        assert_eq!(
            html.as_str(),
            "<p><strong>Top 1: XOM</strong> - BUY &amp; hold &quot;tight&quot;</p>"
        );
    }

    #[test]
    fn bullets_are_grouped_and_closed_by_text() {
        let html = render("Reasons:\n- oil up\n* defense budget\nThat is all.");
        assert_eq!(
            html.as_str(),
            "<p>Reasons:</p>\n<ul><li>oil up</li><li>defense budget</li></ul>\n<p>That is all.</p>"
        );
    }

    #[test]
    fn paragraphs_and_line_breaks() {
        let html = render("line one\nline two\n\n\nnext paragraph");
        assert_eq!(html.as_str(), "<p>line one<br>line two</p>\n<p>next paragraph</p>");
    }

    #[test]
    fn unsupported_syntax_passes_through() {
        let html = render("# heading with `code` and *single*");
        assert_eq!(html.as_str(), "<p># heading with `code` and *single*</p>");
    }

    #[test]
    fn empty_text_renders_nothing() {
        assert!(render("").is_empty());
        assert!(render(" \n \n").is_empty());
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&render("a")).unwrap();
        assert_eq!(json, "\"<p>a</p>\"");
    }
}
