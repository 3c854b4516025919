//! Line-level Markdown classification and inline emphasis spans.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag, TagEnd};
use regex::Regex;

use crate::fonts::FontStyle;

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ {0,3}(#{1,6})(?:\s+(.*?))?(?:\s+#+)?\s*$").unwrap());
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([ \t]*)([-*+]|\d+\.)\s+(.*)$").unwrap());
static QUOTE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}(?:>\s?)+(.*)$").unwrap());
static RULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^ {0,3}(?:(?:-[ \t]*){3,}|(?:\*[ \t]*){3,}|(?:_[ \t]*){3,})$").unwrap()
});
static ORDERED_START: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)([.)])").unwrap());
static LINK_DEFINITION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\[[^\]]+\]:").unwrap());

/// What a source line turned out to be.
#[derive(Debug, Clone, PartialEq)]
pub enum LineKind {
    Heading(u8),
    ListItem { depth: usize, marker: String },
    Quote,
    Code,
    Rule,
    Blank,
    Paragraph,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MdLine {
    pub kind: LineKind,
    /// The line with its block marker removed.
    pub text: String,
}

impl MdLine {
    fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// Classify every line of `markdown` by its leading syntax.
///
/// Fence lines themselves are dropped; the lines between them come back as
/// [`LineKind::Code`] verbatim. An unclosed fence runs to the end of input.
pub fn classify_lines(markdown: &str) -> Vec<MdLine> {
    let mut lines = Vec::new();
    let mut fence: Option<char> = None;

    for raw in markdown.lines() {
        let trimmed = raw.trim_start();
        let opens = ['`', '~']
            .into_iter()
            .find(|&c| trimmed.chars().take(3).filter(|&t| t == c).count() == 3);

        if let Some(open) = fence {
            if opens == Some(open) && trimmed.trim_start_matches(open).trim().is_empty() {
                fence = None;
            } else {
                lines.push(MdLine::new(LineKind::Code, raw.trim_end().replace('\t', "    ")));
            }
            continue;
        }
        if opens.is_some() {
            fence = opens;
            continue;
        }
        lines.push(classify(raw.trim_end()));
    }
    lines
}

fn classify(line: &str) -> MdLine {
    if line.trim().is_empty() {
        return MdLine::new(LineKind::Blank, "");
    }
    if RULE.is_match(line) {
        return MdLine::new(LineKind::Rule, "");
    }
    if let Some(caps) = HEADING.captures(line) {
        let level = caps[1].len() as u8;
        let text = caps.get(2).map_or("", |m| m.as_str());
        return MdLine::new(LineKind::Heading(level), text);
    }
    if let Some(caps) = LIST_ITEM.captures(line) {
        let leading: usize = caps[1].chars().map(|c| if c == '\t' { 4 } else { 1 }).sum();
        let marker = match &caps[2] {
            "-" | "*" | "+" => "•".to_string(),
            numbered => numbered.to_string(),
        };
        return MdLine::new(
            LineKind::ListItem {
                depth: leading / 2,
                marker,
            },
            &caps[3],
        );
    }
    if let Some(caps) = QUOTE.captures(line) {
        return MdLine::new(LineKind::Quote, caps[1].trim());
    }
    MdLine::new(LineKind::Paragraph, line.trim())
}

/// A run of text sharing one emphasis style.
#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub text: String,
    pub style: FontStyle,
}

/// Split inline Markdown into styled spans with the markers removed.
///
/// Code spans map to the mono face, strong to bold, emphasis to italic;
/// everything else takes `base`. Links keep only their text.
pub fn inline_spans(text: &str, base: FontStyle) -> Vec<Span> {
    let source = escape_block_start(text);
    let mut spans: Vec<Span> = Vec::new();
    let mut strong = 0usize;
    let mut emphasis = 0usize;

    for event in Parser::new(&source) {
        let current = if strong > 0 {
            FontStyle::Bold
        } else if emphasis > 0 {
            FontStyle::Italic
        } else {
            base
        };
        match event {
            Event::Start(Tag::Strong) => strong += 1,
            Event::End(TagEnd::Strong) => strong = strong.saturating_sub(1),
            Event::Start(Tag::Emphasis) => emphasis += 1,
            Event::End(TagEnd::Emphasis) => emphasis = emphasis.saturating_sub(1),
            Event::Text(t) => push(&mut spans, t.trim_end_matches('\n'), current),
            Event::Code(t) => push(&mut spans, &t, FontStyle::Mono),
            Event::Html(t) | Event::InlineHtml(t) => {
                push(&mut spans, t.trim_end_matches('\n'), current)
            }
            Event::SoftBreak | Event::HardBreak => push(&mut spans, " ", current),
            _ => {}
        }
    }
    spans
}

fn push(spans: &mut Vec<Span>, text: &str, style: FontStyle) {
    if text.is_empty() {
        return;
    }
    match spans.last_mut() {
        Some(last) if last.style == style => last.text.push_str(text),
        _ => spans.push(Span {
            text: text.to_string(),
            style,
        }),
    }
}

/// The text of `text` with inline markers removed, in one style.
pub fn plain_text(text: &str) -> String {
    inline_spans(text, FontStyle::Regular)
        .into_iter()
        .map(|s| s.text)
        .collect()
}

/// Backslash-escape a leading character the inline parser would otherwise
/// read as block syntax. Block markers were already stripped by
/// [`classify_lines`], so whatever is left is content.
fn escape_block_start(text: &str) -> String {
    let text = text.trim();
    if let Some(caps) = ORDERED_START.captures(text) {
        let digits = caps[1].len();
        return format!("{}\\{}", &text[..digits], &text[digits..]);
    }
    let mut chars = text.chars();
    let first = chars.next();
    let second = chars.next();
    let needs_escape = match first {
        Some('-') | Some('+') | Some('*') => second.map_or(true, char::is_whitespace),
        Some('#') => second.map_or(true, |c| c == '#' || c.is_whitespace()),
        Some('>') | Some('=') | Some('|') => true,
        Some('~') => text.starts_with("~~~"),
        Some('[') => LINK_DEFINITION.is_match(text),
        _ => false,
    };
    if needs_escape {
        format!("\\{}", text)
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(md: &str) -> Vec<LineKind> {
        classify_lines(md).into_iter().map(|l| l.kind).collect()
    }

    #[test]
    fn test_headings() {
        let lines = classify_lines("# Title\n### Sub ###\n####### seven");
        assert_eq!(lines[0], MdLine::new(LineKind::Heading(1), "Title"));
        assert_eq!(lines[1], MdLine::new(LineKind::Heading(3), "Sub"));
        assert_eq!(lines[2].kind, LineKind::Paragraph);
    }

    #[test]
    fn test_list_items() {
        let lines = classify_lines("- one\n  * two\n    3. three\n10. ten");
        assert_eq!(
            lines[0].kind,
            LineKind::ListItem {
                depth: 0,
                marker: "•".into()
            }
        );
        assert_eq!(lines[0].text, "one");
        assert_eq!(
            lines[1].kind,
            LineKind::ListItem {
                depth: 1,
                marker: "•".into()
            }
        );
        assert_eq!(
            lines[2].kind,
            LineKind::ListItem {
                depth: 2,
                marker: "3.".into()
            }
        );
        assert_eq!(lines[3].text, "ten");
    }

    #[test]
    fn test_quote_rule_blank() {
        assert_eq!(
            kinds("> quoted\n\n---\n***\n_ _ _\n-- not a rule"),
            vec![
                LineKind::Quote,
                LineKind::Blank,
                LineKind::Rule,
                LineKind::Rule,
                LineKind::Rule,
                LineKind::Paragraph,
            ]
        );
        assert_eq!(classify_lines(">> nested")[0].text, "nested");
    }

    #[test]
    fn test_code_fence() {
        let md = "before\n```python\n# not a heading\n\tindented\n```\nafter";
        let lines = classify_lines(md);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[1], MdLine::new(LineKind::Code, "# not a heading"));
        assert_eq!(lines[2], MdLine::new(LineKind::Code, "    indented"));
        assert_eq!(lines[3].kind, LineKind::Paragraph);
    }

    #[test]
    fn test_unclosed_fence_runs_to_end() {
        assert_eq!(
            kinds("```\n- a\n> b"),
            vec![LineKind::Code, LineKind::Code]
        );
    }

    #[test]
    fn test_inline_spans() {
        let spans = inline_spans("plain **bold** and *it* with `code`", FontStyle::Regular);
        let styles: Vec<FontStyle> = spans.iter().map(|s| s.style).collect();
        assert_eq!(
            styles,
            vec![
                FontStyle::Regular,
                FontStyle::Bold,
                FontStyle::Regular,
                FontStyle::Italic,
                FontStyle::Regular,
                FontStyle::Mono,
            ]
        );
        assert_eq!(spans[1].text, "bold");
        assert_eq!(spans[5].text, "code");
    }

    #[test]
    fn test_plain_text_strips_markers() {
        assert_eq!(plain_text("**שלום** __עולם__ `x`"), "שלום עולם x");
        assert_eq!(plain_text("[site](http://example.com)"), "site");
        assert_eq!(plain_text("a &amp; b"), "a & b");
    }

    #[test]
    fn test_block_lookalikes_survive() {
        assert_eq!(plain_text("1) first"), "1) first");
        assert_eq!(plain_text("# hash"), "# hash");
        assert_eq!(plain_text("> arrow"), "> arrow");
        assert_eq!(plain_text("- dash"), "- dash");
    }
}
