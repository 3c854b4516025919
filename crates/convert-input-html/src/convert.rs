//! DOM → Markdown conversion.

use scraper::node::Node;
use scraper::{ElementRef, Html};

use convert_utils::markdown::{collapse_whitespace, fenced, pipe_table};

/// Convert an HTML document (or fragment) to Markdown.
///
/// `<head>` content, scripts and styles are dropped.
pub fn html_to_markdown(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut converter = Converter::default();
    converter.children(document.root_element(), 0);
    converter.finish()
}

const SKIPPED: &[&str] = &[
    "head", "script", "style", "noscript", "template", "title", "meta", "link", "iframe",
];

fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "body"
            | "dd"
            | "details"
            | "div"
            | "dl"
            | "dt"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "header"
            | "hr"
            | "html"
            | "li"
            | "main"
            | "nav"
            | "ol"
            | "p"
            | "pre"
            | "section"
            | "summary"
            | "table"
            | "ul"
    )
}

#[derive(Default)]
struct Converter {
    blocks: Vec<String>,
}

impl Converter {
    fn finish(self) -> String {
        self.blocks.join("\n\n")
    }

    fn push_block(&mut self, block: String) {
        if !block.trim().is_empty() {
            self.blocks.push(block);
        }
    }

    /// Walk mixed content: inline runs become paragraphs, block children
    /// are converted on their own.
    fn children(&mut self, el: ElementRef<'_>, list_depth: usize) {
        let mut pending = String::new();
        for child in el.children() {
            match child.value() {
                Node::Text(text) => pending.push_str(text),
                Node::Element(e) => {
                    let Some(child_el) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let tag = e.name();
                    if SKIPPED.contains(&tag) {
                        continue;
                    }
                    if is_block(tag) {
                        self.push_block(paragraph(&pending));
                        pending.clear();
                        self.block(child_el, list_depth);
                    } else {
                        pending.push_str(&inline(child_el));
                    }
                }
                _ => {}
            }
        }
        self.push_block(paragraph(&pending));
    }

    fn block(&mut self, el: ElementRef<'_>, list_depth: usize) {
        let tag = el.value().name();
        match tag {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = tag[1..].parse::<usize>().unwrap_or(1);
                let text = collapse_whitespace(&inline_children(el));
                let text = text.trim();
                if !text.is_empty() {
                    self.push_block(format!("{} {}", "#".repeat(level), text));
                }
            }
            "p" => self.push_block(paragraph(&inline_children(el))),
            "pre" => {
                let code: String = el.text().collect();
                self.push_block(fenced(&code_language(el), &code).trim_end().to_string());
            }
            "hr" => self.push_block("---".to_string()),
            "ul" | "ol" => {
                let mut lines = Vec::new();
                list(el, list_depth, &mut lines);
                self.push_block(lines.join("\n"));
            }
            "table" => self.push_block(table(el).trim_end().to_string()),
            "blockquote" => {
                let mut inner = Converter::default();
                inner.children(el, list_depth);
                let quoted: Vec<String> = inner
                    .finish()
                    .lines()
                    .map(|l| if l.is_empty() { ">".to_string() } else { format!("> {}", l) })
                    .collect();
                self.push_block(quoted.join("\n"));
            }
            _ => self.children(el, list_depth),
        }
    }
}

/// Finish an inline run: collapse whitespace per line, keep `<br>` breaks.
fn paragraph(raw: &str) -> String {
    raw.split('\n')
        .map(|line| collapse_whitespace(line).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn inline_children(el: ElementRef<'_>) -> String {
    let mut out = String::new();
    for child in el.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&collapse_whitespace(text)),
            Node::Element(_) => {
                if let Some(child_el) = ElementRef::wrap(child) {
                    out.push_str(&inline(child_el));
                }
            }
            _ => {}
        }
    }
    out
}

fn inline(el: ElementRef<'_>) -> String {
    let e = el.value();
    match e.name() {
        tag if SKIPPED.contains(&tag) => String::new(),
        "br" => "\n".to_string(),
        "strong" | "b" => wrap(&inline_children(el), "**"),
        "em" | "i" => wrap(&inline_children(el), "*"),
        "code" | "kbd" | "samp" => {
            let text: String = el.text().collect();
            if text.trim().is_empty() {
                text
            } else {
                format!("`{}`", text.trim())
            }
        }
        "a" => {
            let text = inline_children(el);
            match e.attr("href") {
                Some(href) if !href.is_empty() && !href.starts_with("javascript:") => {
                    format!("[{}]({})", text.trim(), href)
                }
                _ => text,
            }
        }
        "img" => {
            let alt = e.attr("alt").unwrap_or("");
            let src = e.attr("src").unwrap_or("");
            let src = match src.strip_prefix("data:") {
                Some(rest) => format!("data:{}...", rest.split(',').next().unwrap_or("")),
                None => src.to_string(),
            };
            format!("![{}]({})", alt, src)
        }
        "ul" | "ol" => {
            let mut lines = Vec::new();
            list(el, 0, &mut lines);
            format!("\n{}\n", lines.join("\n"))
        }
        _ => inline_children(el),
    }
}

/// Wrap `inner` in an emphasis marker, keeping surrounding spaces outside.
fn wrap(inner: &str, marker: &str) -> String {
    let trimmed = inner.trim();
    if trimmed.is_empty() {
        return inner.to_string();
    }
    let lead = if inner.starts_with(char::is_whitespace) { " " } else { "" };
    let trail = if inner.ends_with(char::is_whitespace) { " " } else { "" };
    format!("{}{}{}{}{}", lead, marker, trimmed, marker, trail)
}

fn list(el: ElementRef<'_>, depth: usize, lines: &mut Vec<String>) {
    let ordered = el.value().name() == "ol";
    let mut number: usize = el
        .value()
        .attr("start")
        .and_then(|s| s.parse().ok())
        .unwrap_or(1);
    let indent = "  ".repeat(depth);

    for item in el.children().filter_map(ElementRef::wrap) {
        if item.value().name() != "li" {
            continue;
        }
        let marker = if ordered {
            let m = format!("{}.", number);
            number += 1;
            m
        } else {
            "*".to_string()
        };

        let mut text = String::new();
        let mut nested = Vec::new();
        for child in item.children() {
            match child.value() {
                Node::Text(t) => text.push_str(t),
                Node::Element(e) => {
                    let Some(child_el) = ElementRef::wrap(child) else {
                        continue;
                    };
                    match e.name() {
                        "ul" | "ol" => list(child_el, depth + 1, &mut nested),
                        "p" | "div" => {
                            text.push(' ');
                            text.push_str(&inline_children(child_el));
                            text.push(' ');
                        }
                        _ => text.push_str(&inline(child_el)),
                    }
                }
                _ => {}
            }
        }

        let text = collapse_whitespace(&text.replace('\n', " "));
        lines.push(format!("{}{} {}", indent, marker, text.trim()));
        lines.append(&mut nested);
    }
}

fn table(el: ElementRef<'_>) -> String {
    let rows: Vec<Vec<String>> = el
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == "tr")
        .map(|tr| {
            tr.children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "td" | "th"))
                .map(|cell| collapse_whitespace(&inline_children(cell).replace('\n', " ")))
                .collect()
        })
        .filter(|row: &Vec<String>| !row.is_empty())
        .collect();
    pipe_table(&rows)
}

fn code_language(pre: ElementRef<'_>) -> String {
    std::iter::once(pre)
        .chain(pre.children().filter_map(ElementRef::wrap))
        .flat_map(|e| e.value().classes().collect::<Vec<_>>())
        .find_map(|c| c.strip_prefix("language-").map(str::to_string))
        .unwrap_or_default()
}
