//! Post-extraction cleanup applied to every plugin's Markdown output.

use std::sync::LazyLock;

use regex::Regex;

static FENCE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^ {0,3}(`{3,}|~{3,})").unwrap());

/// An open code fence: its marker character and run length.
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn open(line: &str) -> Option<Self> {
        let run = FENCE.captures(line)?.get(1)?.as_str();
        Some(Self {
            marker: run.chars().next()?,
            len: run.len(),
        })
    }

    /// A closing fence uses the same marker, is at least as long, and has
    /// nothing after the run.
    fn closed_by(&self, line: &str) -> bool {
        let Some(run) = FENCE.captures(line).and_then(|c| c.get(1)) else {
            return false;
        };
        run.as_str().starts_with(self.marker)
            && run.len() >= self.len
            && line[run.end()..].trim().is_empty()
    }
}

/// Normalize extracted Markdown so output files are stable across plugins:
/// CRLF becomes LF, trailing whitespace is stripped from every line, runs of
/// blank lines collapse to one, and the text ends with exactly one newline.
/// Lines inside fenced code blocks are kept as they are. Empty input stays
/// empty.
pub fn normalize(markdown: &str) -> String {
    let unified = markdown.replace("\r\n", "\n").replace('\r', "\n");
    let mut lines: Vec<&str> = Vec::new();
    let mut fence: Option<Fence> = None;

    for line in unified.lines() {
        if let Some(open) = &fence {
            if open.closed_by(line) {
                fence = None;
                lines.push(line.trim_end());
            } else {
                lines.push(line);
            }
            continue;
        }

        let line = line.trim_end();
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        fence = Fence::open(line);
        lines.push(line);
    }

    while lines.last().is_some_and(|l| l.trim().is_empty()) {
        lines.pop();
    }
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let md = "# Title  \r\n\r\n\r\n\r\nBody text\t\n\n\n";
        assert_eq!(normalize(md), "# Title\n\nBody text\n");
    }

    #[test]
    fn test_normalize_keeps_leading_indent() {
        let md = "\n\n  - nested item\n";
        assert_eq!(normalize(md), "  - nested item\n");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("\n \n\t\n"), "");
    }

    #[test]
    fn test_normalize_leaves_fenced_code_alone() {
        let md = "Intro  \n\n\n```python\ndef f():  \n\n\n\n    return 1\n```  \n\n\n\nAfter\n";
        assert_eq!(
            normalize(md),
            "Intro\n\n```python\ndef f():  \n\n\n\n    return 1\n```\n\nAfter\n"
        );
    }

    #[test]
    fn test_normalize_fence_needs_matching_close() {
        // A shorter or different run does not close the block.
        let md = "~~~~\na  \n~~~\n```\n\n\nb  \n~~~~\n\n\ntail  ";
        assert_eq!(normalize(md), "~~~~\na  \n~~~\n```\n\n\nb  \n~~~~\n\ntail\n");
    }
}
