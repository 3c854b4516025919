//! Small Markdown builders shared by the input plugins.

/// Escape a table cell: pipes are escaped and line breaks become `<br>`.
pub fn escape_cell(cell: &str) -> String {
    cell.trim()
        .replace('|', "\\|")
        .replace("\r\n", "<br>")
        .replace('\n', "<br>")
}

/// Render rows as a GitHub pipe table. The first row is the header; short
/// rows are padded with empty cells. Returns an empty string for no rows.
pub fn pipe_table(rows: &[Vec<String>]) -> String {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    if width == 0 {
        return String::new();
    }

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        out.push('|');
        for col in 0..width {
            let cell = row.get(col).map(|c| escape_cell(c)).unwrap_or_default();
            out.push(' ');
            out.push_str(&cell);
            out.push_str(" |");
        }
        out.push('\n');
        if i == 0 {
            out.push('|');
            for _ in 0..width {
                out.push_str(" --- |");
            }
            out.push('\n');
        }
    }
    out
}

/// Wrap `body` in a fenced code block tagged with `lang`.
pub fn fenced(lang: &str, body: &str) -> String {
    let fence = if body.contains("```") { "````" } else { "```" };
    format!("{}{}\n{}\n{}\n", fence, lang, body.trim_end_matches('\n'), fence)
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_space = false;
    for ch in text.chars() {
        if ch.is_whitespace() {
            pending_space = true;
        } else {
            if pending_space && !out.is_empty() {
                out.push(' ');
            }
            pending_space = false;
            out.push(ch);
        }
    }
    if pending_space && !out.is_empty() {
        out.push(' ');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_pipe_table() {
        let rows = vec![row(&["Name", "Qty"]), row(&["a|b", "2"]), row(&["short"])];
        assert_eq!(
            pipe_table(&rows),
            "| Name | Qty |\n| --- | --- |\n| a\\|b | 2 |\n| short |  |\n"
        );
        assert_eq!(pipe_table(&[]), "");
    }

    #[test]
    fn test_escape_cell_newlines() {
        assert_eq!(escape_cell(" line one\nline two "), "line one<br>line two");
    }

    #[test]
    fn test_fenced() {
        assert_eq!(fenced("json", "{}\n"), "```json\n{}\n```\n");
        assert!(fenced("md", "```rust\n```").starts_with("````md\n"));
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  "), "a b ");
        assert_eq!(collapse_whitespace("\n"), "");
    }
}
