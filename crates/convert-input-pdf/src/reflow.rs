//! Rebuild paragraphs from the hard-wrapped lines of extracted page text.

/// Markers that start a new line even without a blank line before them.
const LIST_MARKERS: &[&str] = &["•", "◦", "▪", "- ", "* ", "– "];

/// Join hard-wrapped lines into paragraphs.
///
/// A blank line ends a paragraph. List-looking lines keep their own line.
/// A word split with a trailing hyphen is glued back when the next line
/// continues in lowercase.
pub fn reflow(text: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush(&mut current, &mut paragraphs);
            continue;
        }

        if current.is_empty() {
            current.push_str(line);
        } else if starts_list_item(line) {
            current.push('\n');
            current.push_str(line);
        } else if current.ends_with('-') && line.starts_with(|c: char| c.is_lowercase()) {
            current.pop();
            current.push_str(line);
        } else {
            current.push(' ');
            current.push_str(line);
        }
    }
    flush(&mut current, &mut paragraphs);

    paragraphs.join("\n\n")
}

fn flush(current: &mut String, paragraphs: &mut Vec<String>) {
    if !current.is_empty() {
        paragraphs.push(std::mem::take(current));
    }
}

fn starts_list_item(line: &str) -> bool {
    if LIST_MARKERS.iter().any(|m| line.starts_with(m)) {
        return true;
    }
    // "1." / "12)" numbering
    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    digits > 0 && matches!(line[digits..].chars().next(), Some('.') | Some(')'))
}
