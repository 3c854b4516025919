//! Worksheet cell grid extraction.

use quick_xml::events::Event;
use quick_xml::Reader;

use convert_utils::xml::{attr, local_name};

/// Column index (0-based) from a cell reference like `AB12`.
pub fn column_index(cell_ref: &str) -> Option<usize> {
    let letters: String = cell_ref.chars().take_while(|c| c.is_ascii_alphabetic()).collect();
    if letters.is_empty() {
        return None;
    }
    let mut index = 0usize;
    for c in letters.chars() {
        index = index * 26 + (c.to_ascii_uppercase() as usize - 'A' as usize + 1);
    }
    Some(index - 1)
}

/// Read a worksheet into rows of display strings.
///
/// Missing cells become empty strings; fully empty rows are dropped and
/// trailing empty columns trimmed.
pub fn parse_sheet(xml: &str, shared: &[String]) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut reader = Reader::from_str(xml);

    let mut row: Vec<String> = Vec::new();
    let mut cell_col = 0usize;
    let mut cell_type = String::new();
    let mut value = String::new();
    let mut in_value = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e).as_str() {
                "row" => row.clear(),
                "c" => {
                    cell_col = attr(e, "r")
                        .and_then(|r| column_index(&r))
                        .unwrap_or(row.len());
                    cell_type = attr(e, "t").unwrap_or_default();
                    value.clear();
                }
                "v" | "t" => in_value = true,
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_value => {
                if let Ok(s) = t.unescape() {
                    value.push_str(&s);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"v" | b"t" => in_value = false,
                b"c" => {
                    let display = cell_display(&cell_type, &value, shared);
                    if row.len() <= cell_col {
                        row.resize(cell_col + 1, String::new());
                    }
                    row[cell_col] = display;
                }
                b"row" => {
                    if row.iter().any(|c| !c.trim().is_empty()) {
                        rows.push(std::mem::take(&mut row));
                    }
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("worksheet parse error: {}", e);
                break;
            }
            _ => {}
        }
    }

    let width = rows
        .iter()
        .map(|r| r.iter().rposition(|c| !c.trim().is_empty()).map_or(0, |i| i + 1))
        .max()
        .unwrap_or(0);
    for r in &mut rows {
        r.resize(width, String::new());
    }
    rows
}

fn cell_display(cell_type: &str, raw: &str, shared: &[String]) -> String {
    match cell_type {
        "s" => raw
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|i| shared.get(i).cloned())
            .unwrap_or_default(),
        "b" => match raw.trim() {
            "1" => "TRUE".to_string(),
            _ => "FALSE".to_string(),
        },
        _ => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_index() {
        assert_eq!(column_index("A1"), Some(0));
        assert_eq!(column_index("Z9"), Some(25));
        assert_eq!(column_index("AA10"), Some(26));
        assert_eq!(column_index("12"), None);
    }

    #[test]
    fn test_parse_sheet_types_and_gaps() {
        let shared = vec!["Item".to_string(), "Price".to_string(), "Tea".to_string()];
        let xml = r#"<worksheet><sheetData>
<row r="1"><c r="A1" t="s"><v>0</v></c><c r="C1" t="s"><v>1</v></c></row>
<row r="2"><c r="A2" t="s"><v>2</v></c><c r="B2" t="b"><v>1</v></c><c r="C2"><v>4.5</v></c></row>
<row r="3"><c r="A3"/></row>
<row r="4"><c r="A4" t="inlineStr"><is><t>Inline &amp; more</t></is></c><c r="C4" t="str"><f>C2*2</f><v>9</v></c></row>
</sheetData></worksheet>"#;
        let rows = parse_sheet(xml, &shared);
        assert_eq!(
            rows,
            vec![
                vec!["Item", "", "Price"],
                vec!["Tea", "TRUE", "4.5"],
                vec!["Inline & more", "", "9"],
            ]
        );
    }
}
