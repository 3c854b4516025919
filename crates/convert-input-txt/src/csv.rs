//! Minimal RFC 4180 CSV reader.

/// Split CSV text into records.
///
/// Quoted fields may contain separators, doubled quotes and line breaks.
/// Blank lines between records are skipped.
pub fn parse_csv(text: &str, delimiter: char) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut field_started = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            match ch {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                c => field.push(c),
            }
            continue;
        }

        match ch {
            '"' if !field_started => {
                in_quotes = true;
                field_started = true;
            }
            c if c == delimiter => {
                record.push(std::mem::take(&mut field));
                field_started = false;
            }
            '\r' => {}
            '\n' => {
                if field_started || !record.is_empty() {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                field_started = false;
            }
            c => {
                field.push(c);
                field_started = true;
            }
        }
    }

    if field_started || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

/// Guess the delimiter from the first line: `;` or tab when they outnumber commas.
pub fn sniff_delimiter(text: &str) -> char {
    let first = text.lines().next().unwrap_or("");
    let count = |c: char| first.matches(c).count();
    [',', ';', '\t']
        .into_iter()
        .max_by_key(|&c| (count(c), c == ','))
        .filter(|&c| count(c) > 0)
        .unwrap_or(',')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple() {
        let rows = parse_csv("a,b,c\n1,2,3\n", ',');
        assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["1", "2", "3"]]);
    }

    #[test]
    fn test_quoted_fields() {
        let rows = parse_csv("name,quote\r\n\"Doe, J\",\"said \"\"hi\"\"\nthen left\"\r\n", ',');
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][0], "Doe, J");
        assert_eq!(rows[1][1], "said \"hi\"\nthen left");
    }

    #[test]
    fn test_empty_fields_and_blank_lines() {
        let rows = parse_csv("a,,c\n\n,x,\n", ',');
        assert_eq!(rows, vec![vec!["a", "", "c"], vec!["", "x", ""]]);
    }

    #[test]
    fn test_no_trailing_newline() {
        assert_eq!(parse_csv("x;y", ';'), vec![vec!["x", "y"]]);
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(sniff_delimiter("a\tb\n"), '\t');
        assert_eq!(sniff_delimiter("a,b;c,d"), ',');
        assert_eq!(sniff_delimiter("single"), ',');
    }
}
