//! Workbook-level parts: sheet list and shared strings.

use quick_xml::events::Event;
use quick_xml::Reader;

use convert_utils::xml::{attr, local_name, namespaced_attr};

/// A sheet as listed in `xl/workbook.xml`.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetRef {
    pub name: String,
    pub rel_id: String,
}

/// Sheets in workbook order.
pub fn parse_sheets(xml: &str) -> Vec<SheetRef> {
    let mut sheets = Vec::new();
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if local_name(e) == "sheet" {
                    if let (Some(name), Some(rel_id)) = (attr(e, "name"), namespaced_attr(e, "id")) {
                        sheets.push(SheetRef { name, rel_id });
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("workbook.xml: {}", e);
                break;
            }
            _ => {}
        }
    }
    sheets
}

/// Shared string table; rich-text items are flattened, phonetic runs skipped.
pub fn parse_shared_strings(xml: &str) -> Vec<String> {
    let mut strings = Vec::new();
    let mut reader = Reader::from_str(xml);
    let mut current = String::new();
    let mut in_item = false;
    let mut in_text = false;
    let mut in_phonetic = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => match local_name(e).as_str() {
                "si" => {
                    in_item = true;
                    current.clear();
                }
                "rPh" => in_phonetic = true,
                "t" if in_item && !in_phonetic => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(ref e)) => {
                if local_name(e) == "si" {
                    strings.push(String::new());
                }
            }
            Ok(Event::Text(ref t)) if in_text => {
                if let Ok(s) = t.unescape() {
                    current.push_str(&s);
                }
            }
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"si" => {
                    in_item = false;
                    strings.push(std::mem::take(&mut current));
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_text = false,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    strings
}
