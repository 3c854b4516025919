//! Word styles and numbering definitions, used for heading and list detection.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use convert_utils::xml::{attr, local_name};

/// Style information extracted from `word/styles.xml`.
#[derive(Debug, Clone, Default)]
pub struct StyleInfo {
    /// The style name (e.g., "heading 1", "Normal", "Quote")
    pub name: String,
    /// The parent style ID, if any
    pub based_on: Option<String>,
    /// Outline level (0 = heading 1, 1 = heading 2, etc.)
    pub outline_level: Option<u8>,
}

/// Parse `word/styles.xml` into a map of style id → [`StyleInfo`].
pub fn parse_styles(xml: &str) -> HashMap<String, StyleInfo> {
    let mut styles = HashMap::new();
    let mut reader = Reader::from_str(xml);

    let mut current_id: Option<String> = None;
    let mut current = StyleInfo::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match local_name(e).as_str() {
                "style" => {
                    current_id = attr(e, "styleId");
                    current = StyleInfo::default();
                }
                "name" if current_id.is_some() => {
                    current.name = attr(e, "val").unwrap_or_default();
                }
                "basedOn" if current_id.is_some() => {
                    current.based_on = attr(e, "val");
                }
                "outlineLvl" if current_id.is_some() => {
                    current.outline_level = attr(e, "val").and_then(|v| v.parse().ok());
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"style" {
                    if let Some(id) = current_id.take() {
                        let mut info = std::mem::take(&mut current);
                        if info.outline_level.is_none() {
                            info.outline_level = outline_from_name(&info.name);
                        }
                        styles.insert(id, info);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::debug!("styles.xml: {}", e);
                break;
            }
            _ => {}
        }
    }

    styles
}

/// "heading 2" / "Heading2" → Some(1). Outline levels above 8 are body text.
fn outline_from_name(name: &str) -> Option<u8> {
    let lower = name.to_lowercase();
    let rest = lower.strip_prefix("heading")?;
    let n: u8 = rest.trim().parse().ok()?;
    (1..=9).contains(&n).then(|| n - 1)
}

/// Determine the heading level (1-6) for a style id, following `basedOn`.
pub fn heading_level(style_id: &str, styles: &HashMap<String, StyleInfo>) -> Option<u8> {
    let mut id = style_id;
    // Bounded walk guards against cyclic basedOn chains.
    for _ in 0..16 {
        let info = styles.get(id)?;
        if let Some(outline) = info.outline_level {
            return (outline < 9).then(|| (outline + 1).min(6));
        }
        id = info.based_on.as_deref()?;
    }
    None
}

/// Whether a style is (or derives from) a quote style.
pub fn is_quote(style_id: &str, styles: &HashMap<String, StyleInfo>) -> bool {
    let mut id = style_id;
    for _ in 0..16 {
        let Some(info) = styles.get(id) else {
            return false;
        };
        let lower = info.name.to_lowercase();
        if lower == "quote" || lower == "intense quote" {
            return true;
        }
        match info.based_on.as_deref() {
            Some(parent) => id = parent,
            None => return false,
        }
    }
    false
}

/// List definitions: `numId` → per-level number format ("bullet", "decimal", ...).
#[derive(Debug, Clone, Default)]
pub struct Numbering {
    levels: HashMap<String, HashMap<u8, String>>,
}

impl Numbering {
    /// Whether list items of `num_id` at `ilvl` are bulleted. Unknown lists are bullets.
    pub fn is_bullet(&self, num_id: &str, ilvl: u8) -> bool {
        self.levels
            .get(num_id)
            .and_then(|lvls| lvls.get(&ilvl))
            .map(|fmt| fmt == "bullet" || fmt == "none")
            .unwrap_or(true)
    }
}

/// Parse `word/numbering.xml`, resolving each `w:num` to its abstract definition.
pub fn parse_numbering(xml: &str) -> Numbering {
    let mut abstract_levels: HashMap<String, HashMap<u8, String>> = HashMap::new();
    let mut num_to_abstract: HashMap<String, String> = HashMap::new();
    let mut reader = Reader::from_str(xml);

    let mut current_abstract: Option<String> = None;
    let mut current_level: u8 = 0;
    let mut current_num: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => match local_name(e).as_str() {
                "abstractNum" => current_abstract = attr(e, "abstractNumId"),
                "lvl" if current_abstract.is_some() => {
                    current_level = attr(e, "ilvl").and_then(|v| v.parse().ok()).unwrap_or(0);
                }
                "numFmt" => {
                    if let (Some(abs), Some(fmt)) = (&current_abstract, attr(e, "val")) {
                        abstract_levels
                            .entry(abs.clone())
                            .or_default()
                            .insert(current_level, fmt);
                    }
                }
                "num" => current_num = attr(e, "numId"),
                "abstractNumId" => {
                    if let (Some(num), Some(abs)) = (&current_num, attr(e, "val")) {
                        num_to_abstract.insert(num.clone(), abs);
                    }
                }
                _ => {}
            },
            Ok(Event::End(ref e)) => match e.local_name().as_ref() {
                b"abstractNum" => current_abstract = None,
                b"num" => current_num = None,
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }

    let levels = num_to_abstract
        .into_iter()
        .filter_map(|(num, abs)| abstract_levels.get(&abs).map(|l| (num, l.clone())))
        .collect();
    Numbering { levels }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_styles() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:type="paragraph" w:styleId="Heading1">
    <w:name w:val="heading 1"/>
    <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Heading2">
    <w:name w:val="heading 2"/>
    <w:pPr><w:outlineLvl w:val="1"/></w:pPr>
  </w:style>
  <w:style w:type="paragraph" w:styleId="MyChapter">
    <w:name w:val="My Chapter"/>
    <w:basedOn w:val="Heading2"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Normal">
    <w:name w:val="Normal"/>
  </w:style>
  <w:style w:type="paragraph" w:styleId="Quote">
    <w:name w:val="Quote"/>
    <w:basedOn w:val="Normal"/>
  </w:style>
</w:styles>"#;

        let styles = parse_styles(xml);
        assert_eq!(styles["Heading1"].outline_level, Some(0));
        assert_eq!(heading_level("Heading1", &styles), Some(1));
        assert_eq!(heading_level("Heading2", &styles), Some(2));
        assert_eq!(heading_level("MyChapter", &styles), Some(2));
        assert_eq!(heading_level("Normal", &styles), None);
        assert_eq!(heading_level("Unknown", &styles), None);
        assert!(is_quote("Quote", &styles));
        assert!(!is_quote("Normal", &styles));
    }

    #[test]
    fn test_heading_by_name_fallback() {
        let xml = r#"<w:styles xmlns:w="w">
  <w:style w:type="paragraph" w:styleId="Heading3"><w:name w:val="heading 3"/></w:style>
</w:styles>"#;
        let styles = parse_styles(xml);
        assert_eq!(heading_level("Heading3", &styles), Some(3));
    }

    #[test]
    fn test_numbering_resolves_abstract() {
        let xml = r#"<w:numbering xmlns:w="w">
  <w:abstractNum w:abstractNumId="10">
    <w:lvl w:ilvl="0"><w:numFmt w:val="decimal"/></w:lvl>
    <w:lvl w:ilvl="1"><w:numFmt w:val="bullet"/></w:lvl>
  </w:abstractNum>
  <w:abstractNum w:abstractNumId="11">
    <w:lvl w:ilvl="0"><w:numFmt w:val="bullet"/></w:lvl>
  </w:abstractNum>
  <w:num w:numId="1"><w:abstractNumId w:val="10"/></w:num>
  <w:num w:numId="2"><w:abstractNumId w:val="11"/></w:num>
</w:numbering>"#;
        let numbering = parse_numbering(xml);
        assert!(!numbering.is_bullet("1", 0));
        assert!(numbering.is_bullet("1", 1));
        assert!(numbering.is_bullet("2", 0));
        assert!(numbering.is_bullet("99", 0));
    }
}
