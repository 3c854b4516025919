//! EPUB package parsing — container.xml, then the OPF metadata, manifest and spine.

use std::collections::HashMap;

use quick_xml::events::Event;
use quick_xml::Reader;

use convert_core::error::{ConvertError, Result};
use convert_utils::archive::{decode_href, resolve_part, ZipPackage};
use convert_utils::mime;
use convert_utils::xml::{attr, local_name};

/// What the converter needs from an EPUB package.
#[derive(Debug, Default)]
pub struct EpubPackage {
    /// Dublin Core fields in display order; repeated creators are joined.
    pub metadata: Vec<(&'static str, String)>,
    /// Archive paths of the (X)HTML spine documents, in reading order.
    pub spine: Vec<String>,
}

/// Metadata fields that are emitted, with their display labels.
const METADATA_FIELDS: &[(&str, &str)] = &[
    ("title", "Title"),
    ("creator", "Authors"),
    ("language", "Language"),
    ("publisher", "Publisher"),
    ("date", "Date"),
    ("description", "Description"),
    ("identifier", "Identifier"),
];

pub fn parse_package(pkg: &mut ZipPackage) -> Result<EpubPackage> {
    let container = pkg
        .read_string("META-INF/container.xml")
        .map_err(|e| ConvertError::Extraction(format!("Not an EPUB (container.xml): {}", e)))?;
    let opf_path = find_rootfile(&container)?;
    log::debug!("OPF path: {}", opf_path);

    let opf = pkg
        .read_string(&opf_path)
        .map_err(|e| ConvertError::Extraction(format!("Cannot read {}: {}", opf_path, e)))?;

    let metadata = parse_metadata(&opf);
    let manifest = parse_manifest(&opf);
    let spine = parse_spine(&opf)
        .into_iter()
        .filter_map(|idref| {
            let Some((href, media_type)) = manifest.get(&idref) else {
                log::warn!("Spine item {} missing from manifest", idref);
                return None;
            };
            if !mime::is_html_mime(media_type) {
                return None;
            }
            Some(resolve_part(&opf_path, href))
        })
        .collect();

    Ok(EpubPackage { metadata, spine })
}

fn find_rootfile(container: &str) -> Result<String> {
    let mut reader = Reader::from_str(container);
    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if local_name(e) == "rootfile" {
                    if let Some(path) = attr(e, "full-path") {
                        return Ok(path);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ConvertError::Xml(format!("container.xml: {}", e))),
            _ => {}
        }
    }
    Err(ConvertError::Extraction(
        "No rootfile found in container.xml".to_string(),
    ))
}

fn parse_metadata(opf: &str) -> Vec<(&'static str, String)> {
    let mut values: HashMap<&'static str, Vec<String>> = HashMap::new();
    let mut reader = Reader::from_str(opf);
    let mut in_metadata = false;
    let mut current: Option<&'static str> = None;
    let mut text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let local = local_name(e);
                if local == "metadata" {
                    in_metadata = true;
                } else if in_metadata {
                    current = METADATA_FIELDS
                        .iter()
                        .find(|(key, _)| *key == local)
                        .map(|(key, _)| *key);
                    text.clear();
                }
            }
            Ok(Event::Text(ref t)) if current.is_some() => {
                if let Ok(s) = t.unescape() {
                    text.push_str(&s);
                }
            }
            Ok(Event::End(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                if local == "metadata" {
                    break;
                }
                if let Some(key) = current.take() {
                    let value = text.trim();
                    if !value.is_empty() {
                        values.entry(key).or_default().push(value.to_string());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("OPF metadata: {}", e);
                break;
            }
            _ => {}
        }
    }

    METADATA_FIELDS
        .iter()
        .filter_map(|(key, label)| {
            let vals = values.remove(key)?;
            let joined = if *key == "identifier" {
                vals.into_iter().next().unwrap_or_default()
            } else {
                vals.join(", ")
            };
            Some((*label, joined))
        })
        .collect()
}

/// Manifest as `id → (href, media-type)`; hrefs are percent-decoded.
fn parse_manifest(opf: &str) -> HashMap<String, (String, String)> {
    let mut items = HashMap::new();
    let mut reader = Reader::from_str(opf);

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if local_name(e) == "item" {
                    let (Some(id), Some(href)) = (attr(e, "id"), attr(e, "href")) else {
                        continue;
                    };
                    let media_type = attr(e, "media-type").unwrap_or_default();
                    items.insert(id, (decode_href(&href), media_type));
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    items
}

fn parse_spine(opf: &str) -> Vec<String> {
    let mut idrefs = Vec::new();
    let mut reader = Reader::from_str(opf);
    let mut in_spine = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = local_name(e);
                if local == "spine" {
                    in_spine = true;
                } else if local == "itemref" && in_spine {
                    if let Some(idref) = attr(e, "idref") {
                        idrefs.push(idref);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if e.local_name().as_ref() == b"spine" {
                    in_spine = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    idrefs
}

#[cfg(test)]
mod tests {
    use super::*;

    const OPF: &str = r#"<?xml version="1.0"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>Sample &amp; Co</dc:title>
    <dc:creator>Ada</dc:creator>
    <dc:creator>Grace</dc:creator>
    <dc:language>he</dc:language>
    <dc:identifier id="bookid">urn:uuid:1234</dc:identifier>
    <meta property="dcterms:modified">2024-01-01</meta>
  </metadata>
  <manifest>
    <item id="nav" href="nav.xhtml" media-type="application/xhtml+xml" properties="nav"/>
    <item id="c1" href="Text/chapter%201.xhtml" media-type="application/xhtml+xml"/>
    <item id="css" href="style.css" media-type="text/css"/>
  </manifest>
  <spine>
    <itemref idref="c1"/>
    <itemref idref="missing"/>
    <itemref idref="css"/>
  </spine>
</package>"#;

    #[test]
    fn test_find_rootfile() {
        let xml = r#"<container><rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles></container>"#;
        assert_eq!(find_rootfile(xml).unwrap(), "OEBPS/content.opf");
        assert!(find_rootfile("<container/>").is_err());
    }

    #[test]
    fn test_parse_metadata() {
        let meta = parse_metadata(OPF);
        assert_eq!(
            meta,
            vec![
                ("Title", "Sample & Co".to_string()),
                ("Authors", "Ada, Grace".to_string()),
                ("Language", "he".to_string()),
                ("Identifier", "urn:uuid:1234".to_string()),
            ]
        );
    }

    #[test]
    fn test_manifest_and_spine() {
        let manifest = parse_manifest(OPF);
        assert_eq!(manifest["c1"].0, "Text/chapter 1.xhtml");
        assert_eq!(parse_spine(OPF), vec!["c1", "missing", "css"]);
    }
}
