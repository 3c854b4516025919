//! XML parsing helpers using quick-xml.

use std::collections::HashMap;

use quick_xml::events::BytesStart;
use quick_xml::events::Event;
use quick_xml::Reader;

/// Local (namespace-free) name of an element, e.g. `w:p` → `p`.
pub fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Value of the attribute whose local name is `name`, unescaped.
pub fn attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        if a.key.local_name().as_ref() == name.as_bytes() {
            a.unescape_value()
                .map(|v| v.into_owned())
                .ok()
                .or_else(|| Some(String::from_utf8_lossy(&a.value).into_owned()))
        } else {
            None
        }
    })
}

/// Value of a namespace-prefixed attribute (`r:id`) by local name, ignoring
/// unprefixed attributes that share the local name (`id`).
pub fn namespaced_attr(e: &BytesStart<'_>, name: &str) -> Option<String> {
    e.attributes().flatten().find_map(|a| {
        let key = a.key;
        if key.prefix().is_some() && key.local_name().as_ref() == name.as_bytes() {
            Some(String::from_utf8_lossy(&a.value).into_owned())
        } else {
            None
        }
    })
}

/// Text content of every element with the given local name.
pub fn extract_text(xml: &str, tag_name: &str) -> Vec<String> {
    let mut reader = Reader::from_str(xml);
    let mut results = Vec::new();
    let mut depth_in_target = 0usize;
    let mut buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                if depth_in_target > 0 {
                    depth_in_target += 1;
                } else if local_name(e) == tag_name {
                    depth_in_target = 1;
                    buf.clear();
                }
            }
            Ok(Event::Text(ref e)) if depth_in_target > 0 => {
                if let Ok(text) = e.unescape() {
                    buf.push_str(&text);
                }
            }
            Ok(Event::CData(ref e)) if depth_in_target > 0 => {
                buf.push_str(&String::from_utf8_lossy(e));
            }
            Ok(Event::End(_)) if depth_in_target > 0 => {
                depth_in_target -= 1;
                if depth_in_target == 0 {
                    results.push(buf.trim().to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::debug!("XML error while reading <{}>: {}", tag_name, e);
                break;
            }
            _ => {}
        }
    }
    results
}

/// Attributes (by local name) of every element with the given local name.
pub fn collect_attributes(xml: &str, tag_name: &str) -> Vec<HashMap<String, String>> {
    let mut reader = Reader::from_str(xml);
    let mut found = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if local_name(e) == tag_name {
                    let mut attrs = HashMap::new();
                    for a in e.attributes().flatten() {
                        let key = String::from_utf8_lossy(a.key.local_name().as_ref()).into_owned();
                        let value = a
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_else(|_| String::from_utf8_lossy(&a.value).into_owned());
                        attrs.insert(key, value);
                    }
                    found.push(attrs);
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    found
}

/// Attributes of the first element with the given local name.
pub fn extract_attributes(xml: &str, tag_name: &str) -> Option<HashMap<String, String>> {
    collect_attributes(xml, tag_name).into_iter().next()
}

/// Parse an OOXML/OPC relationships part into `Id → Target`.
pub fn parse_relationships(xml: &str) -> HashMap<String, String> {
    collect_attributes(xml, "Relationship")
        .into_iter()
        .filter_map(|mut attrs| {
            let id = attrs.remove("Id")?;
            let target = attrs.remove("Target")?;
            Some((id, target))
        })
        .collect()
}
