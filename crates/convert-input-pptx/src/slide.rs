//! Slide XML → shapes in document order.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use convert_utils::xml::{attr, local_name, namespaced_attr};

/// Content pulled from one shape of a slide.
#[derive(Debug, Clone, PartialEq)]
pub enum SlideShape {
    Text {
        placeholder: Option<String>,
        text: String,
    },
    Picture {
        name: String,
        alt: String,
    },
    Table(Vec<Vec<String>>),
}

impl SlideShape {
    pub fn is_title(&self) -> bool {
        matches!(
            self,
            SlideShape::Text { placeholder: Some(p), .. } if p == "title" || p == "ctrTitle"
        )
    }
}

#[derive(Default)]
struct TextShape {
    placeholder: Option<String>,
    paragraphs: Vec<String>,
}

#[derive(Default)]
struct ParseState {
    shapes: Vec<SlideShape>,
    text_shape: Option<TextShape>,
    picture: Option<(String, String)>,
    table: Option<Vec<Vec<String>>>,
    row: Vec<String>,
    cell: Vec<String>,
    paragraph: String,
    in_text: bool,
}

impl ParseState {
    fn start(&mut self, local: &str, e: &BytesStart<'_>) {
        match local {
            "sp" => self.text_shape = Some(TextShape::default()),
            "ph" => {
                if let Some(shape) = self.text_shape.as_mut() {
                    // A placeholder without a type is a body/object placeholder
                    shape.placeholder = Some(attr(e, "type").unwrap_or_else(|| "body".to_string()));
                }
            }
            "pic" => self.picture = Some((String::new(), String::new())),
            "cNvPr" => {
                if let Some(pic) = self.picture.as_mut() {
                    pic.0 = attr(e, "name").unwrap_or_default();
                    pic.1 = attr(e, "descr").unwrap_or_default();
                }
            }
            "tbl" => self.table = Some(Vec::new()),
            "tr" => self.row.clear(),
            "tc" => self.cell.clear(),
            "p" => self.paragraph.clear(),
            "t" => self.in_text = true,
            "br" => self.paragraph.push('\n'),
            _ => {}
        }
    }

    fn end(&mut self, local: &str) {
        match local {
            "t" => self.in_text = false,
            "p" => {
                let para = std::mem::take(&mut self.paragraph);
                let para = para.trim_end().to_string();
                if self.table.is_some() {
                    self.cell.push(para);
                } else if let Some(shape) = self.text_shape.as_mut() {
                    shape.paragraphs.push(para);
                }
            }
            "tc" => {
                let text = std::mem::take(&mut self.cell).join("\n");
                self.row.push(text.trim().to_string());
            }
            "tr" => {
                if let Some(table) = self.table.as_mut() {
                    table.push(std::mem::take(&mut self.row));
                }
            }
            "tbl" => {
                if let Some(rows) = self.table.take() {
                    if !rows.is_empty() {
                        self.shapes.push(SlideShape::Table(rows));
                    }
                }
            }
            "sp" => {
                if let Some(shape) = self.text_shape.take() {
                    let text = shape.paragraphs.join("\n").trim().to_string();
                    if !text.is_empty() {
                        self.shapes.push(SlideShape::Text {
                            placeholder: shape.placeholder,
                            text,
                        });
                    }
                }
            }
            "pic" => {
                if let Some((name, alt)) = self.picture.take() {
                    self.shapes.push(SlideShape::Picture { name, alt });
                }
            }
            _ => {}
        }
    }
}

/// Parse a slide (or notes slide) part into its shapes.
pub fn parse_slide(xml: &str) -> Vec<SlideShape> {
    let mut reader = Reader::from_str(xml);
    let mut state = ParseState::default();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => state.start(&local_name(e), e),
            Ok(Event::Empty(ref e)) => {
                let local = local_name(e);
                state.start(&local, e);
                state.end(&local);
            }
            Ok(Event::Text(ref t)) if state.in_text => {
                if let Ok(s) = t.unescape() {
                    state.paragraph.push_str(&s);
                }
            }
            Ok(Event::End(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().as_ref()).into_owned();
                state.end(&local);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                log::warn!("slide parse error: {}", e);
                break;
            }
            _ => {}
        }
    }

    state.shapes
}

/// Slide relationship ids from `ppt/presentation.xml`, in presentation order.
pub fn parse_slide_order(xml: &str) -> Vec<String> {
    let mut ids = Vec::new();
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                if local_name(e) == "sldId" {
                    if let Some(rid) = namespaced_attr(e, "id") {
                        ids.push(rid);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(_) => break,
            _ => {}
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDE: &str = r#"<p:sld xmlns:p="p" xmlns:a="a" xmlns:r="r"><p:cSld><p:spTree>
<p:sp><p:nvSpPr><p:cNvPr id="2" name="Title 1"/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr>
  <p:txBody><a:p><a:r><a:t>Quarterly </a:t></a:r><a:r><a:t>Review</a:t></a:r></a:p></p:txBody></p:sp>
<p:sp><p:nvSpPr><p:cNvPr id="3" name="Content"/><p:nvPr><p:ph idx="1"/></p:nvPr></p:nvSpPr>
  <p:txBody><a:p><a:r><a:t>First point</a:t></a:r></a:p><a:p><a:r><a:t>Second</a:t></a:r><a:br/><a:r><a:t>line</a:t></a:r></a:p></p:txBody></p:sp>
<p:pic><p:nvPicPr><p:cNvPr id="4" name="Picture 3" descr="Sales chart"/></p:nvPicPr></p:pic>
<p:graphicFrame><a:graphic><a:graphicData><a:tbl>
  <a:tr><a:tc><a:txBody><a:p><a:r><a:t>Q</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>Total</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
  <a:tr><a:tc><a:txBody><a:p><a:r><a:t>1</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p/></a:txBody></a:tc></a:tr>
</a:tbl></a:graphicData></a:graphic></p:graphicFrame>
</p:spTree></p:cSld></p:sld>"#;

    #[test]
    fn test_parse_slide_shapes() {
        let shapes = parse_slide(SLIDE);
        assert_eq!(shapes.len(), 4);
        assert!(shapes[0].is_title());
        assert_eq!(
            shapes[0],
            SlideShape::Text {
                placeholder: Some("title".to_string()),
                text: "Quarterly Review".to_string()
            }
        );
        assert_eq!(
            shapes[1],
            SlideShape::Text {
                placeholder: Some("body".to_string()),
                text: "First point\nSecond\nline".to_string()
            }
        );
        assert_eq!(
            shapes[2],
            SlideShape::Picture {
                name: "Picture 3".to_string(),
                alt: "Sales chart".to_string()
            }
        );
        assert_eq!(
            shapes[3],
            SlideShape::Table(vec![
                vec!["Q".to_string(), "Total".to_string()],
                vec!["1".to_string(), String::new()],
            ])
        );
    }

    #[test]
    fn test_parse_slide_order() {
        let xml = r#"<p:presentation xmlns:p="p" xmlns:r="r"><p:sldIdLst><p:sldId id="257" r:id="rId3"/><p:sldId id="256" r:id="rId2"/></p:sldIdLst></p:presentation>"#;
        assert_eq!(parse_slide_order(xml), vec!["rId3", "rId2"]);
    }
}
