//! PPTX input plugin — slides in presentation order, each introduced by a
//! `<!-- Slide number: N -->` marker, followed by speaker notes.

mod slide;

use std::path::Path;

use convert_core::error::{ConvertError, Result};
use convert_core::format::DocumentFormat;
use convert_core::plugin::{ExtractContext, InputPlugin};
use convert_utils::archive::{rels_path_for, resolve_part, ZipPackage};
use convert_utils::markdown::pipe_table;
use convert_utils::xml::parse_relationships;

use crate::slide::SlideShape;

const PRESENTATION_PART: &str = "ppt/presentation.xml";

pub struct PptxInputPlugin;

impl InputPlugin for PptxInputPlugin {
    fn name(&self) -> &str {
        "PPTX Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Pptx]
    }

    fn convert(&self, input_path: &Path, _ctx: &ExtractContext<'_>) -> Result<String> {
        log::debug!("Reading PPTX: {}", input_path.display());

        let mut pkg = ZipPackage::open(input_path)
            .map_err(|e| ConvertError::Extraction(format!("Invalid PPTX ZIP: {}", e)))?;
        let presentation = pkg
            .read_optional(PRESENTATION_PART)?
            .ok_or_else(|| ConvertError::Extraction(format!("Missing {}", PRESENTATION_PART)))?;
        let rels = pkg
            .read_optional(&rels_path_for(PRESENTATION_PART))?
            .map(|xml| parse_relationships(&xml))
            .unwrap_or_default();

        let mut slides_md = Vec::new();
        for (idx, rid) in slide::parse_slide_order(&presentation).iter().enumerate() {
            let Some(target) = rels.get(rid) else {
                log::warn!("Slide relationship {} not found", rid);
                continue;
            };
            let part = resolve_part(PRESENTATION_PART, target);
            match convert_slide(&mut pkg, &part, idx + 1) {
                Ok(md) => slides_md.push(md),
                Err(e) => log::warn!("Skipping slide {} ({}): {}", idx + 1, part, e),
            }
        }

        Ok(slides_md.join("\n\n"))
    }
}

fn convert_slide(pkg: &mut ZipPackage, part: &str, number: usize) -> std::io::Result<String> {
    let xml = pkg.read_string(part)?;
    let mut blocks = vec![format!("<!-- Slide number: {} -->", number)];

    for shape in slide::parse_slide(&xml) {
        let is_title = shape.is_title();
        match shape {
            SlideShape::Text { text, .. } if is_title => {
                blocks.push(format!("# {}", text.replace('\n', " ")));
            }
            SlideShape::Text { text, .. } => blocks.push(text),
            SlideShape::Picture { name, alt } => {
                let file: String = name.chars().filter(|c| c.is_alphanumeric() || *c == '_').collect();
                blocks.push(format!("![{}]({}.jpg)", alt, file));
            }
            SlideShape::Table(rows) => blocks.push(pipe_table(&rows).trim_end().to_string()),
        }
    }

    if let Some(notes) = slide_notes(pkg, part)? {
        blocks.push(format!("### Notes:\n{}", notes));
    }

    Ok(blocks.join("\n\n"))
}

/// Body text of the notes slide linked from `slide_part`, if any.
fn slide_notes(pkg: &mut ZipPackage, slide_part: &str) -> std::io::Result<Option<String>> {
    let Some(rels_xml) = pkg.read_optional(&rels_path_for(slide_part))? else {
        return Ok(None);
    };
    let rels = parse_relationships(&rels_xml);
    let Some(target) = rels.values().find(|t| t.contains("notesSlide")) else {
        return Ok(None);
    };
    let notes_part = resolve_part(slide_part, target);
    let Some(notes_xml) = pkg.read_optional(&notes_part)? else {
        return Ok(None);
    };

    let text: Vec<String> = slide::parse_slide(&notes_xml)
        .into_iter()
        .filter_map(|shape| match shape {
            SlideShape::Text {
                placeholder: Some(p),
                text,
            } if p == "body" => Some(text),
            _ => None,
        })
        .collect();
    Ok((!text.is_empty()).then(|| text.join("\n")))
}
