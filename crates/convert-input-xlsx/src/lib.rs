//! XLSX input plugin — every worksheet becomes a `##` section with a pipe table.

mod sheet;
mod workbook;

use std::path::Path;

use convert_core::error::{ConvertError, Result};
use convert_core::format::DocumentFormat;
use convert_core::plugin::{ExtractContext, InputPlugin};
use convert_utils::archive::{resolve_part, ZipPackage};
use convert_utils::markdown::pipe_table;
use convert_utils::xml::parse_relationships;

const WORKBOOK_PART: &str = "xl/workbook.xml";

pub struct XlsxInputPlugin;

impl InputPlugin for XlsxInputPlugin {
    fn name(&self) -> &str {
        "XLSX Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Xlsx]
    }

    fn convert(&self, input_path: &Path, _ctx: &ExtractContext<'_>) -> Result<String> {
        log::debug!("Reading XLSX: {}", input_path.display());

        let mut pkg = ZipPackage::open(input_path)
            .map_err(|e| ConvertError::Extraction(format!("Invalid XLSX ZIP: {}", e)))?;

        let workbook = pkg
            .read_optional(WORKBOOK_PART)?
            .ok_or_else(|| ConvertError::Extraction(format!("Missing {}", WORKBOOK_PART)))?;
        let rels = pkg
            .read_optional("xl/_rels/workbook.xml.rels")?
            .map(|xml| parse_relationships(&xml))
            .unwrap_or_default();
        let shared = pkg
            .read_optional("xl/sharedStrings.xml")?
            .map(|xml| workbook::parse_shared_strings(&xml))
            .unwrap_or_default();

        let mut sections = Vec::new();
        for sheet_ref in workbook::parse_sheets(&workbook) {
            let Some(target) = rels.get(&sheet_ref.rel_id) else {
                log::warn!("Sheet '{}' has no relationship target", sheet_ref.name);
                continue;
            };
            let part = resolve_part(WORKBOOK_PART, target);
            let xml = match pkg.read_string(&part) {
                Ok(xml) => xml,
                Err(e) => {
                    log::warn!("Skipping sheet '{}' ({}): {}", sheet_ref.name, part, e);
                    continue;
                }
            };

            let rows = sheet::parse_sheet(&xml, &shared);
            let mut section = format!("## {}", sheet_ref.name);
            if !rows.is_empty() {
                section.push_str("\n\n");
                section.push_str(pipe_table(&rows).trim_end());
            }
            sections.push(section);
        }

        Ok(sections.join("\n\n"))
    }
}
