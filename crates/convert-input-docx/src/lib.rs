//! DOCX input plugin — converts Word documents to Markdown.
//!
//! DOCX is a ZIP archive containing Office Open XML. This plugin:
//! - Resolves heading levels from `word/styles.xml`
//! - Resolves bullet vs. numbered lists from `word/numbering.xml`
//! - Converts `word/document.xml` paragraphs, runs and tables
//! - Resolves image and hyperlink targets from the document relationships

mod document;
mod styles;

use std::collections::HashMap;
use std::path::Path;

use convert_core::error::{ConvertError, Result};
use convert_core::format::DocumentFormat;
use convert_core::plugin::{ExtractContext, InputPlugin};
use convert_utils::archive::ZipPackage;
use convert_utils::xml::parse_relationships;

pub struct DocxInputPlugin;

impl InputPlugin for DocxInputPlugin {
    fn name(&self) -> &str {
        "DOCX Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Docx]
    }

    fn convert(&self, input_path: &Path, _ctx: &ExtractContext<'_>) -> Result<String> {
        log::debug!("Reading DOCX: {}", input_path.display());
        parse_docx(input_path)
    }
}

fn parse_docx(path: &Path) -> Result<String> {
    let mut pkg = ZipPackage::open(path)
        .map_err(|e| ConvertError::Extraction(format!("Invalid DOCX ZIP: {}", e)))?;

    let doc_xml = pkg
        .read_optional("word/document.xml")?
        .ok_or_else(|| ConvertError::Extraction("Missing word/document.xml".to_string()))?;

    let rels = pkg
        .read_optional("word/_rels/document.xml.rels")?
        .map(|xml| parse_relationships(&xml))
        .unwrap_or_default();

    let style_map = pkg
        .read_optional("word/styles.xml")?
        .map(|xml| styles::parse_styles(&xml))
        .unwrap_or_else(HashMap::new);

    let numbering = pkg
        .read_optional("word/numbering.xml")?
        .map(|xml| styles::parse_numbering(&xml))
        .unwrap_or_default();

    let markdown = document::convert_document(&doc_xml, &rels, &style_map, &numbering);
    log::debug!(
        "Parsed DOCX: {} styles, {} relationships",
        style_map.len(),
        rels.len()
    );
    Ok(markdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use convert_core::options::ConversionOptions;
    use convert_core::registry::PluginRegistry;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_docx(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        for (name, body) in entries {
            zip.start_file(*name, SimpleFileOptions::default()).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_docx_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        write_docx(
            &path,
            &[
                (
                    "word/document.xml",
                    r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:pStyle w:val="Title1"/></w:pPr><w:r><w:t>שלום עולם</w:t></w:r></w:p>
<w:p><w:r><w:t>English paragraph.</w:t></w:r></w:p>
</w:body></w:document>"#,
                ),
                (
                    "word/styles.xml",
                    r#"<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:styleId="Title1"><w:name w:val="heading 2"/></w:style></w:styles>"#,
                ),
            ],
        );

        let registry = PluginRegistry::new().with(Box::new(DocxInputPlugin));
        let md = registry.extract(&path, &ConversionOptions::default()).unwrap();
        assert_eq!(md, "## שלום עולם\n\nEnglish paragraph.\n");
    }

    #[test]
    fn test_docx_without_document_part() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.docx");
        write_docx(&path, &[("docProps/core.xml", "<cp:coreProperties/>")]);

        let registry = PluginRegistry::new().with(Box::new(DocxInputPlugin));
        let err = registry
            .extract(&path, &ConversionOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("word/document.xml"));
    }
}
