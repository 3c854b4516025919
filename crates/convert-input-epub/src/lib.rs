//! EPUB input plugin — metadata block followed by the spine documents.

mod parser;

use std::path::Path;

use convert_core::error::{ConvertError, Result};
use convert_core::format::DocumentFormat;
use convert_core::plugin::{ExtractContext, InputPlugin};
use convert_input_html::html_to_markdown;
use convert_utils::archive::ZipPackage;

pub struct EpubInputPlugin;

impl InputPlugin for EpubInputPlugin {
    fn name(&self) -> &str {
        "EPUB Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Epub]
    }

    fn convert(&self, input_path: &Path, _ctx: &ExtractContext<'_>) -> Result<String> {
        log::debug!("Reading EPUB: {}", input_path.display());

        let mut pkg = ZipPackage::open(input_path)
            .map_err(|e| ConvertError::Extraction(format!("Invalid EPUB archive: {}", e)))?;
        let epub = parser::parse_package(&mut pkg)?;

        let mut sections = Vec::new();
        let header: Vec<String> = epub
            .metadata
            .iter()
            .map(|(label, value)| format!("**{}:** {}", label, value))
            .collect();
        if !header.is_empty() {
            sections.push(header.join("\n"));
        }

        for part in &epub.spine {
            match pkg.read_string(part) {
                Ok(html) => {
                    let md = html_to_markdown(&html);
                    if !md.trim().is_empty() {
                        sections.push(md);
                    }
                }
                Err(e) => log::warn!("Skipping unreadable spine document {}: {}", part, e),
            }
        }

        log::debug!("EPUB: {} spine documents", epub.spine.len());
        Ok(sections.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convert_core::options::ConversionOptions;
    use convert_core::registry::PluginRegistry;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn write_epub(path: &Path) {
        let mut zip = zip::ZipWriter::new(std::fs::File::create(path).unwrap());
        let opts = SimpleFileOptions::default();
        let files: &[(&str, &str)] = &[
            ("mimetype", "application/epub+zip"),
            (
                "META-INF/container.xml",
                r#"<?xml version="1.0"?><container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container"><rootfiles><rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/></rootfiles></container>"#,
            ),
            (
                "OEBPS/content.opf",
                r#"<?xml version="1.0"?><package xmlns="http://www.idpf.org/2007/opf"><metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Tiny Book</dc:title><dc:creator>Noa</dc:creator></metadata><manifest><item id="a" href="text/a.xhtml" media-type="application/xhtml+xml"/><item id="b" href="text/b.xhtml" media-type="application/xhtml+xml"/></manifest><spine><itemref idref="b"/><itemref idref="a"/></spine></package>"#,
            ),
            (
                "OEBPS/text/a.xhtml",
                r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>A</title></head><body><h1>Second</h1><p>Body A</p></body></html>"#,
            ),
            (
                "OEBPS/text/b.xhtml",
                r#"<html xmlns="http://www.w3.org/1999/xhtml"><head><title>B</title></head><body><h1>First</h1></body></html>"#,
            ),
        ];
        for (name, body) in files {
            zip.start_file(*name, opts).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_epub_to_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.epub");
        write_epub(&path);

        let registry = PluginRegistry::new().with(Box::new(EpubInputPlugin));
        let md = registry.extract(&path, &ConversionOptions::default()).unwrap();
        assert_eq!(
            md,
            "**Title:** Tiny Book\n**Authors:** Noa\n\n# First\n\n# Second\n\nBody A\n"
        );
    }

    #[test]
    fn test_not_an_epub() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.epub");
        std::fs::write(&path, b"plain text").unwrap();

        let registry = PluginRegistry::new().with(Box::new(EpubInputPlugin));
        let err = registry
            .extract(&path, &ConversionOptions::default())
            .unwrap_err();
        assert!(matches!(err, ConvertError::Extraction(_)));
    }
}
