//! PDF output plugin: draws Markdown with per-line text direction.
//!
//! Lines are classified by their leading Markdown syntax, wrapped against the
//! advance widths of a system Unicode font, reordered with the Unicode
//! Bidirectional Algorithm and anchored at the left or right margin.

pub mod bidi;
pub mod fonts;
pub mod layout;
pub mod markdown;
mod page;

use std::path::Path;

use convert_core::error::{ConvertError, Result};
use convert_core::options::ConversionOptions;
use convert_core::plugin::OutputPlugin;

use crate::fonts::FontSet;
use crate::layout::{compose, PageGeometry};

pub struct PdfOutputPlugin;

impl OutputPlugin for PdfOutputPlugin {
    fn name(&self) -> &str {
        "PDF Output"
    }

    fn extension(&self) -> &str {
        "pdf"
    }

    fn convert(
        &self,
        markdown: &str,
        output_path: &Path,
        options: &ConversionOptions,
    ) -> Result<()> {
        log::debug!("Writing PDF: {}", output_path.display());
        render_with(markdown, output_path, options)
    }
}

/// Render `markdown` to a PDF at `destination` with default options.
pub fn render(markdown: &str, destination: &Path) -> Result<()> {
    render_with(markdown, destination, &ConversionOptions::default())
}

/// Render `markdown` to a PDF at `destination`.
///
/// Fails with `FontLoad` when no usable Unicode font is found and with
/// `Write` when the destination cannot be created.
pub fn render_with(markdown: &str, destination: &Path, options: &ConversionOptions) -> Result<()> {
    let fonts = FontSet::discover(options)?;
    let geometry = PageGeometry::a4(options);
    let layouts = compose(markdown, &fonts, &geometry);
    log::debug!("Composed {} page(s)", layouts.len());

    let title = destination
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Document");
    let bytes = page::build_pdf(title, &layouts, &fonts, &geometry)?;

    std::fs::write(destination, bytes).map_err(|e| ConvertError::write(destination, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fonts_available() -> bool {
        FontSet::discover(&ConversionOptions::default()).is_ok()
    }

    #[test]
    fn test_render_mixed_document() {
        if !fonts_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("mixed.pdf");
        let md = "# Report\n\nשלום עולם\n\n- item **one**\n- פריט\n\n> quoted\n\n```\nlet x = 1;\n```\n\n---\n";
        render(md, &out).unwrap();

        let data = std::fs::read(&out).unwrap();
        assert_eq!(&data[..5], b"%PDF-");
    }

    /// Drop the contents of `(D:...)` date strings.
    fn without_dates(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::with_capacity(data.len());
        let mut i = 0;
        while i < data.len() {
            if data[i..].starts_with(b"(D:") {
                match data[i..].iter().position(|&b| b == b')') {
                    Some(end) => {
                        out.extend_from_slice(b"()");
                        i += end + 1;
                        continue;
                    }
                    None => break,
                }
            }
            out.push(data[i]);
            i += 1;
        }
        out
    }

    #[test]
    fn test_render_is_byte_stable() {
        if !fonts_available() {
            return;
        }
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        let md = "## שלום\n\nQuarterly report for **2024**\n\n- פריט one\n";
        render(md, &first.path().join("report.pdf")).unwrap();
        render(md, &second.path().join("report.pdf")).unwrap();

        let a = std::fs::read(first.path().join("report.pdf")).unwrap();
        let b = std::fs::read(second.path().join("report.pdf")).unwrap();
        assert_eq!(a.len(), b.len());
        assert!(without_dates(&a) == without_dates(&b));
    }

    #[test]
    fn test_render_empty_markdown() {
        if !fonts_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("empty.pdf");
        PdfOutputPlugin
            .convert("", &out, &ConversionOptions::default())
            .unwrap();
        assert!(out.is_file());
    }

    #[test]
    fn test_unwritable_destination() {
        if !fonts_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("missing").join("deeper").join("x.pdf");
        let err = render("text", &out).unwrap_err();
        assert!(matches!(err, ConvertError::Write { .. }));
    }

    #[test]
    fn test_missing_font_is_font_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = ConversionOptions::default();
        options.font_path = Some(dir.path().join("nope.ttf"));
        let err = render_with("text", &dir.path().join("x.pdf"), &options).unwrap_err();
        assert!(matches!(err, ConvertError::FontLoad(_)));
        assert!(!dir.path().join("x.pdf").exists());
    }
}
