//! Page-by-page text extraction.

use std::path::Path;

use lopdf::Document;

use convert_core::error::{ConvertError, Result};

use crate::reflow::reflow;

/// Extract the text of every page of a PDF as Markdown paragraphs.
///
/// Pages come out in page order separated by a blank line. Pages whose text
/// cannot be decoded are skipped with a warning; the document only fails when
/// no page yields text.
pub fn extract_pdf(path: &Path) -> Result<String> {
    let doc = Document::load(path)
        .map_err(|e| ConvertError::Pdf(format!("Failed to load PDF: {}", e)))?;

    if doc.is_encrypted() {
        return Err(ConvertError::Extraction(
            "PDF is encrypted and cannot be read".to_string(),
        ));
    }

    // BTreeMap keys: already in page order
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
    log::debug!("PDF has {} pages", page_numbers.len());

    let mut pages = Vec::with_capacity(page_numbers.len());
    let mut failures = 0usize;
    for number in &page_numbers {
        match doc.extract_text(&[*number]) {
            Ok(text) => {
                let text = reflow(&text);
                if !text.is_empty() {
                    pages.push(text);
                }
            }
            Err(e) => {
                failures += 1;
                log::warn!("Skipping page {} of {}: {}", number, path.display(), e);
            }
        }
    }

    if !page_numbers.is_empty() && failures == page_numbers.len() {
        return Err(ConvertError::Extraction(format!(
            "No page of {} could be read",
            path.display()
        )));
    }

    Ok(pages.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    /// Write a PDF with one page per entry of `pages`, each entry being the
    /// lines drawn on that page.
    fn write_pdf(path: &Path, pages: &[&[&str]]) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids = Vec::new();
        for lines in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("TL", vec![14.into()]),
                Operation::new("Td", vec![72.into(), 760.into()]),
            ];
            for line in lines.iter() {
                operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
                operations.push(Operation::new("T*", vec![]));
            }
            operations.push(Operation::new("ET", vec![]));
            let content = Content { operations };
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).unwrap();
    }

    #[test]
    fn test_pages_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        write_pdf(&path, &[&["First page"], &["Second page"]]);

        let md = extract_pdf(&path).unwrap();
        let first = md.find("First page").unwrap();
        let second = md.find("Second page").unwrap();
        assert!(first < second);
        assert!(md[first..second].contains("\n\n"));
    }

    #[test]
    fn test_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, "plain text pretending").unwrap();

        let err = extract_pdf(&path).unwrap_err();
        assert!(matches!(err, ConvertError::Pdf(_)));
    }

    #[test]
    fn test_plugin_reads_pdf() {
        use convert_core::options::ConversionOptions;
        use convert_core::plugin::{ExtractContext, InputPlugin};
        use convert_core::registry::PluginRegistry;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.pdf");
        write_pdf(&path, &[&["Quarterly memo"]]);

        let options = ConversionOptions::default();
        let registry = PluginRegistry::new();
        let ctx = ExtractContext::new(&options, &registry);
        let md = crate::PdfInputPlugin.convert(&path, &ctx).unwrap();
        assert!(md.contains("Quarterly memo"));
    }
}
