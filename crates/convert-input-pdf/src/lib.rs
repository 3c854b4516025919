//! PDF input plugin: page text via lopdf, reflowed into Markdown paragraphs.

mod extract;
mod reflow;

use std::path::Path;

use convert_core::error::Result;
use convert_core::format::DocumentFormat;
use convert_core::plugin::{ExtractContext, InputPlugin};

pub use extract::extract_pdf;

pub struct PdfInputPlugin;

impl InputPlugin for PdfInputPlugin {
    fn name(&self) -> &str {
        "PDF Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Pdf]
    }

    fn convert(&self, input_path: &Path, _ctx: &ExtractContext<'_>) -> Result<String> {
        log::debug!("Reading PDF: {}", input_path.display());
        extract::extract_pdf(input_path)
    }
}
