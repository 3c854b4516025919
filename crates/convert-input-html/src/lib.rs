//! HTML input plugin — walks the parsed DOM and emits Markdown.
//!
//! The converter is also used by the EPUB plugin for spine documents.

mod convert;

use std::path::Path;

use convert_core::error::Result;
use convert_core::format::DocumentFormat;
use convert_core::plugin::{ExtractContext, InputPlugin};
use convert_utils::encoding::decode_text;

pub use convert::html_to_markdown;

pub struct HtmlInputPlugin;

impl InputPlugin for HtmlInputPlugin {
    fn name(&self) -> &str {
        "HTML Input"
    }

    fn supported_formats(&self) -> &[DocumentFormat] {
        &[DocumentFormat::Html]
    }

    fn convert(&self, input_path: &Path, ctx: &ExtractContext<'_>) -> Result<String> {
        log::debug!("Reading HTML: {}", input_path.display());
        let bytes = std::fs::read(input_path)?;
        let html = decode_text(&bytes, ctx.options.input_encoding.as_deref());
        Ok(html_to_markdown(&html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convert_core::options::ConversionOptions;
    use convert_core::registry::PluginRegistry;

    #[test]
    fn test_plugin_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        std::fs::write(
            &path,
            "<html><head><title>Ignored</title></head><body><h2>שלום</h2><p>Hello there</p></body></html>",
        )
        .unwrap();

        let registry = PluginRegistry::new().with(Box::new(HtmlInputPlugin));
        let md = registry.extract(&path, &ConversionOptions::default()).unwrap();
        assert_eq!(md, "## שלום\n\nHello there\n");
    }
}
