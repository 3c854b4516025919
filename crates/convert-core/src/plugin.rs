//! Plugin traits for input extractors and output renderers.

use std::path::Path;

use crate::error::Result;
use crate::format::DocumentFormat;
use crate::options::ConversionOptions;
use crate::registry::PluginRegistry;

/// Progress reporter callback type.
pub type ProgressReporter = Box<dyn Fn(f64, &str) + Send + Sync>;

/// Everything an input plugin may need besides the file itself.
///
/// Container formats (ZIP) use `registry` to convert their entries and
/// bump `depth` when they do.
pub struct ExtractContext<'a> {
    pub options: &'a ConversionOptions,
    pub registry: &'a PluginRegistry,
    pub depth: usize,
}

impl<'a> ExtractContext<'a> {
    pub fn new(options: &'a ConversionOptions, registry: &'a PluginRegistry) -> Self {
        Self {
            options,
            registry,
            depth: 0,
        }
    }

    /// Context for a document found inside the current one.
    pub fn nested(&self) -> ExtractContext<'a> {
        ExtractContext {
            options: self.options,
            registry: self.registry,
            depth: self.depth + 1,
        }
    }
}

/// Input format plugin: converts a file into Markdown text.
pub trait InputPlugin: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// File formats this plugin handles.
    fn supported_formats(&self) -> &[DocumentFormat];

    /// Convert an input file to Markdown.
    fn convert(&self, input_path: &Path, ctx: &ExtractContext<'_>) -> Result<String>;
}

/// Output plugin: renders Markdown text into a target file.
pub trait OutputPlugin: Send + Sync {
    /// Human-readable name of this plugin.
    fn name(&self) -> &str;

    /// File extension of the produced files, without the dot.
    fn extension(&self) -> &str;

    /// Render `markdown` and write the result to `output_path`.
    fn convert(
        &self,
        markdown: &str,
        output_path: &Path,
        options: &ConversionOptions,
    ) -> Result<()>;
}
