//! Format → input plugin dispatch.

use std::path::Path;

use crate::error::{ConvertError, Result};
use crate::format::{DocumentFormat, DocumentRef};
use crate::markdown;
use crate::options::ConversionOptions;
use crate::plugin::{ExtractContext, InputPlugin};

/// The set of input plugins available to the extractor.
///
/// Plugins registered later win when two claim the same format.
#[derive(Default)]
pub struct PluginRegistry {
    plugins: Vec<Box<dyn InputPlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, plugin: Box<dyn InputPlugin>) {
        log::debug!("Registered input plugin: {}", plugin.name());
        self.plugins.push(plugin);
    }

    /// Builder-style variant of [`register`](Self::register).
    pub fn with(mut self, plugin: Box<dyn InputPlugin>) -> Self {
        self.register(plugin);
        self
    }

    /// Find the plugin handling `format`.
    pub fn plugin_for(&self, format: DocumentFormat) -> Option<&dyn InputPlugin> {
        self.plugins
            .iter()
            .rev()
            .find(|p| p.supported_formats().contains(&format))
            .map(|p| p.as_ref())
    }

    /// Whether a file with this path's extension can be converted.
    pub fn supports(&self, path: &Path) -> bool {
        DocumentFormat::from_path(path)
            .map(|f| self.plugin_for(f).is_some())
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Extract Markdown from a top-level document.
    pub fn extract(&self, path: &Path, options: &ConversionOptions) -> Result<String> {
        let ctx = ExtractContext::new(options, self);
        self.extract_with(path, &ctx)
    }

    /// Extract Markdown using an existing context (used for nested documents).
    pub fn extract_with(&self, path: &Path, ctx: &ExtractContext<'_>) -> Result<String> {
        let doc = DocumentRef::new(path);
        let format = doc.format.ok_or_else(|| {
            let ext = path
                .extension()
                .map(|e| format!(".{}", e.to_string_lossy()))
                .unwrap_or_else(|| "(no extension)".to_string());
            ConvertError::UnsupportedFormat(format!("{} ({})", ext, doc.display_name()))
        })?;

        let plugin = self.plugin_for(format).ok_or_else(|| {
            ConvertError::UnsupportedFormat(format!("no plugin for {} ({})", format, doc.display_name()))
        })?;

        log::debug!("Running {} on {}", plugin.name(), path.display());
        let raw = plugin.convert(path, ctx)?;
        Ok(markdown::normalize(&raw))
    }
}
