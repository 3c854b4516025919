//! Pipeline orchestrator — runs extraction and rendering over files.
//!
//! For every input file the pipeline runs two phases:
//!   Phase 1: Input plugin → Markdown → `<stem>.md` (unless disabled)
//!   Phase 2: Output plugin → `<stem>.<ext>` (when an output plugin is set)
//!
//! Files are processed one at a time. A failing file is logged and recorded
//! in the [`BatchReport`]; the remaining files still run.

use std::path::{Path, PathBuf};

use log::{error, info, warn};

use crate::error::{ConvertError, Result};
use crate::format::{DocumentFormat, DocumentRef};
use crate::options::ConversionOptions;
use crate::plugin::{OutputPlugin, ProgressReporter};
use crate::registry::PluginRegistry;

/// The conversion pipeline orchestrator.
pub struct Pipeline {
    registry: PluginRegistry,
    output_plugin: Option<Box<dyn OutputPlugin>>,
    write_markdown: bool,
    copy_pdf_inputs: bool,
    progress_reporter: Option<ProgressReporter>,
}

/// What happened to one input file.
#[derive(Debug, Clone, Default)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub markdown_path: Option<PathBuf>,
    pub rendered_path: Option<PathBuf>,
    /// Extraction or Markdown write failure; nothing else was attempted.
    pub error: Option<String>,
    /// Rendering failure; the Markdown file (if any) was still written.
    pub render_error: Option<String>,
}

impl FileOutcome {
    fn new(source: &Path) -> Self {
        Self {
            source: source.to_path_buf(),
            ..Default::default()
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.render_error.is_none()
    }
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<FileOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(FileOutcome::is_success)
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }
}

impl Pipeline {
    pub fn new(registry: PluginRegistry) -> Self {
        Self {
            registry,
            output_plugin: None,
            write_markdown: true,
            copy_pdf_inputs: false,
            progress_reporter: None,
        }
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    /// Convert a file or every file of a directory into `output_dir`.
    pub fn run(
        &self,
        source: &Path,
        output_dir: &Path,
        options: &ConversionOptions,
    ) -> Result<BatchReport> {
        if source.is_dir() {
            self.convert_directory(source, output_dir, options)
        } else if source.is_file() {
            std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::write(output_dir, e))?;
            let outcome = self.convert_file(source, output_dir, options);
            Ok(BatchReport {
                outcomes: vec![outcome],
            })
        } else {
            Err(ConvertError::SourceNotFound(source.to_path_buf()))
        }
    }

    /// Convert every regular file directly inside `input_dir`, in name order.
    pub fn convert_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        options: &ConversionOptions,
    ) -> Result<BatchReport> {
        std::fs::create_dir_all(output_dir).map_err(|e| ConvertError::write(output_dir, e))?;

        let mut files: Vec<PathBuf> = std::fs::read_dir(input_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut report = BatchReport::default();
        if files.is_empty() {
            warn!(
                "No files found in {}. Place documents there and re-run.",
                input_dir.display()
            );
            return Ok(report);
        }

        let total = files.len();
        for (idx, src) in files.iter().enumerate() {
            let name = DocumentRef::new(src).display_name();
            self.report_progress(idx as f64 / total as f64, &format!("Converting {}", name));
            report.outcomes.push(self.convert_file(src, output_dir, options));
        }
        self.report_progress(1.0, "Batch complete");

        info!(
            "Converted {} of {} files ({} failed)",
            report.succeeded(),
            total,
            report.failed()
        );
        Ok(report)
    }

    /// Convert one file. Never fails; problems are recorded in the outcome.
    pub fn convert_file(
        &self,
        src: &Path,
        output_dir: &Path,
        options: &ConversionOptions,
    ) -> FileOutcome {
        let doc = DocumentRef::new(src);
        let name = doc.display_name();
        let mut outcome = FileOutcome::new(src);
        info!("Converting: {}", name);

        if self.copy_pdf_inputs && doc.format == Some(DocumentFormat::Pdf) {
            let dest = output_dir.join(format!("{}.pdf", doc.stem()));
            match copy_unless_same(src, &dest) {
                Ok(()) => {
                    info!("  PDF      -> {}", dest.display());
                    outcome.rendered_path = Some(dest);
                }
                Err(e) => {
                    error!("  [ERROR] {}: {}", name, e);
                    outcome.error = Some(e.to_string());
                }
            }
            return outcome;
        }

        // Phase 1: extract
        let markdown = match self.registry.extract(src, options) {
            Ok(md) => md,
            Err(e) => {
                error!("  [ERROR] {}: {}", name, e);
                outcome.error = Some(e.to_string());
                return outcome;
            }
        };

        if self.write_markdown {
            let md_path = output_dir.join(format!("{}.md", doc.stem()));
            if let Err(e) = std::fs::write(&md_path, &markdown) {
                let err = ConvertError::write(&md_path, e);
                error!("  [ERROR] {}: {}", name, err);
                outcome.error = Some(err.to_string());
                return outcome;
            }
            info!("  Markdown -> {}", md_path.display());
            outcome.markdown_path = Some(md_path);
        }

        // Phase 2: render
        if let Some(ref plugin) = self.output_plugin {
            let out_path = output_dir.join(format!("{}.{}", doc.stem(), plugin.extension()));
            match plugin.convert(&markdown, &out_path, options) {
                Ok(()) => {
                    info!("  {:<8} -> {}", plugin.extension().to_uppercase(), out_path.display());
                    outcome.rendered_path = Some(out_path);
                }
                Err(e) => {
                    warn!("  [WARNING] {} failed for {}: {}", plugin.name(), name, e);
                    outcome.render_error = Some(e.to_string());
                }
            }
        }

        outcome
    }

    fn report_progress(&self, fraction: f64, message: &str) {
        if let Some(ref reporter) = self.progress_reporter {
            reporter(fraction, message);
        }
    }
}

fn copy_unless_same(src: &Path, dest: &Path) -> Result<()> {
    if let (Ok(a), Ok(b)) = (src.canonicalize(), dest.canonicalize()) {
        if a == b {
            return Ok(());
        }
    }
    std::fs::copy(src, dest).map_err(|e| ConvertError::write(dest, e))?;
    Ok(())
}

/// Builder for constructing a pipeline.
pub struct PipelineBuilder {
    registry: Option<PluginRegistry>,
    output_plugin: Option<Box<dyn OutputPlugin>>,
    write_markdown: bool,
    copy_pdf_inputs: bool,
    progress_reporter: Option<ProgressReporter>,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            output_plugin: None,
            write_markdown: true,
            copy_pdf_inputs: false,
            progress_reporter: None,
        }
    }

    pub fn registry(mut self, registry: PluginRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn output(mut self, plugin: Box<dyn OutputPlugin>) -> Self {
        self.output_plugin = Some(plugin);
        self
    }

    /// Keep or skip the intermediate `<stem>.md` files.
    pub fn write_markdown(mut self, enabled: bool) -> Self {
        self.write_markdown = enabled;
        self
    }

    /// Copy PDF inputs to the output directory instead of re-rendering them.
    pub fn copy_pdf_inputs(mut self, enabled: bool) -> Self {
        self.copy_pdf_inputs = enabled;
        self
    }

    pub fn progress_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.progress_reporter = Some(reporter);
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        let registry = self
            .registry
            .ok_or_else(|| ConvertError::Other("No input plugins registered".to_string()))?;
        if registry.is_empty() {
            return Err(ConvertError::Other("No input plugins registered".to_string()));
        }
        if !self.write_markdown && self.output_plugin.is_none() {
            return Err(ConvertError::Other(
                "Pipeline would produce no output: Markdown disabled and no output plugin"
                    .to_string(),
            ));
        }

        let mut pipeline = Pipeline::new(registry);
        pipeline.output_plugin = self.output_plugin;
        pipeline.write_markdown = self.write_markdown;
        pipeline.copy_pdf_inputs = self.copy_pdf_inputs;
        pipeline.progress_reporter = self.progress_reporter;
        Ok(pipeline)
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
