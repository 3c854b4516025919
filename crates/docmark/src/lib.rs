//! docmark: convert documents to Markdown and render Markdown to PDF with
//! per-line text direction.
//!
//! Shared plumbing for the `convert` and `doc2pdf` binaries.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use convert_core::options::ConversionOptions;
use convert_core::plugin::ProgressReporter;
use convert_core::registry::PluginRegistry;

/// Every input plugin this build knows about.
pub fn default_registry() -> PluginRegistry {
    PluginRegistry::new()
        .with(Box::new(convert_input_pdf::PdfInputPlugin))
        .with(Box::new(convert_input_docx::DocxInputPlugin))
        .with(Box::new(convert_input_xlsx::XlsxInputPlugin))
        .with(Box::new(convert_input_pptx::PptxInputPlugin))
        .with(Box::new(convert_input_html::HtmlInputPlugin))
        .with(Box::new(convert_input_epub::EpubInputPlugin))
        .with(Box::new(convert_input_txt::TxtInputPlugin))
        .with(Box::new(convert_input_media::MediaInputPlugin))
        .with(Box::new(convert_input_zip::ZipInputPlugin))
}

/// Arguments shared by both binaries.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Input file or directory [default: input]
    pub source: Option<PathBuf>,

    /// Output directory [default: output]
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Extra config file, applied after the global and local ones
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CommonArgs {
    /// Config files first, then flags that were given on the command line.
    pub fn load_options(&self) -> Result<ConversionOptions> {
        let mut options =
            ConversionOptions::load(self.config.as_deref()).context("Failed to load config")?;
        self.apply(&mut options);
        Ok(options)
    }

    pub fn apply(&self, options: &mut ConversionOptions) {
        if self.verbose > 0 {
            options.verbose = self.verbose;
        }
        if let Some(source) = &self.source {
            options.input_dir = source.clone();
        }
        if let Some(output) = &self.output {
            options.output_dir = output.clone();
        }
    }
}

/// Initialise env_logger; `RUST_LOG` still wins over the verbosity flag.
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

/// Logs batch progress at debug level.
pub fn progress_logger() -> ProgressReporter {
    Box::new(|fraction: f64, message: &str| {
        if fraction < 1.0 {
            log::debug!("[{:3.0}%] {}", fraction * 100.0, message);
        } else {
            log::debug!("Done!");
        }
    })
}
