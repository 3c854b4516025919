//! doc2pdf: render every document in a folder straight to PDF.
//!
//! PDF inputs are copied as they are; everything else is extracted to
//! Markdown in memory and rendered without keeping the `.md` file.

use std::process;

use anyhow::Result;
use clap::Parser;

use convert_core::pipeline::PipelineBuilder;
use convert_output_pdf::PdfOutputPlugin;
use docmark::{default_registry, init_logging, progress_logger, CommonArgs};

#[derive(Parser)]
#[command(name = "doc2pdf", version, about = "Convert documents to bidi-aware PDF")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.common.verbose);

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<bool> {
    let options = cli.common.load_options()?;

    let pipeline = PipelineBuilder::new()
        .registry(default_registry())
        .output(Box::new(PdfOutputPlugin))
        .write_markdown(false)
        .copy_pdf_inputs(true)
        .progress_reporter(progress_logger())
        .build()?;

    let report = pipeline.run(&options.input_dir, &options.output_dir, &options)?;
    if !report.is_empty() {
        log::info!(
            "Done: {} converted, {} failed -> {}",
            report.succeeded(),
            report.failed(),
            options.output_dir.display()
        );
    }
    Ok(report.is_success())
}
