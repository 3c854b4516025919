//! convert: turn every document in a folder into Markdown and, unless
//! disabled, a direction-aware PDF.

use std::process;

use anyhow::Result;
use clap::Parser;

use convert_core::pipeline::PipelineBuilder;
use convert_output_pdf::PdfOutputPlugin;
use docmark::{default_registry, init_logging, progress_logger, CommonArgs};

#[derive(Parser)]
#[command(
    name = "convert",
    version,
    about = "Convert documents to Markdown and bidi-aware PDF"
)]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,

    /// Only write Markdown files
    #[arg(long)]
    no_pdf: bool,

    /// Dump effective merged config as TOML and exit
    #[arg(long)]
    dump_config: bool,
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

/// Returns whether every file converted cleanly.
fn run(cli: &Cli) -> Result<bool> {
    let mut options = cli.common.load_options()?;
    if cli.no_pdf {
        options.generate_pdf = false;
    }

    if cli.dump_config {
        print!("{}", options.to_toml()?);
        return Ok(true);
    }

    let mut builder = PipelineBuilder::new()
        .registry(default_registry())
        .progress_reporter(progress_logger());
    if options.generate_pdf {
        builder = builder.output(Box::new(PdfOutputPlugin));
    }
    let pipeline = builder.build()?;

    let report = pipeline.run(&options.input_dir, &options.output_dir, &options)?;
    if report.is_empty() {
        return Ok(true);
    }
    log::info!(
        "Done: {} converted, {} failed -> {}",
        report.succeeded(),
        report.failed(),
        options.output_dir.display()
    );
    Ok(report.is_success())
}
