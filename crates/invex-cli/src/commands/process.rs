//! Process command - extract fields from a single PDF or image.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invex_core::models::config::InvexConfig;
use invex_core::{ExtractionResult, InvoiceAssembler, InvoiceExtractor, SourceKind};

use super::output::{format_result, OutputFormat};
use super::{load_config, load_ocr_engine};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// OCR model directory
    #[arg(short, long)]
    model_dir: Option<PathBuf>,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Extracting {}", args.input.display()));

    let result = extract_file(&args.input, &config, args.model_dir.as_deref());
    pb.finish_and_clear();
    let result = result?;

    let output = format_result(&result, args.format)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Read `path` and extract from it, choosing the adapter by file extension.
pub fn extract_file(
    path: &Path,
    config: &InvexConfig,
    model_dir: Option<&Path>,
) -> anyhow::Result<ExtractionResult> {
    let kind = SourceKind::from_path(path).ok_or_else(|| {
        anyhow::anyhow!(
            "Unsupported file format: {}",
            path.extension()
                .and_then(|e| e.to_str())
                .unwrap_or_default()
        )
    })?;

    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let assembler = InvoiceAssembler::from_config(&config.extraction);

    let result = match kind {
        SourceKind::Pdf => assembler.extract_from_pdf_bytes(&data, &config.pdf),
        SourceKind::Image => {
            let engine = load_ocr_engine(model_dir, config)?;
            assembler.extract_from_image_bytes(&data, &engine)
        }
    };

    result.with_context(|| format!("No invoice data in {}", path.display()))
}
