//! Email command - extract fields from an email subject and body.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use clap::Args;

use invex_core::{InvoiceAssembler, InvoiceExtractor};

use super::load_config;
use super::output::{format_result, OutputFormat};

/// Arguments for the email command.
#[derive(Args)]
pub struct EmailArgs {
    /// Email subject line
    #[arg(short, long, default_value = "")]
    subject: String,

    /// Email body text
    #[arg(short, long, conflicts_with = "body_file")]
    body: Option<String>,

    /// Read the email body from a file ("-" for stdin)
    #[arg(long)]
    body_file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,
}

pub async fn run(args: EmailArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    let body = match (args.body, args.body_file) {
        (Some(body), _) => body,
        (None, Some(path)) if path.as_os_str() == "-" => {
            let mut body = String::new();
            std::io::stdin().read_to_string(&mut body)?;
            body
        }
        (None, Some(path)) => fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", path.display(), e))?,
        (None, None) => String::new(),
    };

    let result = InvoiceAssembler::from_config(&config.extraction)
        .extract_from_email(&body, &args.subject)?;

    println!("{}", format_result(&result, args.format)?);

    Ok(())
}
