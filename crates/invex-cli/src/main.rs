//! CLI application for heuristic invoice field extraction.

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, email, process, serve};

/// Invoice extraction - pull merchant, amount and date out of receipts and invoices
#[derive(Parser)]
#[command(name = "invex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract fields from a single PDF or image file
    Process(process::ProcessArgs),

    /// Extract fields from multiple files
    Batch(batch::BatchArgs),

    /// Extract fields from an email subject and body
    Email(email::EmailArgs),

    /// Run the HTTP extraction service
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Serve(_)) {
        serve::init_tracing();
    } else {
        // Set up logging based on verbosity
        let level = match cli.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };

        let subscriber = FmtSubscriber::builder()
            .with_max_level(level)
            .with_target(false)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)?;
    }

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Process(args) => process::run(args, config_path).await,
        Commands::Batch(args) => batch::run(args, config_path).await,
        Commands::Email(args) => email::run(args, config_path).await,
        Commands::Serve(args) => serve::run(args, config_path).await,
        Commands::Config(args) => config::run(args, config_path).await,
    }
}
