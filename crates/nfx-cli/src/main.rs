//! CLI application for Brazilian invoice (NF-e) extraction.

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::{batch, config, process};

/// Brazilian invoice extraction - turn a folder of NF-e PDFs into CSV and JSON
#[derive(Parser)]
#[command(name = "nfx")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// File receiving error-level log events
    #[arg(long, global = true, default_value = "logs/nfx-errors.log")]
    log_file: PathBuf,

    /// Do not write the error log file
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract every invoice in a folder
    Batch(batch::BatchArgs),

    /// Extract a single invoice file
    Process(process::ProcessArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Credentials may come from a .env file next to the working directory
    let _ = dotenvy::dotenv();

    let error_log = (!cli.no_log_file).then_some(cli.log_file.as_path());
    logging::init(cli.verbose, error_log)?;

    match cli.command {
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}
