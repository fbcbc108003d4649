//! Batch command - extract every invoice in a folder.

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;

use nfx_core::{BatchEvent, BatchProcessor, BatchReport, OpenAiBackend, PdfTextExtractor};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Folder containing the invoice PDFs
    #[arg(required = true)]
    folder: PathBuf,

    /// Tabular output file; the detailed JSON is written next to it
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

pub async fn run(args: BatchArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(model) = args.model {
        config.completion.model = model;
    }
    let output = args.output.unwrap_or_else(|| config.output.path.clone());
    let folder = args.folder;

    if !folder.is_dir() {
        anyhow::bail!("Folder not found: {}", folder.display());
    }

    println!(
        "{} Processing folder {} with {}",
        style("ℹ").blue(),
        folder.display(),
        config.completion.model
    );

    let quiet = args.quiet;
    let extension = config.extraction.extension.clone();
    // The blocking HTTP client must be created and dropped off the async runtime.
    let report = tokio::task::spawn_blocking(move || -> anyhow::Result<BatchReport> {
        let backend = OpenAiBackend::from_env(config.completion.options())
            .context("cannot create completion backend")?;
        let processor = BatchProcessor::new(&config, PdfTextExtractor::new(), &backend);

        let pb = ProgressBar::new(0);
        if quiet {
            pb.set_draw_target(ProgressDrawTarget::hidden());
        }
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
                .progress_chars("=>-"),
        );

        let report = processor.run(&folder, &output, |event| match event {
            BatchEvent::Started { total } => pb.set_length(total as u64),
            BatchEvent::Processed { path, outcome } => {
                debug!("{} -> recorded: {}", path.display(), outcome.is_recorded());
                if let Some(name) = path.file_name() {
                    pb.set_message(name.to_string_lossy().into_owned());
                }
                pb.inc(1);
            }
        })?;

        pb.finish_and_clear();
        Ok(report)
    })
    .await??;

    print_summary(&report, &extension, start);
    Ok(())
}

fn print_summary(report: &BatchReport, extension: &str, start: Instant) {
    println!();

    if report.documents_found == 0 {
        println!("{} No .{} files found", style("ℹ").blue(), extension);
        return;
    }

    println!(
        "{} Processed {} documents in {:.1?}",
        style("✓").green(),
        report.documents_found,
        start.elapsed()
    );
    println!(
        "   {} extracted, {} skipped",
        style(report.records.len()).green(),
        style(report.skipped.len()).red()
    );

    if !report.skipped.is_empty() {
        println!();
        println!("{}", style("Skipped files:").red());
        for skipped in &report.skipped {
            println!("  - {}: {}", skipped.file_name, skipped.reason);
        }
    }

    match &report.written {
        Some(written) => {
            println!();
            match &written.tabular {
                Some(path) => println!("{} Table: {}", style("✓").green(), path.display()),
                None => println!("{} Table could not be written", style("✗").red()),
            }
            match &written.detailed {
                Some(path) => println!("{} Detailed: {}", style("✓").green(), path.display()),
                None => println!("{} Detailed JSON could not be written", style("✗").red()),
            }
        }
        None => {
            println!();
            println!(
                "{} Nothing extracted; no output files written",
                style("⚠").yellow()
            );
        }
    }
}
