//! Process command - extract data from a single invoice file.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use clap::Args;
use console::style;
use tracing::info;

use nfx_core::{BatchProcessor, InvoiceRecord, OpenAiBackend, PdfTextExtractor, TextExtractor};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input PDF file
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Model to use (overrides config)
    #[arg(short, long)]
    model: Option<String>,

    /// Print the extracted text without calling the model
    #[arg(long)]
    text_only: bool,

    /// Report header fields the model left empty
    #[arg(long)]
    validate: bool,
}

pub async fn run(args: ProcessArgs, config_path: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();

    let mut config = super::load_config(config_path)?;
    if let Some(model) = args.model {
        config.completion.model = model;
    }

    if !args.input.is_file() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    if args.text_only {
        let text = PdfTextExtractor::new().extract(&args.input);
        if text.is_empty() {
            anyhow::bail!("No text extracted from {}", args.input.display());
        }
        return emit(&text, args.output.as_deref());
    }

    let input = args.input.clone();
    let record = tokio::task::spawn_blocking(move || -> anyhow::Result<InvoiceRecord> {
        let backend = OpenAiBackend::from_env(config.completion.options())
            .context("cannot create completion backend")?;
        let processor = BatchProcessor::new(&config, PdfTextExtractor::new(), &backend);

        processor
            .extract_record_isolated(&input)
            .with_context(|| format!("Failed to process {}", input.display()))
    })
    .await??;

    info!("Processed {} in {:?}", args.input.display(), start.elapsed());

    if args.validate {
        print_validation(&record);
    }

    let json = serde_json::to_string_pretty(&record)?;
    emit(&json, args.output.as_deref())
}

fn emit(content: &str, output: Option<&Path>) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("{} Output written to {}", style("✓").green(), path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

fn print_validation(record: &InvoiceRecord) {
    let missing = record.missing_fields();
    if missing.is_empty() {
        eprintln!("{} All header fields present", style("✓").green());
    } else {
        eprintln!(
            "{} {} header fields empty:",
            style("⚠").yellow(),
            missing.len()
        );
        for field in missing {
            eprintln!("  - {}", field);
        }
    }

    if record.items.is_empty() {
        eprintln!("{} No line items extracted", style("⚠").yellow());
    }
}
