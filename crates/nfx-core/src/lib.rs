//! Core library for Brazilian invoice (Nota Fiscal) extraction.
//!
//! This crate provides:
//! - PDF text extraction
//! - The extraction prompt sent to a language model
//! - Sanitizing and parsing of the model's reply into an invoice record
//! - Folder-level batch processing with per-document failure isolation
//! - Tabular (CSV/TSV) and detailed (JSON) result files

pub mod error;
pub mod invoice;
pub mod models;
pub mod output;
pub mod pdf;
pub mod pipeline;

pub use error::{ExtractionError, NfxError, OutputError, PdfError, Result};
pub use invoice::{build_prompt, sanitize_reply, truncate_chars, RecordParser};
pub use models::config::NfxConfig;
pub use models::invoice::{InvoiceRecord, LineItem};
pub use output::{write_results, WriteReport};
pub use pdf::{PdfTextExtractor, TextExtractor};
pub use pipeline::{
    BatchEvent, BatchProcessor, BatchReport, DocumentOutcome, SkipReason, SkippedDocument,
};

/// Re-export completion types.
pub use nfx_llm::{CompletionBackend, CompletionError, OpenAiBackend, ScriptedBackend};
