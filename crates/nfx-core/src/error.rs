//! Error types for the nfx-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the nfx library.
#[derive(Error, Debug)]
pub enum NfxError {
    /// The input folder does not exist. The only fatal batch error.
    #[error("folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),

    /// The document glob pattern could not be built.
    #[error("invalid document pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Invoice extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// Completion service error.
    #[error("completion error: {0}")]
    Completion(#[from] nfx_llm::CompletionError),

    /// Output writing error.
    #[error("output error: {0}")]
    Output(#[from] OutputError),

    /// A stage panicked while handling one document.
    #[error("unexpected failure: {0}")]
    Panicked(String),
}

/// Errors related to PDF text extraction.
#[derive(Error, Debug)]
pub enum PdfError {
    /// The path does not reference an existing file.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read.
    #[error("failed to read file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted with a non-empty password.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Failed to extract text from the PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),
}

/// Errors related to turning a model reply into an invoice record.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The document produced no text to send to the model.
    #[error("no text extracted from document")]
    EmptyText,

    /// The reply is not a JSON object of the expected shape.
    #[error("malformed model reply: {message}")]
    MalformedReply { message: String, reply: String },
}

/// Errors related to writing the output artifacts.
#[derive(Error, Debug)]
pub enum OutputError {
    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Tabular serialization error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Detailed serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for the nfx library.
pub type Result<T> = std::result::Result<T, NfxError>;
