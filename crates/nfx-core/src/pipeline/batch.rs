//! Folder-level orchestration: one document at a time, failures isolated.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use glob::{MatchOptions, Pattern};
use nfx_llm::CompletionBackend;
use tracing::{debug, error, info, warn};

use crate::error::{ExtractionError, NfxError, PdfError, Result};
use crate::invoice::{build_prompt, sanitize_reply, truncate_chars, RecordParser};
use crate::models::config::NfxConfig;
use crate::models::invoice::InvoiceRecord;
use crate::output::{write_results, WriteReport};
use crate::pdf::TextExtractor;

/// Why a document produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file vanished between listing and reading.
    NotFound,
    /// The document could not be opened or read.
    Unreadable(String),
    /// Extraction succeeded but produced no text.
    EmptyText,
    /// The completion service failed.
    Completion(String),
    /// The reply was not a usable JSON object.
    MalformedReply(String),
    /// A panic escaped one of the stages.
    Panicked(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotFound => write!(f, "file not found"),
            SkipReason::Unreadable(e) => write!(f, "unreadable document: {}", e),
            SkipReason::EmptyText => write!(f, "no text extracted"),
            SkipReason::Completion(e) => write!(f, "completion failed: {}", e),
            SkipReason::MalformedReply(e) => write!(f, "{}", e),
            SkipReason::Panicked(e) => write!(f, "unexpected failure: {}", e),
        }
    }
}

/// Result of running one document through every stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentOutcome {
    Recorded(InvoiceRecord),
    Skipped(SkipReason),
}

impl DocumentOutcome {
    /// Whether a record was produced.
    pub fn is_recorded(&self) -> bool {
        matches!(self, DocumentOutcome::Recorded(_))
    }
}

/// A document left out of the batch collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDocument {
    pub file_name: String,
    pub reason: SkipReason,
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Matching documents found in the folder.
    pub documents_found: usize,
    /// Records in processing order.
    pub records: Vec<InvoiceRecord>,
    /// Documents without a record.
    pub skipped: Vec<SkippedDocument>,
    /// Artifacts written; `None` when there was nothing to write.
    pub written: Option<WriteReport>,
}

/// Progress notifications for callers that display them.
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Documents were listed and processing is about to begin.
    Started { total: usize },
    /// One document went through the pipeline.
    Processed {
        path: &'a Path,
        outcome: &'a DocumentOutcome,
    },
}

/// Runs every document of a folder through extraction, completion and parsing.
pub struct BatchProcessor<'a, E, B> {
    config: &'a NfxConfig,
    extractor: E,
    backend: B,
    parser: RecordParser,
    clock: fn() -> NaiveDateTime,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl<'a, E, B> BatchProcessor<'a, E, B>
where
    E: TextExtractor,
    B: CompletionBackend,
{
    /// Create a processor; pass the backend by reference to share it.
    pub fn new(config: &'a NfxConfig, extractor: E, backend: B) -> Self {
        Self {
            config,
            extractor,
            backend,
            parser: RecordParser::new(config.extraction.max_line_items),
            clock: local_now,
        }
    }

    /// Override the source of `data_processamento` timestamps.
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// Process every document in `folder` and write the results to `output`.
    ///
    /// Only a missing folder is an error; per-document failures are logged
    /// and leave the document out of the returned records.
    pub fn process_folder(&self, folder: &Path, output: &Path) -> Result<Vec<InvoiceRecord>> {
        self.run(folder, output, |_| {}).map(|report| report.records)
    }

    /// Like `process_folder`, reporting progress and returning the full report.
    pub fn run<F>(&self, folder: &Path, output: &Path, mut observer: F) -> Result<BatchReport>
    where
        F: FnMut(BatchEvent<'_>),
    {
        let documents = self.find_documents(folder)?;
        let mut report = BatchReport {
            documents_found: documents.len(),
            ..Default::default()
        };

        if documents.is_empty() {
            warn!(
                "No .{} files found in {}",
                self.config.extraction.extension,
                folder.display()
            );
            return Ok(report);
        }

        info!("Found {} documents in {}", documents.len(), folder.display());
        observer(BatchEvent::Started {
            total: documents.len(),
        });

        for path in &documents {
            let outcome = self.process_document(path);
            observer(BatchEvent::Processed {
                path: path.as_path(),
                outcome: &outcome,
            });

            let file_name = file_name_of(path);
            match outcome {
                DocumentOutcome::Recorded(record) => {
                    info!("Processed: {}", file_name);
                    report.records.push(record);
                }
                DocumentOutcome::Skipped(reason) => {
                    warn!("Failed to process {}: {}", file_name, reason);
                    report.skipped.push(SkippedDocument { file_name, reason });
                }
            }
        }

        if report.records.is_empty() {
            warn!("No document in {} yielded a record", folder.display());
        } else {
            report.written = Some(write_results(&report.records, output));
        }

        Ok(report)
    }

    /// Matching documents directly inside `folder`, sorted by file name.
    pub fn find_documents(&self, folder: &Path) -> Result<Vec<PathBuf>> {
        if !folder.is_dir() {
            return Err(NfxError::FolderNotFound(folder.to_path_buf()));
        }

        let pattern = format!(
            "{}/*.{}",
            Pattern::escape(&folder.to_string_lossy()),
            Pattern::escape(&self.config.extraction.extension)
        );
        let options = MatchOptions {
            case_sensitive: false,
            ..MatchOptions::new()
        };

        let mut documents: Vec<PathBuf> = glob::glob_with(&pattern, options)?
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|path| path.is_file())
            .collect();

        documents.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        debug!("Documents: {:?}", documents);
        Ok(documents)
    }

    /// Run one document through every stage, stopping at the first failure.
    pub fn extract_record(&self, path: &Path) -> Result<InvoiceRecord> {
        info!("Processing: {}", path.display());

        let text = self.extractor.read_text(path)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(ExtractionError::EmptyText.into());
        }

        let excerpt = truncate_chars(text, self.config.extraction.max_text_chars);
        let prompt = build_prompt(excerpt);
        let reply = self
            .backend
            .complete(&self.config.completion.system_role, &prompt)?;

        let candidate = sanitize_reply(&reply);
        let record = self
            .parser
            .parse(candidate, &file_name_of(path), (self.clock)())?;
        Ok(record)
    }

    /// Like `extract_record`, with a panic in any stage returned as
    /// `NfxError::Panicked` instead of unwinding into the caller.
    pub fn extract_record_isolated(&self, path: &Path) -> Result<InvoiceRecord> {
        panic::catch_unwind(AssertUnwindSafe(|| self.extract_record(path)))
            .unwrap_or_else(|payload| Err(NfxError::Panicked(panic_message(payload.as_ref()))))
    }

    /// Run one document through every stage, turning a failure into a skip.
    pub fn process_document(&self, path: &Path) -> DocumentOutcome {
        let error = match self.extract_record_isolated(path) {
            Ok(record) => return DocumentOutcome::Recorded(record),
            Err(e) => e,
        };

        let file_name = file_name_of(path);
        let reason = match error {
            NfxError::Pdf(PdfError::NotFound(_)) => {
                warn!("File not found: {}", path.display());
                SkipReason::NotFound
            }
            NfxError::Pdf(e) => {
                error!("Failed to extract text from '{}': {}", path.display(), e);
                SkipReason::Unreadable(e.to_string())
            }
            NfxError::Extraction(ExtractionError::EmptyText) => {
                warn!("Could not extract text from {}", file_name);
                SkipReason::EmptyText
            }
            NfxError::Completion(e) => {
                error!("Completion for {} failed ({}): {}", file_name, self.backend.model(), e);
                SkipReason::Completion(e.to_string())
            }
            // The parser has already logged the reply
            NfxError::Extraction(e) => SkipReason::MalformedReply(e.to_string()),
            NfxError::Panicked(message) => {
                error!("Error processing {}: {}", path.display(), message);
                SkipReason::Panicked(message)
            }
            other => {
                error!("Error processing {}: {}", file_name, other);
                SkipReason::Unreadable(other.to_string())
            }
        };
        DocumentOutcome::Skipped(reason)
    }
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
