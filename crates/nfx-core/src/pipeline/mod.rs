//! Batch pipeline.

mod batch;

pub use batch::{
    BatchEvent, BatchProcessor, BatchReport, DocumentOutcome, SkipReason, SkippedDocument,
};
