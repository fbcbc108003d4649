//! Prompting the model and turning its reply into an invoice record.

mod parser;
mod prompt;
mod sanitize;

pub use parser::RecordParser;
pub use prompt::{build_prompt, truncate_chars};
pub use sanitize::sanitize_reply;

use crate::error::ExtractionError;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
