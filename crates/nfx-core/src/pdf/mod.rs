//! Document text extraction.

mod extractor;

pub use extractor::PdfTextExtractor;

use std::path::Path;

use tracing::{error, warn};

use crate::error::PdfError;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for turning a document on disk into plain text.
pub trait TextExtractor {
    /// Read the text of every page, in page order.
    ///
    /// Returns `PdfError::NotFound` when `path` is not an existing file.
    fn read_text(&self, path: &Path) -> Result<String>;

    /// Infallible variant: trimmed text, or an empty string on any failure.
    ///
    /// Failures are logged here and go no further.
    fn extract(&self, path: &Path) -> String {
        match self.read_text(path) {
            Ok(text) => text.trim().to_string(),
            Err(PdfError::NotFound(missing)) => {
                warn!("File not found: {}", missing.display());
                String::new()
            }
            Err(e) => {
                error!("Failed to extract text from '{}': {}", path.display(), e);
                String::new()
            }
        }
    }
}

impl<T: TextExtractor + ?Sized> TextExtractor for &T {
    fn read_text(&self, path: &Path) -> Result<String> {
        (**self).read_text(path)
    }
}
