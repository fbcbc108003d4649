//! PDF text extraction using lopdf and pdf-extract.

use std::borrow::Cow;
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace};

use super::{Result, TextExtractor};
use crate::error::PdfError;

/// PDF text extractor.
///
/// The document is loaded with lopdf (which also handles empty-password
/// encryption) and its text is read with pdf-extract. When pdf-extract
/// cannot cope with a file, lopdf's own per-page extraction is used.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text from an in-memory PDF.
    pub fn text_from_bytes(&self, data: &[u8]) -> Result<String> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw: Cow<'_, [u8]> = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract needs the decrypted bytes
            let mut decrypted = Vec::new();
            doc.save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            Cow::Owned(decrypted)
        } else {
            Cow::Borrowed(data)
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }
        debug!("Loaded PDF with {} pages", page_count);

        match pdf_extract::extract_text_from_mem(&raw) {
            Ok(text) => Ok(text),
            Err(e) => {
                debug!("pdf-extract failed ({}), falling back to per-page extraction", e);
                Self::text_by_pages(&doc)
            }
        }
    }

    fn text_by_pages(doc: &Document) -> Result<String> {
        // get_pages is keyed by 1-based page number, so iteration is in page order
        let mut pages = Vec::new();
        for number in doc.get_pages().keys() {
            let text = doc
                .extract_text(&[*number])
                .map_err(|e| PdfError::TextExtraction(format!("page {}: {}", number, e)))?;
            trace!("Page {}: {} chars", number, text.len());
            pages.push(text);
        }
        Ok(pages.join("\n"))
    }
}

impl TextExtractor for PdfTextExtractor {
    fn read_text(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(PdfError::NotFound(path.to_path_buf()));
        }

        let data = std::fs::read(path)?;
        self.text_from_bytes(&data)
    }
}
