use std::path::Path;

use lopdf::Document;

use pdf2txt_core::{BackendError, PdfBackend};

#[cfg(any(test, feature = "test-support"))]
pub mod fixtures;

/// Pure-Rust [`PdfBackend`] built on lopdf, used as the fallback engine.
///
/// lopdf parses the object graph itself and decodes text through the page
/// fonts' encodings, so it often succeeds on files whose text layer MuPDF
/// renders poorly, and the other way round. A page whose text cannot be
/// decoded contributes an empty string instead of failing the document.
#[derive(Debug, Default)]
pub struct LopdfBackend;

impl LopdfBackend {
    pub fn new() -> Self {
        Self
    }
}

impl PdfBackend for LopdfBackend {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let document = Document::load(path).map_err(|e| BackendError::OpenError(e.to_string()))?;

        if document.is_encrypted() {
            return Err(BackendError::Encrypted);
        }

        let pages = document.get_pages();
        if pages.is_empty() {
            return Err(BackendError::ExtractionError("document has no pages".into()));
        }

        let mut pages_text = Vec::with_capacity(pages.len());
        for &page_number in pages.keys() {
            match document.extract_text(&[page_number]) {
                Ok(text) => pages_text.push(text),
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        page = page_number,
                        error = %e,
                        "lopdf could not decode page text"
                    );
                    pages_text.push(String::new());
                }
            }
        }

        Ok(pages_text)
    }
}
