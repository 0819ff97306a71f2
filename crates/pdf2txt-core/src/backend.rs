use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open PDF: {0}")]
    OpenError(String),
    #[error("PDF is encrypted")]
    Encrypted,
    #[error("failed to extract text: {0}")]
    ExtractionError(String),
    #[error("backend panicked: {0}")]
    Panicked(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait for PDF text extraction backends.
///
/// Implementors return one string per page, in page order. Page joining,
/// adequacy checks and the fallback between backends live in
/// [`crate::engine::ExtractionEngine`].
pub trait PdfBackend: Send + Sync {
    /// Short, stable name used in logs (e.g. `"mupdf"`).
    fn name(&self) -> &'static str;

    /// Extract the text of every page of a PDF file.
    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError>;

    /// Extract the full text content of a PDF file, pages joined by `"\n"`.
    fn extract_text(&self, path: &Path) -> Result<String, BackendError> {
        Ok(self.extract_pages(path)?.join("\n"))
    }
}
