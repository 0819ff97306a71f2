use std::path::Path;

use mupdf::{Document, TextPageFlags};

use pdf2txt_core::{BackendError, PdfBackend};

/// MuPDF-based implementation of [`PdfBackend`], used as the primary engine.
///
/// This crate is the sole AGPL island: it isolates the mupdf dependency
/// (which is AGPL-3.0) so the rest of the workspace does not link it
/// transitively.
///
/// Each page is turned into a MuPDF text page and read block by block, line
/// by line, one `\n` after every line.
pub struct MupdfBackend {
    flags: TextPageFlags,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            flags: TextPageFlags::PRESERVE_LIGATURES | TextPageFlags::PRESERVE_WHITESPACE,
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the structured-text flags passed to MuPDF.
    pub fn with_flags(mut self, flags: TextPageFlags) -> Self {
        self.flags = flags;
        self
    }
}

impl PdfBackend for MupdfBackend {
    fn name(&self) -> &'static str {
        "mupdf"
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        if document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            return Err(BackendError::Encrypted);
        }

        let mut pages_text = Vec::new();

        for page_result in document
            .pages()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?
        {
            let page = page_result.map_err(|e| BackendError::ExtractionError(e.to_string()))?;
            let text_page = page
                .to_text_page(self.flags)
                .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

            let mut page_text = String::new();
            for block in text_page.blocks() {
                for line in block.lines() {
                    page_text.extend(line.chars().map(|c| c.char().unwrap_or('\u{FFFD}')));
                    page_text.push('\n');
                }
            }
            pages_text.push(page_text);
        }

        Ok(pages_text)
    }
}
