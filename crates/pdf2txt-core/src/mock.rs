//! Mock extraction backend for testing.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::{BackendError, PdfBackend};

/// Marker that makes [`MockResponse::FromFile`] treat a file as corrupt.
pub const CORRUPT_MARKER: &str = "%CORRUPT";

/// A configurable response for [`MockBackend`].
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Return these pages for every file.
    Pages(Vec<String>),
    /// Read the file as UTF-8 and split it into pages on form feeds (`\x0c`).
    /// Files starting with [`CORRUPT_MARKER`] fail to open.
    FromFile,
    /// Fail with an extraction error.
    Error(String),
    /// Panic with this message.
    Panic(String),
}

/// Shared handle onto a [`MockBackend`]'s call count, usable after the
/// backend has been boxed into an engine.
#[derive(Clone, Debug, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// A hand-rolled mock implementing [`PdfBackend`] for tests.
pub struct MockBackend {
    name: &'static str,
    response: MockResponse,
    calls: CallCounter,
}

impl MockBackend {
    pub fn new(name: &'static str, response: MockResponse) -> Self {
        Self {
            name,
            response,
            calls: CallCounter::default(),
        }
    }

    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

impl PdfBackend for MockBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn extract_pages(&self, path: &Path) -> Result<Vec<String>, BackendError> {
        self.calls.0.fetch_add(1, Ordering::SeqCst);
        match &self.response {
            MockResponse::Pages(pages) => Ok(pages.clone()),
            MockResponse::FromFile => {
                let content = std::fs::read_to_string(path)?;
                if content.starts_with(CORRUPT_MARKER) {
                    return Err(BackendError::OpenError("no objects found".into()));
                }
                Ok(content.split('\x0c').map(str::to_string).collect())
            }
            MockResponse::Error(msg) => Err(BackendError::ExtractionError(msg.clone())),
            MockResponse::Panic(msg) => panic!("{}", msg),
        }
    }
}
