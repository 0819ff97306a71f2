use std::fmt;

pub mod adequacy;
pub mod backend;
pub mod config_file;
pub mod engine;
#[cfg(any(test, feature = "test-support"))]
pub mod mock;
pub mod orchestrator;
pub mod walker;

// Re-export for convenience
pub use adequacy::{AdequacyPolicy, DEFAULT_MIN_CHARS};
pub use backend::{BackendError, PdfBackend};
pub use engine::ExtractionEngine;
pub use orchestrator::{
    ConvertError, ConvertOptions, FailureRecord, Outcome, ProgressEvent, RunSummary, convert_tree,
};
pub use walker::{ConversionTask, WalkError, enumerate, output_path_for, validate_input_root};

/// Which position in the backend chain produced a piece of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineRole {
    Primary,
    Fallback,
}

impl fmt::Display for EngineRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineRole::Primary => f.write_str("primary"),
            EngineRole::Fallback => f.write_str("fallback"),
        }
    }
}

/// One backend run within a single [`ExtractionResult`].
#[derive(Debug, Clone)]
pub struct Attempt {
    pub backend: &'static str,
    pub role: EngineRole,
    /// Pages the backend reported (0 when it failed).
    pub pages: usize,
    /// Characters counted by [`AdequacyPolicy::measure`].
    pub chars: usize,
    pub adequate: bool,
    /// Set when the backend returned an error or panicked.
    pub error: Option<String>,
}

/// Result of extracting one PDF through the backend chain.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    pub text: String,
    /// Role of the backend whose text is returned. For a failed result, the
    /// role of the last backend tried.
    pub engine_used: EngineRole,
    /// Name of the backend whose text is returned (or the last one tried).
    pub backend: &'static str,
    /// `false` only when every backend failed or returned whitespace-only
    /// text.
    pub success: bool,
    pub attempts: Vec<Attempt>,
}

impl ExtractionResult {
    /// Whether any fallback backend was run.
    pub fn fell_back(&self) -> bool {
        self.attempts.iter().any(|a| a.role == EngineRole::Fallback)
    }

    /// Human-readable reason for a failed extraction, built from the attempts.
    pub fn failure_reason(&self) -> String {
        let errors: Vec<String> = self
            .attempts
            .iter()
            .filter_map(|a| {
                a.error
                    .as_ref()
                    .map(|e| format!("{} ({}): {}", a.role, a.backend, e))
            })
            .collect();

        if errors.len() == self.attempts.len() && !errors.is_empty() {
            errors.join("; ")
        } else if errors.is_empty() {
            "no extractable text (image-only or empty document)".to_string()
        } else {
            format!("no extractable text; {}", errors.join("; "))
        }
    }
}
