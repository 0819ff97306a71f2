use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use crate::adequacy::AdequacyPolicy;
use crate::backend::{BackendError, PdfBackend};
use crate::{Attempt, EngineRole, ExtractionResult};

/// Runs an ordered chain of [`PdfBackend`]s over one PDF.
///
/// The first backend is the primary; every following backend is a fallback,
/// tried only while no result so far satisfies the [`AdequacyPolicy`]. The
/// returned text is the one with the most characters, earlier backends
/// winning ties, so a fallback only replaces the primary's text when it
/// actually found more.
pub struct ExtractionEngine {
    backends: Vec<Box<dyn PdfBackend>>,
    policy: AdequacyPolicy,
    page_separator: String,
}

struct Best {
    text: String,
    chars: usize,
    role: EngineRole,
    backend: &'static str,
}

impl ExtractionEngine {
    pub fn new(primary: Box<dyn PdfBackend>, policy: AdequacyPolicy) -> Self {
        Self {
            backends: vec![primary],
            policy,
            page_separator: "\n".to_string(),
        }
    }

    /// Append a fallback backend to the chain.
    pub fn with_fallback(mut self, backend: Box<dyn PdfBackend>) -> Self {
        self.backends.push(backend);
        self
    }

    /// Set the string placed between consecutive pages. An empty separator
    /// is replaced by `"\n"` so page boundaries always survive.
    pub fn with_page_separator(mut self, separator: impl Into<String>) -> Self {
        let separator = separator.into();
        self.page_separator = if separator.is_empty() {
            "\n".to_string()
        } else {
            separator
        };
        self
    }

    pub fn policy(&self) -> AdequacyPolicy {
        self.policy
    }

    pub fn backend_names(&self) -> Vec<&'static str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Extract the text of `path`, falling back through the chain while the
    /// result is inadequate. Never panics and never returns an error: every
    /// failure ends up in [`ExtractionResult::attempts`].
    pub fn extract(&self, path: &Path) -> ExtractionResult {
        let mut attempts: Vec<Attempt> = Vec::with_capacity(self.backends.len());
        let mut best: Option<Best> = None;

        for (i, backend) in self.backends.iter().enumerate() {
            let role = if i == 0 {
                EngineRole::Primary
            } else {
                EngineRole::Fallback
            };

            if let Some(previous) = attempts.last() {
                tracing::info!(
                    path = %path.display(),
                    from = previous.backend,
                    to = backend.name(),
                    chars = previous.chars,
                    "fallback triggered"
                );
            }

            match run_backend(backend.as_ref(), path) {
                Ok(pages) => {
                    let page_count = pages.len();
                    let text = pages.join(&self.page_separator);
                    let chars = AdequacyPolicy::measure(&text);
                    let adequate = self.policy.is_adequate(&text, page_count);

                    tracing::debug!(
                        path = %path.display(),
                        backend = backend.name(),
                        pages = page_count,
                        chars,
                        adequate,
                        "extraction attempt finished"
                    );

                    attempts.push(Attempt {
                        backend: backend.name(),
                        role,
                        pages: page_count,
                        chars,
                        adequate,
                        error: None,
                    });

                    if chars > 0 && best.as_ref().is_none_or(|b| chars > b.chars) {
                        best = Some(Best {
                            text,
                            chars,
                            role,
                            backend: backend.name(),
                        });
                    }

                    if adequate {
                        break;
                    }
                }
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        backend = backend.name(),
                        error = %e,
                        "extraction attempt failed"
                    );
                    attempts.push(Attempt {
                        backend: backend.name(),
                        role,
                        pages: 0,
                        chars: 0,
                        adequate: false,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        match best {
            Some(best) => {
                if attempts.len() > 1 && best.role == EngineRole::Primary {
                    tracing::warn!(
                        path = %path.display(),
                        chars = best.chars,
                        "fallback did not improve on the primary extraction, keeping primary text"
                    );
                }
                ExtractionResult {
                    text: best.text,
                    engine_used: best.role,
                    backend: best.backend,
                    success: true,
                    attempts,
                }
            }
            None => {
                let (engine_used, backend) = attempts
                    .last()
                    .map(|a| (a.role, a.backend))
                    .unwrap_or((EngineRole::Primary, "none"));
                ExtractionResult {
                    text: String::new(),
                    engine_used,
                    backend,
                    success: false,
                    attempts,
                }
            }
        }
    }
}

/// Call a backend, turning a panic inside it into a [`BackendError`].
fn run_backend(backend: &dyn PdfBackend, path: &Path) -> Result<Vec<String>, BackendError> {
    panic::catch_unwind(AssertUnwindSafe(|| backend.extract_pages(path)))
        .unwrap_or_else(|payload| Err(BackendError::Panicked(panic_message(payload.as_ref()))))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
