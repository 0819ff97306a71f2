use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use thiserror::Error;

use crate::engine::ExtractionEngine;
use crate::walker::{self, ConversionTask, DEFAULT_TEXT_EXTENSION, WalkError};
use crate::EngineRole;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Input(#[from] WalkError),
    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage full while writing {}: {source}", .path.display())]
    StorageFull {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Options for a directory conversion run.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Extension given to produced text files (without the dot).
    pub extension: String,
    /// Leave tasks whose output file already exists untouched.
    pub skip_existing: bool,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_TEXT_EXTENSION.to_string(),
            skip_existing: false,
        }
    }
}

/// What happened to one conversion task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Converted {
        engine_used: EngineRole,
        backend: &'static str,
        fell_back: bool,
    },
    Skipped,
    Failed {
        reason: String,
    },
}

/// Progress events emitted while a run is in flight.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started {
        total: usize,
    },
    FileStarted {
        index: usize,
        total: usize,
        path: PathBuf,
    },
    FileFinished {
        index: usize,
        total: usize,
        path: PathBuf,
        outcome: Outcome,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureRecord {
    pub input_path: PathBuf,
    pub reason: String,
}

/// Aggregated counts for a finished run.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub total: usize,
    pub converted: usize,
    /// Converted files for which at least one fallback backend ran.
    pub fell_back: usize,
    pub skipped: usize,
    pub failed: usize,
    pub failures: Vec<FailureRecord>,
    pub elapsed: Duration,
}

impl RunSummary {
    fn record(&mut self, task: &ConversionTask, outcome: &Outcome) {
        match outcome {
            Outcome::Converted { fell_back, .. } => {
                self.converted += 1;
                if *fell_back {
                    self.fell_back += 1;
                }
            }
            Outcome::Skipped => self.skipped += 1,
            Outcome::Failed { reason } => {
                self.failed += 1;
                self.failures.push(FailureRecord {
                    input_path: task.input_path.clone(),
                    reason: reason.clone(),
                });
            }
        }
    }
}

/// Convert every PDF under `input_root` into a text file under `output_root`.
///
/// Tasks run one at a time. A failing file is logged, counted and skipped;
/// it never stops the run. The only errors returned are an invalid input
/// root (before anything is processed), an output root that cannot be
/// created, and a full disk, which would make every following write fail too.
pub fn convert_tree<F>(
    input_root: &Path,
    output_root: &Path,
    engine: &ExtractionEngine,
    options: &ConvertOptions,
    mut progress: F,
) -> Result<RunSummary, ConvertError>
where
    F: FnMut(ProgressEvent),
{
    let start = Instant::now();
    walker::validate_input_root(input_root)?;
    std::fs::create_dir_all(output_root).map_err(|source| ConvertError::OutputDir {
        path: output_root.to_path_buf(),
        source,
    })?;

    let tasks: Vec<ConversionTask> =
        walker::tasks(input_root, output_root, &options.extension).collect();
    let total = tasks.len();
    tracing::info!(
        input = %input_root.display(),
        output = %output_root.display(),
        total,
        "starting conversion"
    );
    progress(ProgressEvent::Started { total });

    let mut summary = RunSummary {
        total,
        ..Default::default()
    };

    for (index, task) in tasks.iter().enumerate() {
        progress(ProgressEvent::FileStarted {
            index,
            total,
            path: task.input_path.clone(),
        });

        let outcome = convert_one(task, engine, options)?;
        summary.record(task, &outcome);

        progress(ProgressEvent::FileFinished {
            index,
            total,
            path: task.input_path.clone(),
            outcome,
        });
    }

    summary.elapsed = start.elapsed();
    tracing::info!(
        total = summary.total,
        converted = summary.converted,
        fell_back = summary.fell_back,
        skipped = summary.skipped,
        failed = summary.failed,
        elapsed_ms = summary.elapsed.as_millis() as u64,
        "conversion complete"
    );
    Ok(summary)
}

/// Run a single task. Per-file problems come back as [`Outcome::Failed`];
/// only a full disk is returned as an error.
pub fn convert_one(
    task: &ConversionTask,
    engine: &ExtractionEngine,
    options: &ConvertOptions,
) -> Result<Outcome, ConvertError> {
    if options.skip_existing && task.output_path.exists() {
        tracing::debug!(path = %task.input_path.display(), "output exists, skipping");
        return Ok(Outcome::Skipped);
    }

    let result = engine.extract(&task.input_path);
    if !result.success {
        let reason = result.failure_reason();
        tracing::error!(path = %task.input_path.display(), %reason, "conversion failed");
        return Ok(Outcome::Failed { reason });
    }

    match write_output(&task.output_path, &result.text) {
        Ok(()) => {
            tracing::debug!(
                path = %task.input_path.display(),
                output = %task.output_path.display(),
                engine = %result.engine_used,
                backend = result.backend,
                "converted"
            );
            Ok(Outcome::Converted {
                engine_used: result.engine_used,
                backend: result.backend,
                fell_back: result.fell_back(),
            })
        }
        Err(e) => write_failure(task, e),
    }
}

/// Classify a failed write: a full disk aborts the run, anything else only
/// fails this task.
fn write_failure(task: &ConversionTask, error: std::io::Error) -> Result<Outcome, ConvertError> {
    if error.kind() == ErrorKind::StorageFull {
        tracing::error!(
            path = %task.input_path.display(),
            output = %task.output_path.display(),
            error = %error,
            "storage full, aborting run"
        );
        return Err(ConvertError::StorageFull {
            path: task.output_path.clone(),
            source: error,
        });
    }
    let reason = format!("failed to write {}: {}", task.output_path.display(), error);
    tracing::error!(path = %task.input_path.display(), %reason, "conversion failed");
    Ok(Outcome::Failed { reason })
}

/// Write `text` to a temporary file next to `path`, then rename it into
/// place. A write that fails part way leaves nothing at `path`; the
/// temporary file is removed when dropped.
fn write_output(path: &Path, text: &str) -> std::io::Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    std::fs::create_dir_all(parent)?;

    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(text.as_bytes())?;
    staged.flush()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(root: &Path) -> ConversionTask {
        ConversionTask {
            input_path: root.join("in").join("doc.pdf"),
            relative_path: PathBuf::from("doc.pdf"),
            output_path: root.join("out").join("doc.txt"),
        }
    }

    #[test]
    fn storage_full_aborts_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path());

        let err = write_failure(&task, std::io::Error::from(ErrorKind::StorageFull)).unwrap_err();
        match err {
            ConvertError::StorageFull { path, source } => {
                assert_eq!(path, task.output_path);
                assert_eq!(source.kind(), ErrorKind::StorageFull);
            }
            other => panic!("expected StorageFull, got {other:?}"),
        }
    }

    #[test]
    fn other_write_errors_fail_only_the_task() {
        let dir = tempfile::tempdir().unwrap();
        let task = task(dir.path());

        let outcome =
            write_failure(&task, std::io::Error::from(ErrorKind::PermissionDenied)).unwrap();
        match outcome {
            Outcome::Failed { reason } => assert!(reason.starts_with("failed to write")),
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn write_output_replaces_existing_file_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("doc.txt");

        write_output(&path, "a much longer first version of the text").unwrap();
        write_output(&path, "short").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "short");

        let entries: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("doc.txt")]);
    }

    #[test]
    fn failed_rename_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.txt");
        // A non-empty directory in the way makes the final rename fail after
        // the text has been written to the staging file.
        std::fs::create_dir_all(path.join("blocker")).unwrap();

        assert!(write_output(&path, "body").is_err());
        assert!(path.is_dir());
        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("doc.txt")]);
    }
}
