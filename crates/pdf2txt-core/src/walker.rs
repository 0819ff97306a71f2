use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Default extension of produced text files.
pub const DEFAULT_TEXT_EXTENSION: &str = "txt";

#[derive(Error, Debug)]
pub enum WalkError {
    #[error("input directory does not exist: {}", .0.display())]
    NotFound(PathBuf),
    #[error("input path must be a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("input directory is not readable: {}: {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One input PDF and the text file it converts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTask {
    pub input_path: PathBuf,
    /// Path of the PDF relative to the input root.
    pub relative_path: PathBuf,
    pub output_path: PathBuf,
}

/// Check that `root` exists, is a directory and can be listed.
pub fn validate_input_root(root: &Path) -> Result<(), WalkError> {
    if !root.exists() {
        return Err(WalkError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root.to_path_buf()));
    }
    std::fs::read_dir(root).map_err(|source| WalkError::Unreadable {
        path: root.to_path_buf(),
        source,
    })?;
    Ok(())
}

/// Whether `path` has a `.pdf` extension (any case).
pub fn is_pdf(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Lazily walk `input_root` and yield `(input_path, relative_path)` for every
/// PDF below it. Entries are visited in file-name order so the sequence is
/// stable for an unchanged tree. Symlinks are not followed, and entries that
/// cannot be read are logged and skipped.
pub fn enumerate(input_root: &Path) -> impl Iterator<Item = (PathBuf, PathBuf)> + use<> {
    let root = input_root.to_path_buf();
    WalkDir::new(&root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                tracing::warn!(
                    path = ?err.path().map(|p| p.display().to_string()),
                    error = %err,
                    "skipping unreadable entry"
                );
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && is_pdf(entry.path()))
        .filter_map(move |entry| {
            let relative = entry.path().strip_prefix(&root).ok()?.to_path_buf();
            Some((entry.into_path(), relative))
        })
}

/// `output_root/relative_path` with its extension replaced by `extension`.
pub fn output_path_for(output_root: &Path, relative_path: &Path, extension: &str) -> PathBuf {
    output_root.join(relative_path).with_extension(extension)
}

/// Enumerate `input_root` and map every PDF to its [`ConversionTask`].
///
/// Every task gets its own output path. When two PDFs differ only in the
/// case of their extension (`a.pdf`, `a.PDF`), the one walked second keeps
/// its source extension in the output name (`a.pdf.txt`).
pub fn tasks(
    input_root: &Path,
    output_root: &Path,
    extension: &str,
) -> impl Iterator<Item = ConversionTask> + use<> {
    let output_root = output_root.to_path_buf();
    let extension = extension.to_string();
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    enumerate(input_root).map(move |(input_path, relative_path)| {
        let mut output_path = output_path_for(&output_root, &relative_path, &extension);
        if claimed.contains(&output_path) {
            let taken = output_path;
            output_path =
                unclaimed_output_path(&output_root, &relative_path, &extension, &claimed);
            tracing::warn!(
                path = %input_path.display(),
                taken = %taken.display(),
                output = %output_path.display(),
                "output name already used by another PDF, keeping the source extension"
            );
        }
        claimed.insert(output_path.clone());
        ConversionTask {
            output_path,
            input_path,
            relative_path,
        }
    })
}

/// `output_root/relative_path.extension`, numbered (`a.pdf.1.txt`) until it
/// is not in `claimed`.
fn unclaimed_output_path(
    output_root: &Path,
    relative_path: &Path,
    extension: &str,
    claimed: &HashSet<PathBuf>,
) -> PathBuf {
    let base = output_root.join(relative_path).into_os_string();
    (0usize..)
        .map(|n| {
            let mut name = OsString::from(&base);
            if n > 0 {
                name.push(format!(".{n}"));
            }
            name.push(".");
            name.push(extension);
            PathBuf::from(name)
        })
        .find(|candidate| !claimed.contains(candidate))
        .unwrap_or_else(|| output_path_for(output_root, relative_path, extension))
}
