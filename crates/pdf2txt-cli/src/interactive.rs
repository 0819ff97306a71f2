use std::io::{BufRead, Write};
use std::path::PathBuf;

use pdf2txt_core::validate_input_root;

/// Directories chosen at the interactive prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractivePaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Ask for the input and output directories.
///
/// Returns `Ok(None)` when the output directory is missing and the user
/// declines to create it. An invalid input directory is an error.
pub fn prompt_paths<R: BufRead, W: Write>(
    input: &mut R,
    out: &mut W,
) -> anyhow::Result<Option<InteractivePaths>> {
    writeln!(out, "\n=== PDF to Text Converter ===\n")?;

    let input_dir = PathBuf::from(ask(input, out, "Enter input directory: ")?);
    validate_input_root(&input_dir)?;

    let output_dir = PathBuf::from(ask(input, out, "Enter output directory: ")?);
    if output_dir.as_os_str().is_empty() {
        anyhow::bail!("Output directory must not be empty");
    }

    if !output_dir.exists() {
        let answer = ask(input, out, "Output directory doesn't exist. Create it? (y/n): ")?;
        if !answer.eq_ignore_ascii_case("y") {
            return Ok(None);
        }
        std::fs::create_dir_all(&output_dir)?;
    }

    Ok(Some(InteractivePaths {
        input: input_dir,
        output: output_dir,
    }))
}

/// Print `question`, read one line, and strip whitespace and surrounding
/// quotes (paths pasted from a file manager often carry them).
fn ask<R: BufRead, W: Write>(input: &mut R, out: &mut W, question: &str) -> anyhow::Result<String> {
    write!(out, "{}", question)?;
    out.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim().trim_matches('"').trim_matches('\'').to_string())
}
