use std::io::Write;
use std::path::Path;

use owo_colors::OwoColorize;
use pdf2txt_core::RunSummary;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print the number of PDFs discovered before processing starts.
pub fn print_found(w: &mut dyn Write, total: usize, color: ColorMode) -> std::io::Result<()> {
    if total == 0 {
        if color.enabled() {
            writeln!(w, "{}", "No PDF files found.".yellow())?;
        } else {
            writeln!(w, "No PDF files found.")?;
        }
    } else {
        writeln!(w, "Found {} PDF files.", total)?;
    }
    Ok(())
}

/// Print the final summary.
pub fn print_summary(
    w: &mut dyn Write,
    summary: &RunSummary,
    log_file: &Path,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    let sep = "=".repeat(40);
    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
        writeln!(w, "{}", "SUMMARY".bold())?;
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
        writeln!(w, "SUMMARY")?;
        writeln!(w, "{}", sep)?;
    }

    writeln!(w, "  Total files : {}", summary.total)?;
    if color.enabled() {
        writeln!(w, "  {} {}", "Converted   :".green(), summary.converted)?;
    } else {
        writeln!(w, "  Converted   : {}", summary.converted)?;
    }
    if summary.fell_back > 0 {
        let msg = format!("(via fallback engine: {})", summary.fell_back);
        if color.enabled() {
            writeln!(w, "    {}", msg.dimmed())?;
        } else {
            writeln!(w, "    {}", msg)?;
        }
    }
    writeln!(w, "  Skipped     : {}", summary.skipped)?;
    if summary.failed > 0 && color.enabled() {
        writeln!(w, "  {} {}", "Failed      :".red(), summary.failed)?;
    } else {
        writeln!(w, "  Failed      : {}", summary.failed)?;
    }
    writeln!(
        w,
        "  Time taken  : {:.2} seconds",
        summary.elapsed.as_secs_f64()
    )?;

    if !summary.failures.is_empty() {
        writeln!(w)?;
        for failure in &summary.failures {
            let name = failure.input_path.display().to_string();
            if color.enabled() {
                writeln!(w, "  {} {}", "FAILED".red(), name)?;
            } else {
                writeln!(w, "  FAILED {}", name)?;
            }
            writeln!(w, "         {}", truncate(&failure.reason, 160))?;
        }
        writeln!(w)?;
        writeln!(w, "Failures were logged to {}", log_file.display())?;
    }

    if color.enabled() {
        writeln!(w, "{}", sep.bold())?;
    } else {
        writeln!(w, "{}", sep)?;
    }
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
