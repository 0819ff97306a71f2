use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use pdf2txt_core::{ConvertOptions, ExtractionEngine, ProgressEvent, config_file};
use pdf2txt_lopdf::LopdfBackend;
use pdf2txt_mupdf::MupdfBackend;

mod interactive;
mod logging;
mod output;
mod settings;

use output::ColorMode;

/// Recursively convert PDFs in a directory to plain text files.
///
/// Text is extracted with MuPDF first; when that looks too weak (fewer
/// characters than the adequacy threshold), lopdf is tried and the richer
/// result kept.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input directory containing PDF files
    #[arg(long, required_unless_present = "interactive")]
    input: Option<PathBuf>,

    /// Output directory for text files
    #[arg(long, required_unless_present = "interactive")]
    output: Option<PathBuf>,

    /// Minimum characters before the fallback engine is tried [default: 50]
    #[arg(long)]
    min_chars: Option<usize>,

    /// Minimum characters per page before the fallback engine is tried [default: 0, off]
    #[arg(long)]
    min_chars_per_page: Option<usize>,

    /// Skip PDFs whose text file already exists
    #[arg(long)]
    skip_existing: bool,

    /// Append-only log file [default: pdf_processing.log]
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Path to a TOML config file (replaces the platform and ./.pdf2txt.toml lookup)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also print log lines to stderr (disables the progress bar)
    #[arg(short, long)]
    verbose: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Prompt for directories instead of taking them from flags
    #[arg(long, conflicts_with_all = ["input", "output"])]
    interactive: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let (file_config, config_problems) = match cli.config {
        Some(ref path) => match config_file::load_from_path(path)? {
            Some(config) => (config, Vec::new()),
            None => anyhow::bail!("Config file not found: {}", path.display()),
        },
        None => config_file::load_config(),
    };
    let mut settings = settings::resolve(&cli, &file_config, |key| std::env::var(key).ok());

    // Held until main returns so buffered log lines are flushed on every exit path.
    let _log_guard = logging::init(&settings.log_file, &settings.log_level, cli.verbose)?;
    for problem in &config_problems {
        tracing::warn!(error = %problem, "ignoring config file");
    }

    let (input_dir, output_dir) = if cli.interactive {
        let stdin = std::io::stdin();
        match interactive::prompt_paths(&mut stdin.lock(), &mut std::io::stdout())? {
            Some(paths) => {
                settings.skip_existing = true;
                (paths.input, paths.output)
            }
            None => return Ok(()),
        }
    } else {
        match (cli.input.clone(), cli.output.clone()) {
            (Some(input), Some(output)) => (input, output),
            _ => anyhow::bail!("--input and --output are required"),
        }
    };

    if let Err(e) = pdf2txt_core::validate_input_root(&input_dir) {
        tracing::error!(input = %input_dir.display(), error = %e, "invalid input directory");
        return Err(e.into());
    }

    let color = ColorMode(!cli.no_color);
    let engine = ExtractionEngine::new(Box::new(MupdfBackend::new()), settings.policy)
        .with_fallback(Box::new(LopdfBackend::new()))
        .with_page_separator(settings.page_separator.clone());
    let options = ConvertOptions {
        extension: settings.extension.clone(),
        skip_existing: settings.skip_existing,
    };

    tracing::info!(
        backends = ?engine.backend_names(),
        min_chars = settings.policy.min_chars,
        min_chars_per_page = settings.policy.min_chars_per_page,
        skip_existing = options.skip_existing,
        "engine configured"
    );

    let bar = if cli.no_progress || cli.verbose {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(0)
    };
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} Processing PDFs [{bar:40.green/dim}] {pos}/{len} (eta {eta}) {wide_msg}",
        )?
        .progress_chars("=> "),
    );

    let mut report_error: Option<std::io::Error> = None;
    let summary = pdf2txt_core::convert_tree(
        &input_dir,
        &output_dir,
        &engine,
        &options,
        |event| match event {
            ProgressEvent::Started { total } => {
                if let Err(e) =
                    bar.suspend(|| output::print_found(&mut std::io::stdout(), total, color))
                {
                    report_error = Some(e);
                }
                bar.set_length(total as u64);
                bar.enable_steady_tick(Duration::from_millis(120));
            }
            ProgressEvent::FileStarted { path, .. } => {
                let name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| path.display().to_string());
                bar.set_message(name);
            }
            ProgressEvent::FileFinished { .. } => bar.inc(1),
        },
    );
    bar.finish_and_clear();

    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            tracing::error!(error = %e, "run aborted");
            return Err(e.into());
        }
    };
    if let Some(e) = report_error {
        return Err(e.into());
    }

    let mut stdout = std::io::stdout();
    if summary.total > 0 {
        output::print_summary(&mut stdout, &summary, &settings.log_file, color)?;
    }
    writeln!(stdout, "Processing complete.")?;

    Ok(())
}
