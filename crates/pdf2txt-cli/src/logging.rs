use std::fs::OpenOptions;
use std::path::Path;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// `RUST_LOG` if set, otherwise `level`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Filter for the log file. Fallback and failure entries are logged at
/// `info` and above, so a quieter setting is raised to `info`.
fn file_filter(level: &str) -> EnvFilter {
    let filter = env_filter(level);
    match filter.max_level_hint() {
        Some(max) if max < LevelFilter::INFO => EnvFilter::new("info"),
        _ => filter,
    }
}

/// Subscriber writing plain (no ANSI) timestamped lines to `writer`, plus a
/// stderr copy at the configured level when `verbose` is set.
pub fn subscriber<W>(
    writer: W,
    level: &str,
    verbose: bool,
) -> impl Subscriber + Send + Sync + use<W>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_filter(file_filter(level));

    let console_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(env_filter(level))
    });

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
}

/// Open `path` for appending and install the global subscriber.
///
/// The returned guard flushes buffered lines when dropped, so it must live
/// until the process is about to exit.
pub fn init(path: &Path, level: &str, verbose: bool) -> anyhow::Result<WorkerGuard> {
    let (writer, guard) = open_append(path)?;
    tracing::subscriber::set_global_default(subscriber(writer, level, verbose))?;
    Ok(guard)
}

fn open_append(
    path: &Path,
) -> anyhow::Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_appender::non_blocking(file))
}
