use std::path::PathBuf;

use pdf2txt_core::config_file::ConfigFile;
use pdf2txt_core::walker::DEFAULT_TEXT_EXTENSION;
use pdf2txt_core::{AdequacyPolicy, DEFAULT_MIN_CHARS};

use crate::Cli;

/// Log file used when neither a flag, env var nor config file names one.
pub const DEFAULT_LOG_FILE: &str = "pdf_processing.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Fully resolved run settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub policy: AdequacyPolicy,
    pub page_separator: String,
    pub extension: String,
    pub skip_existing: bool,
    pub log_file: PathBuf,
    pub log_level: String,
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
pub fn resolve(cli: &Cli, file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> Settings {
    let extraction = file.extraction.clone().unwrap_or_default();
    let output = file.output.clone().unwrap_or_default();
    let logging = file.logging.clone().unwrap_or_default();

    let env_usize = |key: &str| env(key).and_then(|v| v.trim().parse::<usize>().ok());

    let min_chars = cli
        .min_chars
        .or_else(|| env_usize("PDF2TXT_MIN_CHARS"))
        .or(extraction.min_chars)
        .unwrap_or(DEFAULT_MIN_CHARS);
    let min_chars_per_page = cli
        .min_chars_per_page
        .or_else(|| env_usize("PDF2TXT_MIN_CHARS_PER_PAGE"))
        .or(extraction.min_chars_per_page)
        .unwrap_or(0);

    let log_file = cli
        .log_file
        .clone()
        .or_else(|| env("PDF2TXT_LOG_FILE").map(PathBuf::from))
        .or_else(|| logging.log_file.map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE));

    let extension = output
        .extension
        .map(|e| e.trim_start_matches('.').to_string())
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| DEFAULT_TEXT_EXTENSION.to_string());

    Settings {
        policy: AdequacyPolicy::new(min_chars, min_chars_per_page),
        page_separator: extraction.page_separator.unwrap_or_else(|| "\n".to_string()),
        extension,
        skip_existing: cli.skip_existing || output.skip_existing.unwrap_or(false),
        log_file,
        log_level: logging.level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
    }
}
