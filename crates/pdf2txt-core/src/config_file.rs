use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A config file that exists but could not be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// On-disk TOML configuration structure.
/// All fields are optional so partial configs work (merge with defaults).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub extraction: Option<ExtractionConfig>,
    pub output: Option<OutputConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    pub min_chars: Option<usize>,
    pub min_chars_per_page: Option<usize>,
    pub page_separator: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub extension: Option<String>,
    pub skip_existing: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub log_file: Option<String>,
    pub level: Option<String>,
}

/// Platform config directory path: `<config_dir>/pdf2txt/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("pdf2txt").join("config.toml"))
}

/// Load config by cascading CWD `.pdf2txt.toml` over platform config.
/// CWD values override platform values.
///
/// Files that cannot be read or parsed are skipped and returned alongside
/// the merged config, so the caller can report them once logging is up.
pub fn load_config() -> (ConfigFile, Vec<ConfigError>) {
    let mut layers: Vec<PathBuf> = config_path().into_iter().collect();
    layers.push(PathBuf::from(".pdf2txt.toml"));
    load_layers(&layers)
}

/// Merge the config files at `paths`, later files overriding earlier ones.
/// Missing files are ignored.
pub fn load_layers(paths: &[PathBuf]) -> (ConfigFile, Vec<ConfigError>) {
    let mut config = ConfigFile::default();
    let mut problems = Vec::new();
    for path in paths {
        match load_from_path(path) {
            Ok(Some(layer)) => config = merge(config, layer),
            Ok(None) => {}
            Err(e) => problems.push(e),
        }
    }
    (config, problems)
}

/// Load a config from a specific path. Returns `Ok(None)` if the file
/// doesn't exist.
pub fn load_from_path(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&content)
        .map(Some)
        .map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/// Merge two configs: `overlay` values take precedence over `base`.
pub fn merge(base: ConfigFile, overlay: ConfigFile) -> ConfigFile {
    let base_ex = base.extraction.unwrap_or_default();
    let over_ex = overlay.extraction.unwrap_or_default();
    let base_out = base.output.unwrap_or_default();
    let over_out = overlay.output.unwrap_or_default();
    let base_log = base.logging.unwrap_or_default();
    let over_log = overlay.logging.unwrap_or_default();

    ConfigFile {
        extraction: Some(ExtractionConfig {
            min_chars: over_ex.min_chars.or(base_ex.min_chars),
            min_chars_per_page: over_ex.min_chars_per_page.or(base_ex.min_chars_per_page),
            page_separator: over_ex.page_separator.or(base_ex.page_separator),
        }),
        output: Some(OutputConfig {
            extension: over_out.extension.or(base_out.extension),
            skip_existing: over_out.skip_existing.or(base_out.skip_existing),
        }),
        logging: Some(LoggingConfig {
            log_file: over_log.log_file.or(base_log.log_file),
            level: over_log.level.or(base_log.level),
        }),
    }
}
