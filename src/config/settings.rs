//! Application settings.
//!
//! Supplies the defaults for the `scan` command. Settings are read from
//! `<config dir>/pentk/scanner.json` if present; the file is never created
//! or written by the scanner.

use crate::cli::OutputFormat;
use crate::error::{ConfigError, ConfigResult};
use crate::scanner::ScanType;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "scanner.json";

/// Defaults applied when a flag is not given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Default port specification.
    pub ports: String,
    /// Default worker thread count.
    pub threads: i64,
    /// Default timeout in milliseconds.
    pub timeout_ms: i64,
    /// Default scan type.
    pub scan_type: ScanType,
    /// Default persisted output format.
    pub format: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            ports: "1-1024".to_string(),
            threads: 50,
            timeout_ms: 2000,
            scan_type: ScanType::Connect,
            format: OutputFormat::Txt,
        }
    }
}

impl AppSettings {
    /// Location of the settings file, if a config directory exists.
    pub fn default_path() -> ConfigResult<PathBuf> {
        let project =
            ProjectDirs::from("com", "pentk", "pentk").ok_or(ConfigError::DirectoryNotFound)?;
        Ok(project.config_dir().join(SETTINGS_FILE))
    }

    /// Load settings from the default location.
    ///
    /// A missing file is not an error and yields the defaults.
    pub fn load() -> ConfigResult<Self> {
        let path = Self::default_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))
    }

    /// Load settings, falling back to the defaults on any failure.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "ignoring scanner settings");
            Self::default()
        })
    }
}
