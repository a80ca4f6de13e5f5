//! Error types for the scanner.
//!
//! Uses `thiserror` for ergonomic error definitions. Only pre-flight and
//! I/O failures are errors; per-port outcomes are data (`PortStatus`).

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for scanning operations.
#[derive(Error, Debug)]
pub enum ScanError {
    /// Empty or invalid port specification, or an invalid flag.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The target could not be turned into an IPv4 address.
    #[error("Failed to resolve target '{target}': {reason}")]
    Resolution { target: String, reason: String },

    /// Raw-socket scan requested without the required privilege.
    #[error("Permission denied: {0}")]
    Permission(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScanError {
    /// Shorthand for a resolution failure.
    pub fn resolution(target: impl Into<String>, reason: impl ToString) -> Self {
        Self::Resolution {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

/// Result type alias for scan operations.
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors raised while loading application settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine the configuration directory")]
    DirectoryNotFound,

    #[error("Failed to read {path}: {reason}")]
    ReadFailed { path: PathBuf, reason: String },

    #[error("Invalid settings format: {0}")]
    InvalidFormat(String),
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
