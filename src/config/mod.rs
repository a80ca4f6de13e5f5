//! Configuration for the scanner.
//!
//! `ScanOptions` holds the validated knobs of one run; `AppSettings`
//! supplies the command defaults from an optional settings file.

mod options;
mod settings;

pub use options::{ScanOptions, MAX_THREADS, MAX_TIMEOUT_MS, MIN_THREADS, MIN_TIMEOUT_MS};
pub use settings::{AppSettings, SETTINGS_FILE};
