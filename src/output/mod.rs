//! Output formatting module.
//!
//! Renders the console table and persists results as plain text, JSON, or
//! CSV.

mod csv_format;
mod json_format;
mod plain;
mod txt_format;

pub use csv_format::write_csv;
pub use json_format::{write_json, JsonPortResult, JsonReport, ScanInfo};
pub use plain::{
    print_error, print_info, print_results, print_scan_header, print_scan_summary, print_success,
    write_table,
};
pub use txt_format::write_txt;

use crate::cli::OutputFormat;
use crate::scanner::PortResult;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Timestamp layout used in persisted files.
pub const SCAN_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What `save_results` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Written,
    /// No open ports; no file was created.
    NothingToSave,
}

/// Current local time in the persisted layout.
pub fn scan_time_now() -> String {
    chrono::Local::now().format(SCAN_TIME_FORMAT).to_string()
}

/// Render results in `format` to any writer.
pub fn write_results<W: Write>(
    out: &mut W,
    format: OutputFormat,
    target: &str,
    scan_time: &str,
    results: &[PortResult],
) -> io::Result<()> {
    match format {
        OutputFormat::Txt => write_txt(out, target, scan_time, results),
        OutputFormat::Csv => write_csv(out, results),
        OutputFormat::Json => write_json(out, target, scan_time, results),
    }
}

/// Persist results to `path`.
///
/// An empty result set writes nothing.
pub fn save_results(
    path: &Path,
    format: OutputFormat,
    target: &str,
    results: &[PortResult],
) -> io::Result<SaveOutcome> {
    if results.is_empty() {
        return Ok(SaveOutcome::NothingToSave);
    }

    let mut out = BufWriter::new(File::create(path)?);
    write_results(&mut out, format, target, &scan_time_now(), results)?;
    out.flush()?;

    tracing::debug!(path = %path.display(), %format, count = results.len(), "results saved");
    Ok(SaveOutcome::Written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{PortStatus, Protocol};
    use std::fs;
    use tempfile::TempDir;

    fn results() -> Vec<PortResult> {
        vec![
            PortResult::new(22, Protocol::Tcp, PortStatus::Open, "ssh").with_response_time(Some(2)),
            PortResult::new(80, Protocol::Tcp, PortStatus::Open, "http")
                .with_banner(Some("HTTP/1.1 200 OK".to_string())),
        ]
    }

    #[test]
    fn test_save_json_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("result.json");

        let outcome = save_results(&path, OutputFormat::Json, "127.0.0.1", &results()).unwrap();
        assert_eq!(outcome, SaveOutcome::Written);

        let parsed: JsonReport = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.scan_info.open_ports, 2);
        assert_eq!(parsed.results.len(), 2);
        assert!(chrono::NaiveDateTime::parse_from_str(&parsed.scan_info.scan_time, SCAN_TIME_FORMAT)
            .is_ok());
    }

    #[test]
    fn test_save_csv_and_txt_files() {
        let dir = TempDir::new().unwrap();

        let csv_path = dir.path().join("result.csv");
        save_results(&csv_path, OutputFormat::Csv, "host", &results()).unwrap();
        let csv = fs::read_to_string(&csv_path).unwrap();
        assert!(csv.starts_with("Port,Protocol,State,Service,Response_Time,Banner\n"));
        assert_eq!(csv.lines().count(), 3);

        let txt_path = dir.path().join("result.txt");
        save_results(&txt_path, OutputFormat::Txt, "host", &results()).unwrap();
        let txt = fs::read_to_string(&txt_path).unwrap();
        assert!(txt.contains("Port 80 (tcp):"));
    }

    #[test]
    fn test_empty_results_write_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("empty.json");

        let outcome = save_results(&path, OutputFormat::Json, "host", &[]).unwrap();
        assert_eq!(outcome, SaveOutcome::NothingToSave);
        assert!(!path.exists());
    }

    #[test]
    fn test_unwritable_path_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("out.txt");
        assert!(save_results(&path, OutputFormat::Txt, "host", &results()).is_err());
    }
}
