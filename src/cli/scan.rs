//! Scan command implementation.
//!
//! Handles `port-scanner scan <target> [options]`.

use crate::cli::OutputFormat;
use crate::config::{AppSettings, ScanOptions};
use crate::error::{ScanError, ScanResult};
use crate::output::{self, SaveOutcome};
use crate::progress::ConsoleProgress;
use crate::scanner::{run_scan, CancelFlag, ScanJob, ScanReport, ScanType};
use crate::services::ServiceCatalog;
use crate::types::{PortSet, ScanTarget};
use clap::Parser;
use std::path::{Path, PathBuf};

/// Scan a target for open ports.
///
/// Options left unset fall back to the application settings.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "scan")]
pub struct ScanCommand {
    /// Target to scan (IPv4 address or hostname)
    #[arg(value_name = "TARGET")]
    pub target: String,

    /// Ports to scan, e.g. "80", "80,443", "1-1000", "1-100,443,8080-8088" [default: 1-1024]
    #[arg(short = 'p', long, value_name = "RANGE")]
    pub ports: Option<String>,

    /// Worker thread count, clamped to 1-200 [default: 50]
    #[arg(short = 't', long, value_name = "COUNT", allow_negative_numbers = true)]
    pub threads: Option<i64>,

    /// Per-probe timeout in milliseconds, clamped to 100-10000 [default: 2000]
    #[arg(short = 'T', long, value_name = "MS", allow_negative_numbers = true)]
    pub timeout: Option<i64>,

    /// Scan type [default: connect]
    #[arg(short = 's', long = "scan-type", value_enum)]
    pub scan_type: Option<ScanType>,

    /// Grab banners from open TCP ports
    #[arg(short = 'b', long)]
    pub banner: bool,

    /// Print a line for every scanned port
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Save results to this file
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Format of the saved file [default: txt]
    #[arg(short = 'f', long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Hide the banner column in the console table
    #[arg(long)]
    pub no_banner: bool,
}

impl ScanCommand {
    /// Port specification after applying settings defaults.
    pub fn port_spec<'a>(&'a self, settings: &'a AppSettings) -> &'a str {
        self.ports.as_deref().unwrap_or(&settings.ports)
    }

    /// Scan options after applying settings defaults and clamping.
    pub fn options(&self, settings: &AppSettings) -> ScanOptions {
        ScanOptions::new(
            self.scan_type.unwrap_or(settings.scan_type),
            self.threads.unwrap_or(settings.threads),
            self.timeout.unwrap_or(settings.timeout_ms),
        )
        .with_banners(self.banner)
        .with_verbose(self.verbose)
    }

    /// Expand ports and resolve the target.
    ///
    /// # Errors
    /// `ScanError::Configuration` for an empty port set and
    /// `ScanError::Resolution` for an unresolvable target.
    pub fn build_job(&self, settings: &AppSettings) -> ScanResult<ScanJob> {
        let ports = PortSet::expand(self.port_spec(settings));
        if ports.is_empty() {
            return Err(ScanError::Configuration("invalid port range".to_string()));
        }
        let target = ScanTarget::resolve(&self.target)?;
        ScanJob::new(target, ports, self.options(settings))
    }

    /// Execute the scan command.
    ///
    /// Persistence failures are reported but do not fail the command.
    pub fn execute(&self, catalog: &ServiceCatalog, settings: &AppSettings) -> ScanResult<()> {
        let job = self.build_job(settings)?;
        output::print_scan_header(&job, self.port_spec(settings));

        let progress = ConsoleProgress::new(self.verbose);
        let cancel = CancelFlag::new();
        let report =
            run_scan(&job, catalog, &progress, &cancel).map_err(|e| self.with_root_hint(e))?;

        output::print_scan_summary(&report);
        if let Err(e) = output::print_results(&report.results, !self.no_banner) {
            tracing::warn!(error = %e, "failed to print results");
        }

        if let Some(path) = &self.output {
            let format = self.format.unwrap_or(settings.format);
            self.persist(&report, path, format);
        }

        Ok(())
    }

    /// Append the sudo hint to a privilege error so the abort stays one line.
    fn with_root_hint(&self, err: ScanError) -> ScanError {
        match err {
            ScanError::Permission(msg) if !is_root() => ScanError::Permission(format!(
                "{} (try: sudo pentk port-scanner scan {} -s syn)",
                msg, self.target
            )),
            other => other,
        }
    }

    fn persist(&self, report: &ScanReport, path: &Path, format: OutputFormat) {
        match output::save_results(path, format, &report.target.original, &report.results) {
            Ok(SaveOutcome::Written) => output::print_success(&format!(
                "Results saved to: {} (format: {})",
                path.display(),
                format
            )),
            Ok(SaveOutcome::NothingToSave) => output::print_info("No results to save"),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to save results");
                output::print_error(&format!("cannot create file {}: {}", path.display(), e));
            }
        }
    }
}

/// Check if running with root/admin privileges.
fn is_root() -> bool {
    #[cfg(unix)]
    {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> ScanCommand {
        ScanCommand::try_parse_from(std::iter::once("scan").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_defaults_from_settings() {
        let cmd = parse(&["192.168.1.1"]);
        let settings = AppSettings::default();

        assert_eq!(cmd.port_spec(&settings), "1-1024");
        let options = cmd.options(&settings);
        assert_eq!(options.threads, 50);
        assert_eq!(options.timeout_ms, 2000);
        assert_eq!(options.scan_type, ScanType::Connect);
        assert!(!options.grab_banners);
        assert!(!options.verbose);
        assert_eq!(cmd.format, None);
    }

    #[test]
    fn test_all_options() {
        let cmd = parse(&[
            "10.0.0.1",
            "-p",
            "80,443",
            "-t",
            "500",
            "-T",
            "-5",
            "-s",
            "udp",
            "-b",
            "-v",
            "-o",
            "out.json",
            "-f",
            "json",
            "--no-banner",
        ]);
        let options = cmd.options(&AppSettings::default());

        assert_eq!(cmd.port_spec(&AppSettings::default()), "80,443");
        assert_eq!(options.threads, 200);
        assert_eq!(options.timeout_ms, 100);
        assert_eq!(options.scan_type, ScanType::Udp);
        assert!(options.grab_banners);
        assert!(options.verbose);
        assert_eq!(cmd.output, Some(PathBuf::from("out.json")));
        assert_eq!(cmd.format, Some(OutputFormat::Json));
        assert!(cmd.no_banner);
    }

    #[test]
    fn test_long_options() {
        let cmd = parse(&[
            "host",
            "--ports",
            "22",
            "--threads",
            "4",
            "--timeout",
            "300",
            "--scan-type",
            "syn",
            "--banner",
            "--format",
            "csv",
        ]);
        let options = cmd.options(&AppSettings::default());
        assert_eq!(options.threads, 4);
        assert_eq!(options.timeout_ms, 300);
        assert_eq!(options.scan_type, ScanType::Syn);
        assert_eq!(cmd.format, Some(OutputFormat::Csv));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_type = ScanCommand::try_parse_from(["scan", "host", "-s", "xmas"]);
        assert!(bad_type.is_err());

        let bad_format = ScanCommand::try_parse_from(["scan", "host", "-f", "xml"]);
        assert!(bad_format.is_err());

        let missing_target = ScanCommand::try_parse_from(["scan"]);
        assert!(missing_target.is_err());
    }

    #[test]
    fn test_empty_port_spec_is_configuration_error() {
        let cmd = parse(&["127.0.0.1", "-p", "abc"]);
        let result = cmd.build_job(&AppSettings::default());
        assert!(matches!(result, Err(ScanError::Configuration(_))));
    }

    #[test]
    fn test_ipv6_target_is_resolution_error() {
        let cmd = parse(&["::1", "-p", "80"]);
        let result = cmd.build_job(&AppSettings::default());
        assert!(matches!(result, Err(ScanError::Resolution { .. })));
    }

    #[test]
    fn test_root_hint_is_single_line() {
        let cmd = parse(&["10.0.0.1", "-s", "syn"]);
        let err = cmd.with_root_hint(ScanError::Permission("raw socket refused".to_string()));
        let msg = err.to_string();
        assert!(!msg.contains('\n'));
        if is_root() {
            assert_eq!(msg, "Permission denied: raw socket refused");
        } else {
            assert!(msg.starts_with("Permission denied: raw socket refused"));
            assert!(msg.contains("sudo pentk port-scanner scan 10.0.0.1 -s syn"));
        }

        let other = cmd.with_root_hint(ScanError::Configuration("bad".to_string()));
        assert!(matches!(other, ScanError::Configuration(ref m) if m == "bad"));
    }

    #[test]
    fn test_execute_and_persist() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.json");
        let port_arg = port.to_string();

        let cmd = parse(&[
            "127.0.0.1",
            "-p",
            port_arg.as_str(),
            "-T",
            "500",
            "-o",
            path.to_str().unwrap(),
            "-f",
            "json",
        ]);
        cmd.execute(&ServiceCatalog::new(), &AppSettings::default())
            .unwrap();

        let saved: output::JsonReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.scan_info.target, "127.0.0.1");
        assert_eq!(saved.scan_info.open_ports, 1);
        assert_eq!(saved.results[0].port, port);
    }

    #[test]
    fn test_persistence_failure_does_not_fail_scan() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("no-such-dir").join("scan.txt");
        let port_arg = port.to_string();

        let cmd = parse(&[
            "127.0.0.1",
            "-p",
            port_arg.as_str(),
            "-o",
            path.to_str().unwrap(),
        ]);
        assert!(cmd
            .execute(&ServiceCatalog::new(), &AppSettings::default())
            .is_ok());
        assert!(!path.exists());
    }
}
