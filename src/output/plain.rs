//! Console output.
//!
//! Produces the human-readable scan header, summary, and result table.
//! Everything here goes straight to stdout/stderr, never through tracing.

use crate::scanner::{PortResult, ScanJob, ScanReport};
use console::style;
use std::io::{self, Write};

const RULE: &str = "========================================";
const TABLE_RULE: &str =
    "================================================================================";

/// Print the scan parameters before workers start.
pub fn print_scan_header(job: &ScanJob, port_spec: &str) {
    let options = &job.options;
    println!(
        "Starting scan of {} ({})",
        style(&job.target.original).bold(),
        job.target.ip
    );
    println!("Ports: {} ({} ports)", port_spec, job.ports.len());
    println!(
        "Threads: {}, Timeout: {}ms, Scan type: {}",
        options.threads, options.timeout_ms, options.scan_type
    );
    println!(
        "Banner grabbing: {}",
        if options.grab_banners {
            "enabled"
        } else {
            "disabled"
        }
    );
    println!("{}", RULE);
}

/// Print elapsed time and per-state counts after the workers are joined.
pub fn print_scan_summary(report: &ScanReport) {
    let stats = &report.stats;
    println!();
    println!("{}", style("Scan complete!").green().bold());
    println!("Scan time: {:.2}s", report.duration.as_secs_f64());
    println!(
        "Statistics: open={}, closed={}, filtered={}",
        style(stats.open).green().bold(),
        style(stats.closed).red(),
        style(stats.filtered).yellow()
    );
}

/// Print the open-port table to stdout.
pub fn print_results(results: &[PortResult], show_banner: bool) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    write_table(&mut out, results, show_banner)?;
    out.flush()
}

/// Render the open-port table.
///
/// The banner column is dropped when `show_banner` is false.
pub fn write_table<W: Write>(
    out: &mut W,
    results: &[PortResult],
    show_banner: bool,
) -> io::Result<()> {
    if results.is_empty() {
        writeln!(out, "No open ports found")?;
        return Ok(());
    }

    writeln!(out)?;
    writeln!(out, "Scan results ({} open ports):", results.len())?;
    writeln!(out, "{}", TABLE_RULE)?;

    let header = format!(
        "{:<8} {:<8} {:<10} {:<20} {:<10}",
        "PORT", "PROTOCOL", "STATE", "SERVICE", "RESPONSE"
    );
    let rule = format!(
        "{:<8} {:<8} {:<10} {:<20} {:<10}",
        "----", "--------", "-----", "-------", "--------"
    );
    if show_banner {
        writeln!(out, "{} {}", header, "BANNER")?;
        writeln!(out, "{} {}", rule, "------")?;
    } else {
        writeln!(out, "{}", header.trim_end())?;
        writeln!(out, "{}", rule.trim_end())?;
    }

    for result in results {
        let row = format!(
            "{:<8} {:<8} {:<10} {:<20} {:<10}",
            result.port,
            result.protocol,
            result.status,
            result.service,
            format!("{}ms", result.response_time_ms.unwrap_or(0)),
        );
        if show_banner {
            let banner = result.banner.as_deref().unwrap_or("");
            writeln!(out, "{} {}", row, banner)?;
        } else {
            writeln!(out, "{}", row.trim_end())?;
        }
    }

    Ok(())
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{PortStatus, Protocol};

    fn render(results: &[PortResult], show_banner: bool) -> String {
        let mut buf = Vec::new();
        write_table(&mut buf, results, show_banner).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn sample() -> Vec<PortResult> {
        vec![
            PortResult::new(22, Protocol::Tcp, PortStatus::Open, "ssh")
                .with_response_time(Some(3))
                .with_banner(Some("SSH-2.0-OpenSSH_9.6".to_string())),
            PortResult::new(80, Protocol::Tcp, PortStatus::Open, "http"),
        ]
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render(&[], true), "No open ports found\n");
    }

    #[test]
    fn test_table_with_banner() {
        let text = render(&sample(), true);
        assert!(text.contains("Scan results (2 open ports):"));
        assert!(text.contains("BANNER"));

        let ssh = text.lines().find(|l| l.starts_with("22 ")).unwrap();
        assert!(ssh.contains("tcp"));
        assert!(ssh.contains("open"));
        assert!(ssh.contains("ssh"));
        assert!(ssh.contains("3ms"));
        assert!(ssh.ends_with("SSH-2.0-OpenSSH_9.6"));

        let http = text.lines().find(|l| l.starts_with("80 ")).unwrap();
        assert!(http.contains("0ms"));
    }

    #[test]
    fn test_table_without_banner() {
        let text = render(&sample(), false);
        assert!(!text.contains("BANNER"));
        assert!(!text.contains("OpenSSH"));
        assert!(text.lines().all(|l| l == l.trim_end()));
    }
}
