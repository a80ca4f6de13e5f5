//! Progress reporting while a scan runs.
//!
//! The console line keeps the `进度:` and `开放端口:` tokens verbatim so
//! front ends that scrape stdout keep working.

use crate::aggregator::ScanStatistics;
use crate::scanner::PortStatus;
use std::io::{self, Write};
use std::time::Duration;

/// How often the controlling thread emits a progress line.
pub const PROGRESS_INTERVAL: Duration = Duration::from_secs(2);

/// Observer of a running scan. Implementations must not block for long;
/// `port_scanned` is called from worker threads.
pub trait ProgressSink: Send + Sync {
    /// Periodic snapshot from the controlling thread.
    fn update(&self, stats: ScanStatistics, total: usize);

    /// One port finished. Called from the worker that scanned it.
    fn port_scanned(&self, _worker: usize, _port: u16, _status: PortStatus) {}

    /// All workers have been joined.
    fn finish(&self, _stats: ScanStatistics, _total: usize) {}
}

/// Render the scrapeable progress line.
pub fn render_line(stats: ScanStatistics, total: usize) -> String {
    let pct = if total == 0 {
        0.0
    } else {
        stats.scanned as f64 / total as f64 * 100.0
    };
    format!(
        "进度: {}/{} ({:.1}%) - 开放端口: {}",
        stats.scanned, total, pct, stats.open
    )
}

/// Render the verbose per-port line.
pub fn render_port_line(worker: usize, port: u16, status: PortStatus) -> String {
    format!("Thread {}: port {} - {}", worker, port, status)
}

/// Writes progress to stdout, overwriting the line in place.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleProgress {
    verbose: bool,
}

impl ConsoleProgress {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressSink for ConsoleProgress {
    fn update(&self, stats: ScanStatistics, total: usize) {
        let mut out = io::stdout().lock();
        // Progress is best effort; a closed stdout must not stop the scan.
        let _ = write!(out, "{}\r", render_line(stats, total));
        let _ = out.flush();
    }

    fn port_scanned(&self, worker: usize, port: u16, status: PortStatus) {
        if self.verbose {
            println!("{}", render_port_line(worker, port, status));
        }
    }

    fn finish(&self, stats: ScanStatistics, total: usize) {
        println!("{}", render_line(stats, total));
    }
}

/// Discards all progress.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn update(&self, _stats: ScanStatistics, _total: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_line() {
        let stats = ScanStatistics {
            scanned: 512,
            open: 3,
            closed: 500,
            filtered: 9,
        };
        assert_eq!(
            render_line(stats, 1024),
            "进度: 512/1024 (50.0%) - 开放端口: 3"
        );
    }

    #[test]
    fn test_render_line_rounding_and_empty() {
        let stats = ScanStatistics {
            scanned: 1,
            open: 0,
            closed: 1,
            filtered: 0,
        };
        assert_eq!(render_line(stats, 3), "进度: 1/3 (33.3%) - 开放端口: 0");
        assert_eq!(
            render_line(ScanStatistics::default(), 0),
            "进度: 0/0 (0.0%) - 开放端口: 0"
        );
    }

    #[test]
    fn test_render_port_line() {
        assert_eq!(
            render_port_line(4, 443, PortStatus::Filtered),
            "Thread 4: port 443 - filtered"
        );
    }
}
