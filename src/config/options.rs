//! Per-run scan options.

use crate::scanner::ScanType;
use std::time::Duration;

/// Minimum number of worker threads.
pub const MIN_THREADS: usize = 1;
/// Maximum number of worker threads.
pub const MAX_THREADS: usize = 200;
/// Minimum per-probe timeout in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 100;
/// Maximum per-probe timeout in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 10_000;

/// Options for one scan job. Immutable once the job starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Strategy used to probe each port.
    pub scan_type: ScanType,
    /// Worker thread count, clamped to `[1, 200]`.
    pub threads: usize,
    /// Per-probe timeout in milliseconds, clamped to `[100, 10000]`.
    pub timeout_ms: u64,
    /// Grab banners from open TCP ports.
    pub grab_banners: bool,
    /// Emit one line per probed port.
    pub verbose: bool,
}

impl ScanOptions {
    /// Create options with clamped thread count and timeout.
    pub fn new(scan_type: ScanType, threads: i64, timeout_ms: i64) -> Self {
        Self {
            scan_type,
            threads: clamp_threads(threads),
            timeout_ms: clamp_timeout(timeout_ms),
            grab_banners: false,
            verbose: false,
        }
    }

    /// Enable or disable banner grabbing.
    pub fn with_banners(mut self, enabled: bool) -> Self {
        self.grab_banners = enabled;
        self
    }

    /// Enable or disable per-port output.
    pub fn with_verbose(mut self, enabled: bool) -> Self {
        self.verbose = enabled;
        self
    }

    /// The timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self::new(ScanType::Connect, 50, 2000)
    }
}

fn clamp_threads(threads: i64) -> usize {
    threads.clamp(MIN_THREADS as i64, MAX_THREADS as i64) as usize
}

fn clamp_timeout(timeout_ms: i64) -> u64 {
    timeout_ms.clamp(MIN_TIMEOUT_MS as i64, MAX_TIMEOUT_MS as i64) as u64
}
