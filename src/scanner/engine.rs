//! Worker pool that drives a scan job to completion.
//!
//! A fixed number of OS threads drain a shared atomic cursor over the port
//! set. Each claimed port is probed exactly once; open TCP ports may get a
//! banner grab inline on the same worker. The calling thread only reports
//! progress and joins the workers.

use crate::aggregator::{ResultAggregator, ScanStatistics};
use crate::banner::grab_banner;
use crate::config::ScanOptions;
use crate::error::{ScanError, ScanResult};
use crate::progress::{ProgressSink, PROGRESS_INTERVAL};
use crate::scanner::{create_scanner, PortResult, PortStatus, Protocol, ScanType, Scanner};
use crate::services::ServiceCatalog;
use crate::types::{PortSet, ScanTarget};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Granularity of the controller's completion check.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Everything one scan needs. Read-only once built.
#[derive(Debug, Clone)]
pub struct ScanJob {
    pub target: ScanTarget,
    pub ports: PortSet,
    pub options: ScanOptions,
}

impl ScanJob {
    /// Build a job, rejecting an empty port set.
    pub fn new(target: ScanTarget, ports: PortSet, options: ScanOptions) -> ScanResult<Self> {
        if ports.is_empty() {
            return Err(ScanError::Configuration("invalid port range".to_string()));
        }
        Ok(Self {
            target,
            ports,
            options,
        })
    }
}

/// Shared claim-and-increment index into the port set.
#[derive(Debug)]
pub struct Cursor {
    next: AtomicUsize,
    len: usize,
}

impl Cursor {
    pub fn new(len: usize) -> Self {
        Self {
            next: AtomicUsize::new(0),
            len,
        }
    }

    /// Claim the next unscanned index, or `None` once all are taken.
    pub fn claim(&self) -> Option<usize> {
        let index = self.next.fetch_add(1, Ordering::Relaxed);
        (index < self.len).then_some(index)
    }

    /// Number of indices handed out so far.
    pub fn claimed(&self) -> usize {
        self.next.load(Ordering::Relaxed).min(self.len)
    }
}

/// Cooperative cancellation flag, checked once per claim.
#[derive(Debug)]
pub struct CancelFlag {
    running: AtomicBool,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
        }
    }

    /// Ask workers to stop after their current probe.
    pub fn cancel(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }
}

impl Default for CancelFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of a finished (or cancelled) job.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub target: ScanTarget,
    pub scan_type: ScanType,
    pub total_ports: usize,
    pub stats: ScanStatistics,
    /// Open ports, sorted by port number.
    pub results: Vec<PortResult>,
    pub duration: Duration,
}

/// Run a job with the strategy named in its options.
///
/// # Errors
/// Fails before any worker starts if the strategy cannot be set up, e.g.
/// `ScanError::Permission` for a SYN scan without raw-socket rights.
pub fn run_scan(
    job: &ScanJob,
    catalog: &ServiceCatalog,
    progress: &dyn ProgressSink,
    cancel: &CancelFlag,
) -> ScanResult<ScanReport> {
    let scanner = create_scanner(job.options.scan_type, job.target.ip)?;
    Ok(execute(job, scanner.as_ref(), catalog, progress, cancel))
}

/// Run a job with an already constructed strategy.
pub fn execute(
    job: &ScanJob,
    scanner: &dyn Scanner,
    catalog: &ServiceCatalog,
    progress: &dyn ProgressSink,
    cancel: &CancelFlag,
) -> ScanReport {
    let total = job.ports.len();
    let workers = job.options.threads.max(1);
    let cursor = Cursor::new(total);
    let aggregator = ResultAggregator::with_capacity(total);
    let start = Instant::now();

    tracing::info!(
        host = %job.target,
        ports = total,
        workers,
        scan_type = %scanner.scan_type(),
        "scan started"
    );

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|id| {
                let worker = Worker {
                    id,
                    job,
                    scanner,
                    catalog,
                    cursor: &cursor,
                    aggregator: &aggregator,
                    progress,
                    cancel,
                };
                scope.spawn(move || worker.run())
            })
            .collect();

        let mut last_report = Instant::now();
        while handles.iter().any(|h| !h.is_finished()) {
            thread::sleep(POLL_INTERVAL);
            if last_report.elapsed() >= PROGRESS_INTERVAL {
                progress.update(aggregator.snapshot(), total);
                last_report = Instant::now();
            }
        }

        for (id, handle) in handles.into_iter().enumerate() {
            if handle.join().is_err() {
                tracing::warn!(worker = id, "worker thread panicked");
            }
        }
    });

    let (stats, mut results) = aggregator.into_parts();
    results.sort_by_key(|r| r.port);
    progress.finish(stats, total);

    let duration = start.elapsed();
    tracing::info!(
        scanned = stats.scanned,
        open = stats.open,
        claimed = cursor.claimed(),
        elapsed_ms = duration.as_millis() as u64,
        "scan finished"
    );

    ScanReport {
        target: job.target.clone(),
        scan_type: scanner.scan_type(),
        total_ports: total,
        stats,
        results,
        duration,
    }
}

/// Borrowed view of the shared job state held by one worker thread.
struct Worker<'a> {
    id: usize,
    job: &'a ScanJob,
    scanner: &'a dyn Scanner,
    catalog: &'a ServiceCatalog,
    cursor: &'a Cursor,
    aggregator: &'a ResultAggregator,
    progress: &'a dyn ProgressSink,
    cancel: &'a CancelFlag,
}

impl Worker<'_> {
    fn run(self) {
        let target = self.job.target.ip;
        let timeout = self.job.options.timeout();
        let protocol = self.scanner.protocol();

        while self.cancel.is_running() {
            let Some(index) = self.cursor.claim() else {
                break;
            };
            let port = self.job.ports[index];

            let probe = self.scanner.probe(target, port, timeout);
            tracing::debug!(worker = self.id, port, status = %probe.status, "probed");

            let service = self.catalog.lookup(port, protocol.as_str());
            let mut result = PortResult::new(port, protocol, probe.status, service)
                .with_response_time(probe.latency_ms);

            if probe.status == PortStatus::Open
                && protocol == Protocol::Tcp
                && self.job.options.grab_banners
            {
                result = result.with_banner(grab_banner(target, port, timeout));
            }

            self.aggregator.record(result);
            self.progress.port_scanned(self.id, port, probe.status);
        }
    }
}
