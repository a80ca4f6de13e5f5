//! Shared result collection for a running scan.
//!
//! Workers record one outcome per claimed port. Counters are kept for
//! every outcome; only open ports are retained in the result list.

use crate::scanner::{PortResult, PortStatus};
use serde::Serialize;
use std::sync::{Mutex, MutexGuard};

/// Running counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStatistics {
    pub scanned: usize,
    pub open: usize,
    pub closed: usize,
    pub filtered: usize,
}

impl ScanStatistics {
    fn record(&mut self, status: PortStatus) {
        self.scanned += 1;
        match status {
            PortStatus::Open => self.open += 1,
            PortStatus::Closed => self.closed += 1,
            PortStatus::Filtered => self.filtered += 1,
        }
    }

    /// Whether every scanned port landed in exactly one state bucket.
    pub fn is_consistent(&self) -> bool {
        self.scanned == self.open + self.closed + self.filtered
    }
}

#[derive(Debug, Default)]
struct Inner {
    stats: ScanStatistics,
    results: Vec<PortResult>,
}

/// Mutex-guarded statistics and open-port list.
#[derive(Debug, Default)]
pub struct ResultAggregator {
    inner: Mutex<Inner>,
}

impl ResultAggregator {
    /// Create an aggregator sized for `expected` ports.
    pub fn with_capacity(expected: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                stats: ScanStatistics::default(),
                results: Vec::with_capacity(expected.min(1024)),
            }),
        }
    }

    /// A panicking worker must not take the whole scan down with it.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record one outcome.
    pub fn record(&self, result: PortResult) {
        let mut inner = self.lock();
        inner.stats.record(result.status);
        if result.is_open() {
            inner.results.push(result);
        }
    }

    /// Copy of the current counters.
    pub fn snapshot(&self) -> ScanStatistics {
        self.lock().stats
    }

    /// Consume the aggregator, returning the final counters and open ports.
    pub fn into_parts(self) -> (ScanStatistics, Vec<PortResult>) {
        let inner = self
            .inner
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        (inner.stats, inner.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::Protocol;
    use std::sync::Arc;
    use std::thread;

    fn result(port: u16, status: PortStatus) -> PortResult {
        PortResult::new(port, Protocol::Tcp, status, "unknown")
    }

    #[test]
    fn test_only_open_results_kept() {
        let agg = ResultAggregator::default();
        agg.record(result(22, PortStatus::Open));
        agg.record(result(23, PortStatus::Closed));
        agg.record(result(24, PortStatus::Filtered));
        agg.record(result(80, PortStatus::Open));

        let (stats, results) = agg.into_parts();
        assert_eq!(
            stats,
            ScanStatistics {
                scanned: 4,
                open: 2,
                closed: 1,
                filtered: 1
            }
        );
        assert!(stats.is_consistent());
        assert_eq!(
            results.iter().map(|r| r.port).collect::<Vec<_>>(),
            vec![22, 80]
        );
    }

    #[test]
    fn test_concurrent_recording() {
        let agg = Arc::new(ResultAggregator::with_capacity(800));

        let handles: Vec<_> = (0..8u16)
            .map(|t| {
                let agg = Arc::clone(&agg);
                thread::spawn(move || {
                    for i in 0..100u16 {
                        let status = match i % 3 {
                            0 => PortStatus::Open,
                            1 => PortStatus::Closed,
                            _ => PortStatus::Filtered,
                        };
                        agg.record(result(t * 100 + i + 1, status));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let snap = agg.snapshot();
        assert_eq!(snap.scanned, 800);
        assert!(snap.is_consistent());

        let agg = Arc::try_unwrap(agg).unwrap();
        let (stats, results) = agg.into_parts();
        assert_eq!(results.len(), stats.open);
        assert_eq!(stats.open, 8 * 34);
    }

    #[test]
    fn test_survives_poisoned_lock() {
        let agg = Arc::new(ResultAggregator::default());
        let poisoner = Arc::clone(&agg);
        let _ = thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("worker panicked while recording");
        })
        .join();

        agg.record(result(443, PortStatus::Open));
        assert_eq!(agg.snapshot().open, 1);
    }
}
