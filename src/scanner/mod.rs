//! Scanner module - coordinates different scanning techniques.
//!
//! This module provides a unified interface for TCP connect, SYN, and UDP
//! scanning, and the worker pool that runs them concurrently on OS threads.

pub mod engine;
pub mod syn;
pub mod tcp;
pub mod traits;
pub mod udp;

use crate::error::ScanResult;
use std::net::Ipv4Addr;

pub use engine::{execute, run_scan, CancelFlag, Cursor, ScanJob, ScanReport};
pub use syn::SynScanner;
pub use tcp::TcpConnectScanner;
pub use traits::{BoxedScanner, PortResult, PortStatus, Probe, Protocol, ScanType, Scanner};
pub use udp::UdpScanner;

/// Build the strategy for `scan_type`.
///
/// Strategy setup is the only step that can fail; the SYN privilege check
/// happens here, once per job.
pub fn create_scanner(scan_type: ScanType, target: Ipv4Addr) -> ScanResult<BoxedScanner> {
    let scanner: BoxedScanner = match scan_type {
        ScanType::Connect => Box::new(TcpConnectScanner::new()),
        ScanType::Syn => Box::new(SynScanner::new(target)?),
        ScanType::Udp => Box::new(UdpScanner::new()),
    };
    Ok(scanner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_unprivileged_scanners() {
        let connect = create_scanner(ScanType::Connect, Ipv4Addr::LOCALHOST).unwrap();
        assert_eq!(connect.scan_type(), ScanType::Connect);

        let udp = create_scanner(ScanType::Udp, Ipv4Addr::LOCALHOST).unwrap();
        assert_eq!(udp.protocol(), Protocol::Udp);
    }
}
