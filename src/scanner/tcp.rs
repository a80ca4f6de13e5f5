//! TCP Connect Scanner implementation.
//!
//! Performs standard TCP connect scans using the operating system's
//! socket API. This is the most reliable scanning method but also the
//! most detectable as it completes the full TCP handshake.
//!
//! # Known limitation
//!
//! Every connect failure (refusal, timeout, unreachable) is reported as
//! `Closed`. This scanner never reports `Filtered`.

use crate::scanner::traits::{PortStatus, Probe, ScanType, Scanner};
use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::{Duration, Instant};

/// TCP Connect Scanner.
///
/// Uses standard socket connect() calls to determine port status.
/// Does not require elevated privileges.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnectScanner;

impl TcpConnectScanner {
    /// Create a new TCP connect scanner.
    pub fn new() -> Self {
        Self
    }
}

/// Open a TCP connection with send/receive timeouts already applied.
pub(crate) fn connect_with_timeout(addr: SocketAddrV4, timeout: Duration) -> io::Result<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))?;
    socket.set_read_timeout(Some(timeout))?;
    socket.set_write_timeout(Some(timeout))?;
    socket.connect_timeout(&SocketAddr::V4(addr).into(), timeout)?;
    Ok(socket)
}

impl Scanner for TcpConnectScanner {
    fn scan_type(&self) -> ScanType {
        ScanType::Connect
    }

    fn probe(&self, target: Ipv4Addr, port: u16, timeout: Duration) -> Probe {
        let start = Instant::now();

        match connect_with_timeout(SocketAddrV4::new(target, port), timeout) {
            Ok(socket) => {
                let latency = start.elapsed().as_millis() as u64;
                drop(socket);
                Probe::new(PortStatus::Open).with_latency(latency)
            }
            Err(e) => {
                tracing::trace!(port, error = %e, "connect failed");
                Probe::new(PortStatus::Closed)
            }
        }
    }
}
