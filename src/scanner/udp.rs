//! UDP Scanner implementation.
//!
//! Sends one empty datagram per port and waits for anything to come back.
//!
//! # Detection heuristic (known limitations)
//!
//! 1. **Receive timeout**: reported as `Open`. Silence is
//!    indistinguishable from an open port with a quiet service, and also
//!    from some filtered conditions, so this is a documented false
//!    positive.
//! 2. **Any bytes received**: reported as `Closed`, on the assumption that
//!    an ICMP port-unreachable surfaced through the socket.
//! 3. **Any other socket error**: reported as `Filtered`.

use crate::scanner::traits::{PortStatus, Probe, ScanType, Scanner};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, Read};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

/// Empty probe payload.
const UDP_PROBE: &[u8] = &[];

/// Receive buffer size.
const RECV_BUFFER_SIZE: usize = 1024;

/// UDP Scanner for detecting open UDP ports.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpScanner;

impl UdpScanner {
    /// Create a new UDP scanner.
    pub fn new() -> Self {
        Self
    }

    /// Send the probe and classify whatever happens next.
    fn probe_port(&self, target: Ipv4Addr, port: u16, timeout: Duration) -> io::Result<PortStatus> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_read_timeout(Some(timeout))?;

        let addr: SockAddr = SocketAddr::V4(SocketAddrV4::new(target, port)).into();
        socket.send_to(UDP_PROBE, &addr)?;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        match (&socket).read(&mut buf) {
            Ok(_) => Ok(PortStatus::Closed),
            Err(e) if is_timeout(&e) => Ok(PortStatus::Open),
            Err(e) => Err(e),
        }
    }
}

/// Receive timeouts surface as `WouldBlock` on Unix and `TimedOut` on Windows.
fn is_timeout(e: &io::Error) -> bool {
    matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut)
}

impl Scanner for UdpScanner {
    fn scan_type(&self) -> ScanType {
        ScanType::Udp
    }

    fn probe(&self, target: Ipv4Addr, port: u16, timeout: Duration) -> Probe {
        match self.probe_port(target, port, timeout) {
            Ok(status) => Probe::new(status),
            Err(e) => {
                tracing::trace!(port, error = %e, "udp probe failed");
                Probe::new(PortStatus::Filtered)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::UdpSocket;

    #[test]
    fn test_scanner_type() {
        assert_eq!(UdpScanner::new().scan_type(), ScanType::Udp);
        assert_eq!(UdpScanner::new().protocol(), crate::scanner::Protocol::Udp);
    }

    #[test]
    fn test_silent_peer_reads_as_open() {
        // A bound socket that never answers.
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = peer.local_addr().unwrap().port();

        let probe = UdpScanner::new().probe(Ipv4Addr::LOCALHOST, port, Duration::from_millis(150));
        assert_eq!(probe.status, PortStatus::Open);
        assert_eq!(probe.latency_ms, None);
    }

    #[test]
    fn test_responding_peer_reads_as_closed() {
        let peer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = peer.local_addr().unwrap().port();

        let echo = std::thread::spawn(move || {
            let mut buf = [0u8; 64];
            if let Ok((_, from)) = peer.recv_from(&mut buf) {
                let _ = peer.send_to(b"pong", from);
            }
        });

        let probe = UdpScanner::new().probe(Ipv4Addr::LOCALHOST, port, Duration::from_millis(1000));
        echo.join().unwrap();

        assert_eq!(probe.status, PortStatus::Closed);
    }

    #[test]
    fn test_timeout_classification() {
        assert!(is_timeout(&io::Error::from(io::ErrorKind::WouldBlock)));
        assert!(is_timeout(&io::Error::from(io::ErrorKind::TimedOut)));
        assert!(!is_timeout(&io::Error::from(io::ErrorKind::ConnectionRefused)));
    }
}
