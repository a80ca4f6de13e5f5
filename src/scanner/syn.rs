//! SYN (half-open) Scanner implementation.
//!
//! Performs half-open TCP scanning by sending a hand-built SYN datagram
//! over a raw socket and classifying the first matching reply. The
//! handshake is never completed.
//!
//! # Privileges Required
//!
//! Raw sockets need root (or `CAP_NET_RAW` on Linux). The check happens
//! once, in [`SynScanner::new`], before any port is probed.
//!
//! # How It Works
//!
//! 1. Send an IPv4 + TCP SYN with `IP_HDRINCL` semantics
//! 2. Wait for the socket to become readable, up to the timeout
//! 3. Analyze replies from the target's probed port:
//!    - SYN/ACK: Port is open
//!    - RST: Port is closed
//!    - Nothing before the deadline: Port is filtered

use crate::error::{ScanError, ScanResult};
use crate::packet::{build_syn_packet, TcpReply, SYN_SOURCE_PORT};
use crate::scanner::traits::{PortStatus, Probe, ScanType, Scanner};
use pnet::datalink::{self, NetworkInterface};
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{self, Read};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::{Duration, Instant};

/// Receive buffer large enough for any reply frame we care about.
const RECV_BUFFER_SIZE: usize = 4096;

/// SYN Scanner for half-open port scanning.
///
/// **Requires elevated privileges (root/sudo).**
#[derive(Debug, Clone)]
pub struct SynScanner {
    source: Ipv4Addr,
}

impl SynScanner {
    /// Create a new SYN scanner for `target`.
    ///
    /// # Errors
    /// Returns `ScanError::Permission` if a raw socket cannot be opened
    /// for lack of privilege, and `ScanError::Configuration` if no local
    /// IPv4 address can be used as the packet source.
    pub fn new(target: Ipv4Addr) -> ScanResult<Self> {
        open_raw_socket().map_err(|e| {
            if e.kind() == io::ErrorKind::PermissionDenied {
                ScanError::Permission(
                    "SYN scanning requires root/sudo privileges for raw socket access".to_string(),
                )
            } else {
                ScanError::Io(e)
            }
        })?;

        let source = select_source_address(target, &datalink::interfaces())?;
        tracing::debug!(%source, dest = %target, "selected SYN source address");

        Ok(Self { source })
    }

    /// The address written into outgoing IP headers.
    pub fn source(&self) -> Ipv4Addr {
        self.source
    }

    /// Send a SYN and wait for a matching reply.
    fn send_syn_and_wait(
        &self,
        target: Ipv4Addr,
        port: u16,
        timeout: Duration,
    ) -> io::Result<Probe> {
        let socket = open_raw_socket()?;
        let packet = build_syn_packet(self.source, target, port);
        let dest: SockAddr = SocketAddr::V4(SocketAddrV4::new(target, 0)).into();

        let start = Instant::now();
        socket.send_to(&packet, &dest)?;
        let deadline = start + timeout;

        let mut buf = [0u8; RECV_BUFFER_SIZE];
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() || !wait_readable(&socket, remaining)? {
                return Ok(Probe::new(PortStatus::Filtered));
            }

            let n = match (&socket).read(&mut buf) {
                Ok(n) => n,
                Err(e)
                    if matches!(
                        e.kind(),
                        io::ErrorKind::WouldBlock
                            | io::ErrorKind::TimedOut
                            | io::ErrorKind::Interrupted
                    ) =>
                {
                    continue
                }
                Err(e) => return Err(e),
            };

            let Some(reply) = TcpReply::parse(&buf[..n]) else {
                continue;
            };
            if !is_reply_to_probe(&reply, target, port) {
                continue;
            }

            let latency = start.elapsed().as_millis() as u64;
            if reply.flags.is_syn_ack() {
                return Ok(Probe::new(PortStatus::Open).with_latency(latency));
            }
            if reply.flags.is_rst() {
                return Ok(Probe::new(PortStatus::Closed).with_latency(latency));
            }
        }
    }
}

impl Scanner for SynScanner {
    fn scan_type(&self) -> ScanType {
        ScanType::Syn
    }

    fn probe(&self, target: Ipv4Addr, port: u16, timeout: Duration) -> Probe {
        match self.send_syn_and_wait(target, port, timeout) {
            Ok(probe) => probe,
            Err(e) => {
                tracing::debug!(port, error = %e, "syn probe failed");
                Probe::new(PortStatus::Filtered)
            }
        }
    }
}

/// Open a raw TCP socket that expects us to supply the IP header.
fn open_raw_socket() -> io::Result<Socket> {
    let socket = Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::TCP))?;
    socket.set_header_included(true)?;
    Ok(socket)
}

/// A reply belongs to our probe if it comes from the probed port on the
/// target and is addressed to our fixed source port.
fn is_reply_to_probe(reply: &TcpReply, target: Ipv4Addr, port: u16) -> bool {
    reply.source == target && reply.source_port == port && reply.destination_port == SYN_SOURCE_PORT
}

/// Choose the source address for outgoing SYNs.
///
/// Loopback targets use loopback. Otherwise prefer an interface whose
/// network contains the target, then the first up, non-loopback interface
/// with an IPv4 address.
fn select_source_address(
    target: Ipv4Addr,
    interfaces: &[NetworkInterface],
) -> ScanResult<Ipv4Addr> {
    if target.is_loopback() {
        return Ok(Ipv4Addr::LOCALHOST);
    }

    let on_link = interfaces
        .iter()
        .filter(|iface| iface.is_up())
        .flat_map(|iface| iface.ips.iter())
        .find_map(|net| match net.ip() {
            IpAddr::V4(addr) if net.contains(IpAddr::V4(target)) => Some(addr),
            _ => None,
        });
    if let Some(addr) = on_link {
        return Ok(addr);
    }

    interfaces
        .iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback())
        .flat_map(|iface| iface.ips.iter())
        .find_map(|net| match net.ip() {
            IpAddr::V4(addr) if !addr.is_loopback() => Some(addr),
            _ => None,
        })
        .ok_or_else(|| {
            ScanError::Configuration(
                "no usable IPv4 interface found for SYN scanning".to_string(),
            )
        })
}

/// Block until the socket is readable or `timeout` elapses.
#[cfg(unix)]
fn wait_readable(socket: &Socket, timeout: Duration) -> io::Result<bool> {
    use std::os::fd::AsRawFd;

    let millis = timeout.as_millis().clamp(1, libc::c_int::MAX as u128) as libc::c_int;
    let mut fds = libc::pollfd {
        fd: socket.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    };

    loop {
        // SAFETY: `fds` points to exactly one initialized pollfd that lives
        // for the whole call.
        let ret = unsafe { libc::poll(&mut fds, 1, millis) };
        match ret {
            0 => return Ok(false),
            n if n > 0 => return Ok(true),
            _ => {
                let err = io::Error::last_os_error();
                if err.kind() != io::ErrorKind::Interrupted {
                    return Err(err);
                }
            }
        }
    }
}

/// Without poll(2), fall back to a receive timeout on the socket.
#[cfg(not(unix))]
fn wait_readable(socket: &Socket, timeout: Duration) -> io::Result<bool> {
    socket.set_read_timeout(Some(timeout))?;
    Ok(true)
}
