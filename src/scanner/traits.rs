//! Scanner trait abstraction.
//!
//! Defines a common interface for all scan strategies, enabling the worker
//! pool to drive any of them and tests to substitute their own.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Status of a scanned port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    /// The service accepted the connection or responded.
    Open,
    /// The port actively refused.
    Closed,
    /// No response was observed (commonly firewalled).
    Filtered,
}

impl fmt::Display for PortStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
            Self::Filtered => write!(f, "filtered"),
        }
    }
}

/// Transport protocol of a probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
}

impl Protocol {
    /// Lowercase tag used in output and service lookups.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tcp => "tcp",
            Self::Udp => "udp",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a single probe observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Probe {
    pub status: PortStatus,
    /// Round-trip latency in milliseconds, when the strategy measures it.
    pub latency_ms: Option<u64>,
}

impl Probe {
    /// A probe result without a latency measurement.
    pub const fn new(status: PortStatus) -> Self {
        Self {
            status,
            latency_ms: None,
        }
    }

    /// Attach a latency measurement.
    pub const fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = Some(latency_ms);
        self
    }
}

/// Result of scanning a single port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortResult {
    /// The port number that was scanned.
    pub port: u16,
    /// Protocol the port was probed over.
    pub protocol: Protocol,
    /// Status determined by the scan.
    pub status: PortStatus,
    /// Service name from the catalog.
    pub service: String,
    /// Response time in milliseconds.
    pub response_time_ms: Option<u64>,
    /// Sanitized banner captured from the service.
    pub banner: Option<String>,
}

impl PortResult {
    /// Create a new port result.
    pub fn new(
        port: u16,
        protocol: Protocol,
        status: PortStatus,
        service: impl Into<String>,
    ) -> Self {
        Self {
            port,
            protocol,
            status,
            service: service.into(),
            response_time_ms: None,
            banner: None,
        }
    }

    /// Set the banner.
    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Set the response time.
    pub fn with_response_time(mut self, time_ms: Option<u64>) -> Self {
        self.response_time_ms = time_ms;
        self
    }

    /// Check if the port is open.
    pub fn is_open(&self) -> bool {
        self.status == PortStatus::Open
    }
}

/// Available scan types.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ScanType {
    /// TCP connect scan (default, no special privileges required).
    #[default]
    Connect,
    /// SYN half-open scan (requires raw-socket privileges).
    Syn,
    /// UDP scan.
    Udp,
}

impl ScanType {
    /// Protocol tag of the results this scan type produces.
    pub const fn protocol(self) -> Protocol {
        match self {
            Self::Connect | Self::Syn => Protocol::Tcp,
            Self::Udp => Protocol::Udp,
        }
    }
}

impl fmt::Display for ScanType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "TCP Connect"),
            Self::Syn => write!(f, "TCP SYN"),
            Self::Udp => write!(f, "UDP"),
        }
    }
}

/// A port-probing strategy.
///
/// Implementations perform one blocking probe per call, bounded by
/// `timeout`, with no side effects beyond the network I/O. Per-port
/// failures are folded into the returned status; they never error.
pub trait Scanner: Send + Sync {
    /// Get the scan type this scanner implements.
    fn scan_type(&self) -> ScanType;

    /// Protocol tag for results produced by this scanner.
    fn protocol(&self) -> Protocol {
        self.scan_type().protocol()
    }

    /// Probe a single port.
    fn probe(&self, target: Ipv4Addr, port: u16, timeout: Duration) -> Probe;
}

/// A boxed scanner for dynamic dispatch.
pub type BoxedScanner = Box<dyn Scanner>;
