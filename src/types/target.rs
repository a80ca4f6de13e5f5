//! Target resolution.
//!
//! A target is resolved exactly once per job: a literal IPv4 address is
//! used as-is, anything else goes through a forward DNS lookup restricted
//! to A records. IPv6 literals are rejected instead of being guessed at.

use crate::error::{ScanError, ScanResult};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use trust_dns_resolver::config::{LookupIpStrategy, ResolverConfig, ResolverOpts};
use trust_dns_resolver::Resolver;

/// A scan target that has been resolved to an IPv4 address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScanTarget {
    /// The original input (hostname or IP string).
    pub original: String,
    /// The resolved IP address.
    pub ip: Ipv4Addr,
}

impl ScanTarget {
    /// Create a new scan target.
    pub fn new(original: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            original: original.into(),
            ip,
        }
    }

    /// Resolve a hostname or literal address.
    pub fn resolve(input: &str) -> ScanResult<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Err(ScanError::resolution(input, "empty target"));
        }

        if let Ok(ip) = input.parse::<Ipv4Addr>() {
            return Ok(Self::new(input, ip));
        }

        let bracketless = input.trim_start_matches('[').trim_end_matches(']');
        if bracketless.parse::<Ipv6Addr>().is_ok() {
            return Err(ScanError::resolution(
                input,
                "IPv6 targets are not supported",
            ));
        }

        let ip = lookup_ipv4(input)?;
        tracing::debug!(host = input, %ip, "resolved hostname");
        Ok(Self::new(input, ip))
    }

    /// The resolved address as an `IpAddr`.
    pub fn addr(&self) -> IpAddr {
        IpAddr::V4(self.ip)
    }
}

impl fmt::Display for ScanTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.original == self.ip.to_string() {
            write!(f, "{}", self.ip)
        } else {
            write!(f, "{} ({})", self.original, self.ip)
        }
    }
}

/// Forward lookup returning the first IPv4 address.
fn lookup_ipv4(hostname: &str) -> ScanResult<Ipv4Addr> {
    let (config, mut opts) = system_resolver_config();
    opts.ip_strategy = LookupIpStrategy::Ipv4Only;

    let resolver =
        Resolver::new(config, opts).map_err(|e| ScanError::resolution(hostname, e))?;

    let response = resolver
        .lookup_ip(hostname)
        .map_err(|e| ScanError::resolution(hostname, e))?;

    response
        .iter()
        .find_map(|ip| match ip {
            IpAddr::V4(v4) => Some(v4),
            IpAddr::V6(_) => None,
        })
        .ok_or_else(|| ScanError::resolution(hostname, "no IPv4 addresses found"))
}

/// Prefer the host's resolver configuration, fall back to the defaults.
fn system_resolver_config() -> (ResolverConfig, ResolverOpts) {
    #[cfg(unix)]
    {
        match trust_dns_resolver::system_conf::read_system_conf() {
            Ok(conf) => return conf,
            Err(e) => {
                tracing::warn!(error = %e, "could not read system resolver config, using defaults");
            }
        }
    }
    (ResolverConfig::default(), ResolverOpts::default())
}
