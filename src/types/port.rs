//! Port set expansion.
//!
//! A `PortSet` is the ordered list of ports a job will probe. Unlike a
//! normalized range set it keeps the textual order of the specification
//! and does not deduplicate, so `"80,80"` probes port 80 twice.

use std::fmt;
use std::ops::Deref;

/// Lowest port number accepted in a range.
pub const MIN_PORT: u32 = 1;
/// Highest port number accepted in a range.
pub const MAX_PORT: u32 = 65535;

/// Ordered, immutable sequence of ports in `[1, 65535]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSet {
    ports: Vec<u16>,
}

impl PortSet {
    /// Expand a comma-separated specification such as `"22,80,8000-8010"`.
    ///
    /// Each token is either a bare number or `start-end`. Unparsable
    /// numbers read as 0 and are dropped by clamping, a reversed range is
    /// swapped, and out-of-range bounds are clamped to `[1, 65535]`.
    /// Malformed tokens never fail the whole parse; an entirely invalid
    /// specification simply yields an empty set.
    pub fn expand(spec: &str) -> Self {
        let mut ports = Vec::new();

        for token in spec.split(',') {
            match token.split_once('-') {
                Some((start, end)) if has_digit(start) || has_digit(end) => {
                    let mut start = parse_lenient(start).max(MIN_PORT as i64);
                    let mut end = parse_lenient(end).min(MAX_PORT as i64);
                    if start > end {
                        std::mem::swap(&mut start, &mut end);
                    }
                    // A swapped range can carry a bound outside the valid
                    // interval (e.g. "0-0" becomes 1..=0 before the swap).
                    let start = start.max(MIN_PORT as i64);
                    let end = end.min(MAX_PORT as i64);
                    ports.extend((start..=end).map(|p| p as u16));
                }
                // A range with no number on either side is malformed.
                Some(_) => {}
                None => {
                    let port = parse_lenient(token);
                    if (MIN_PORT as i64..=MAX_PORT as i64).contains(&port) {
                        ports.push(port as u16);
                    }
                }
            }
        }

        Self { ports }
    }

    /// Build a set from already-validated port numbers.
    pub fn from_ports(ports: Vec<u16>) -> Self {
        Self {
            ports: ports.into_iter().filter(|&p| p != 0).collect(),
        }
    }

    /// Borrow the ports in expansion order.
    pub fn as_slice(&self) -> &[u16] {
        &self.ports
    }
}

impl Deref for PortSet {
    type Target = [u16];

    fn deref(&self) -> &[u16] {
        &self.ports
    }
}

impl fmt::Display for PortSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ports", self.ports.len())
    }
}

fn has_digit(s: &str) -> bool {
    s.bytes().any(|b| b.is_ascii_digit())
}

/// Parse a number the way `atoi` does: skip leading whitespace, accept an
/// optional sign and leading digits, and read anything else as 0.
fn parse_lenient(s: &str) -> i64 {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let mut value: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        value = value.saturating_mul(10).saturating_add(i64::from(b - b'0'));
        // Anything this large is clamped anyway.
        if value > 1_000_000 {
            break;
        }
    }

    if negative {
        -value
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_mixed() {
        let set = PortSet::expand("80,443,8080-8082");
        assert_eq!(set.as_slice(), &[80, 443, 8080, 8081, 8082]);
    }

    #[test]
    fn test_expand_reversed_range() {
        let set = PortSet::expand("100-90");
        let expected: Vec<u16> = (90..=100).collect();
        assert_eq!(set.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_expand_empty() {
        assert!(PortSet::expand("").is_empty());
        assert!(PortSet::expand("abc,,x-y").is_empty());
        assert!(PortSet::expand("-").is_empty());
    }

    #[test]
    fn test_expand_keeps_order_and_duplicates() {
        let set = PortSet::expand("443,80,80,22");
        assert_eq!(set.as_slice(), &[443, 80, 80, 22]);

        let set = PortSet::expand("5-6,4-6");
        assert_eq!(set.as_slice(), &[5, 6, 4, 5, 6]);
    }

    #[test]
    fn test_expand_clamps_bounds() {
        let set = PortSet::expand("0-2");
        assert_eq!(set.as_slice(), &[1, 2]);

        let set = PortSet::expand("65534-70000");
        assert_eq!(set.as_slice(), &[65534, 65535]);

        // Bare ports outside the valid range are dropped, not clamped.
        let set = PortSet::expand("0,70000,22");
        assert_eq!(set.as_slice(), &[22]);
    }

    #[test]
    fn test_expand_skips_malformed_tokens() {
        let set = PortSet::expand("22,ssh,80");
        assert_eq!(set.as_slice(), &[22, 80]);

        // Leading digits are honoured like atoi.
        let set = PortSet::expand("21abc");
        assert_eq!(set.as_slice(), &[21]);
    }

    #[test]
    fn test_expand_whitespace() {
        let set = PortSet::expand(" 22, 80 - 81");
        assert_eq!(set.as_slice(), &[22, 80, 81]);
    }

    #[test]
    fn test_parse_lenient() {
        assert_eq!(parse_lenient("42"), 42);
        assert_eq!(parse_lenient("  7x"), 7);
        assert_eq!(parse_lenient(""), 0);
        assert_eq!(parse_lenient("-5"), -5);
        assert_eq!(parse_lenient("junk"), 0);
    }
}
