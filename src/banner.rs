//! Banner grabbing functionality for TCP services.
//!
//! Opens a fresh short-lived connection to an open port, sends a probe
//! chosen by port number, and returns the sanitized response. Any failure
//! simply yields no banner.

use crate::scanner::tcp::connect_with_timeout;
use std::io::{Read, Write};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;

/// Maximum bytes to read for a banner.
pub const MAX_BANNER_SIZE: usize = 1024;

/// Replacement for control bytes in captured banners.
const PLACEHOLDER: char = '.';

const HTTP_PROBE: &[u8] = b"GET / HTTP/1.0\r\n\r\n";
/// Record header and the start of a ClientHello; enough to make most TLS
/// servers answer with an alert.
const TLS_PROBE: &[u8] = b"\x16\x03\x01\x00\x75\x01\x00\x00\x71\x03\x03";
const FTP_PROBE: &[u8] = b"USER anonymous\r\n";
const SMTP_PROBE: &[u8] = b"HELO example.com\r\n";
const POP3_PROBE: &[u8] = b"USER test\r\n";
const IMAP_PROBE: &[u8] = b"a001 LOGIN user pass\r\n";
/// MySQL protocol version 10.
const MYSQL_PROBE: &[u8] = b"\x0a";
const GENERIC_PROBE: &[u8] = b"\r\n";

/// The probe sent to elicit a banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerProbe {
    Http,
    Tls,
    Ftp,
    /// Send nothing and read the server's own greeting.
    Ssh,
    Smtp,
    Pop3,
    Imap,
    Mysql,
    Generic,
}

impl BannerProbe {
    /// Select the probe for a port number.
    pub fn for_port(port: u16) -> Self {
        match port {
            80 | 8080 | 8000 | 8888 => Self::Http,
            443 | 8443 => Self::Tls,
            21 | 2121 => Self::Ftp,
            22 => Self::Ssh,
            25 | 587 => Self::Smtp,
            110 => Self::Pop3,
            143 => Self::Imap,
            3306 => Self::Mysql,
            _ => Self::Generic,
        }
    }

    /// Bytes to send; empty for greeting-first protocols.
    pub fn payload(self) -> &'static [u8] {
        match self {
            Self::Http => HTTP_PROBE,
            Self::Tls => TLS_PROBE,
            Self::Ftp => FTP_PROBE,
            Self::Ssh => &[],
            Self::Smtp => SMTP_PROBE,
            Self::Pop3 => POP3_PROBE,
            Self::Imap => IMAP_PROBE,
            Self::Mysql => MYSQL_PROBE,
            Self::Generic => GENERIC_PROBE,
        }
    }
}

/// Grab a banner from an open TCP port.
///
/// Runs inline on the calling worker and can add up to `timeout` of
/// connect time plus `timeout` per read. Returns `None` if the connection
/// fails, nothing is received, or the sanitized banner is empty.
pub fn grab_banner(target: Ipv4Addr, port: u16, timeout: Duration) -> Option<String> {
    grab_banner_with_probe(
        SocketAddrV4::new(target, port),
        BannerProbe::for_port(port),
        timeout,
    )
}

/// Grab a banner from `addr` using an explicit probe.
pub fn grab_banner_with_probe(
    addr: SocketAddrV4,
    probe: BannerProbe,
    timeout: Duration,
) -> Option<String> {
    let mut socket = connect_with_timeout(addr, timeout).ok()?;

    let payload = probe.payload();
    if !payload.is_empty() {
        // A failed send still leaves a chance the server talks first.
        if let Err(e) = socket.write_all(payload) {
            tracing::trace!(port = addr.port(), error = %e, "banner probe send failed");
        }
    }

    let mut captured = Vec::with_capacity(MAX_BANNER_SIZE);
    let mut buffer = [0u8; MAX_BANNER_SIZE];
    while captured.len() < MAX_BANNER_SIZE {
        match socket.read(&mut buffer) {
            Ok(0) | Err(_) => break,
            Ok(n) => {
                let take = n.min(MAX_BANNER_SIZE - captured.len());
                captured.extend_from_slice(&buffer[..take]);
            }
        }
    }

    if captured.is_empty() {
        return None;
    }

    let banner = sanitize_banner(&captured);
    if banner.is_empty() {
        None
    } else {
        Some(banner)
    }
}

/// Sanitize raw banner bytes into a single printable line.
///
/// Control bytes other than CR, LF and TAB, DEL, and non-ASCII bytes become
/// `.`; runs of space, tab, CR and LF collapse to one space; the result is
/// trimmed.
pub fn sanitize_banner(data: &[u8]) -> String {
    let mut result = String::with_capacity(data.len());
    let mut in_space = false;

    for &b in data {
        if matches!(b, b' ' | b'\t' | b'\r' | b'\n') {
            if !in_space && !result.is_empty() {
                result.push(' ');
            }
            in_space = true;
            continue;
        }

        let c = if b.is_ascii_graphic() {
            b as char
        } else {
            PLACEHOLDER
        };
        result.push(c);
        in_space = false;
    }

    let trimmed_len = result.trim_end_matches(' ').len();
    result.truncate(trimmed_len);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    fn local_listener() -> (TcpListener, SocketAddrV4) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        (listener, SocketAddrV4::new(Ipv4Addr::LOCALHOST, port))
    }

    #[test]
    fn test_sanitize_banner() {
        let data = b"SSH-2.0-OpenSSH_8.9\r\n";
        assert_eq!(sanitize_banner(data), "SSH-2.0-OpenSSH_8.9");
    }

    #[test]
    fn test_sanitize_binary_data() {
        let data = b"\x00\x01Hello\x02World\x03";
        assert_eq!(sanitize_banner(data), "..Hello.World.");
    }

    #[test]
    fn test_sanitize_collapses_whitespace() {
        let data = b"\r\n  220 ready\t\t\r\n\r\nok  \r\n";
        assert_eq!(sanitize_banner(data), "220 ready ok");
        assert_eq!(sanitize_banner(b" \r\n\t "), "");
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize_banner(b"caf\xc3\xa9\x7f"), "caf...");
    }

    #[test]
    fn test_probe_selection() {
        assert_eq!(BannerProbe::for_port(80), BannerProbe::Http);
        assert_eq!(BannerProbe::for_port(8888), BannerProbe::Http);
        assert_eq!(BannerProbe::for_port(8443), BannerProbe::Tls);
        assert_eq!(BannerProbe::for_port(2121), BannerProbe::Ftp);
        assert_eq!(BannerProbe::for_port(22), BannerProbe::Ssh);
        assert_eq!(BannerProbe::for_port(587), BannerProbe::Smtp);
        assert_eq!(BannerProbe::for_port(110), BannerProbe::Pop3);
        assert_eq!(BannerProbe::for_port(143), BannerProbe::Imap);
        assert_eq!(BannerProbe::for_port(3306), BannerProbe::Mysql);
        assert_eq!(BannerProbe::for_port(9999), BannerProbe::Generic);

        assert!(BannerProbe::Ssh.payload().is_empty());
        assert_eq!(BannerProbe::Tls.payload().len(), 11);
        assert_eq!(BannerProbe::Mysql.payload(), &[0x0a]);
    }

    #[test]
    fn test_grab_http_banner() {
        let (listener, addr) = local_listener();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = [0u8; 128];
            let n = stream.read(&mut request).unwrap();
            assert!(request[..n].starts_with(b"GET / HTTP/1.0"));
            stream
                .write_all(b"HTTP/1.0 200 OK\r\nServer: test/1.0\r\n\r\n")
                .unwrap();
        });

        let banner = grab_banner_with_probe(addr, BannerProbe::for_port(80), Duration::from_secs(2));
        server.join().unwrap();

        let banner = banner.unwrap();
        assert_eq!(banner, "HTTP/1.0 200 OK Server: test/1.0");
        assert!(banner.bytes().all(|b| b >= 0x20));
        assert!(!banner.contains("  "));
    }

    #[test]
    fn test_grab_greeting_without_probe() {
        let (listener, addr) = local_listener();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"SSH-2.0-Test_1.0\r\n").unwrap();
        });

        let banner = grab_banner_with_probe(addr, BannerProbe::Ssh, Duration::from_secs(2));
        server.join().unwrap();

        assert_eq!(banner.as_deref(), Some("SSH-2.0-Test_1.0"));
    }

    #[test]
    fn test_silent_peer_yields_none() {
        let (listener, addr) = local_listener();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            // Hold the connection open past the client's read timeout.
            thread::sleep(Duration::from_millis(400));
            drop(stream);
        });

        let banner = grab_banner_with_probe(addr, BannerProbe::Ssh, Duration::from_millis(150));
        server.join().unwrap();

        assert_eq!(banner, None);
    }

    #[test]
    fn test_connection_failure_yields_none() {
        let addr = {
            let (listener, addr) = local_listener();
            drop(listener);
            addr
        };
        assert_eq!(
            grab_banner_with_probe(addr, BannerProbe::Generic, Duration::from_millis(200)),
            None
        );
    }

    #[test]
    fn test_banner_size_cap() {
        let (listener, addr) = local_listener();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let _ = stream.write_all(&[b'A'; 4096]);
        });

        let banner = grab_banner_with_probe(addr, BannerProbe::Ssh, Duration::from_secs(2));
        server.join().unwrap();

        assert_eq!(banner.map(|b| b.len()), Some(MAX_BANNER_SIZE));
    }
}
