//! JSON output formatting.

use crate::scanner::PortResult;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// Top-level persisted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonReport {
    pub scan_info: ScanInfo,
    pub results: Vec<JsonPortResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanInfo {
    pub target: String,
    /// Local time, `YYYY-MM-DD HH:MM:SS`.
    pub scan_time: String,
    pub open_ports: usize,
}

/// One open port. Missing values are written as `0` and `""` so every
/// field keeps a fixed type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JsonPortResult {
    pub port: u16,
    pub protocol: String,
    pub state: String,
    pub service: String,
    pub response_time: u64,
    pub banner: String,
}

impl From<&PortResult> for JsonPortResult {
    fn from(result: &PortResult) -> Self {
        Self {
            port: result.port,
            protocol: result.protocol.to_string(),
            state: result.status.to_string(),
            service: result.service.clone(),
            response_time: result.response_time_ms.unwrap_or(0),
            banner: result.banner.clone().unwrap_or_default(),
        }
    }
}

impl JsonReport {
    pub fn new(target: &str, scan_time: &str, results: &[PortResult]) -> Self {
        Self {
            scan_info: ScanInfo {
                target: target.to_string(),
                scan_time: scan_time.to_string(),
                open_ports: results.len(),
            },
            results: results.iter().map(JsonPortResult::from).collect(),
        }
    }
}

/// Write results as pretty-printed JSON.
pub fn write_json<W: Write>(
    out: &mut W,
    target: &str,
    scan_time: &str,
    results: &[PortResult],
) -> io::Result<()> {
    let report = JsonReport::new(target, scan_time, results);
    serde_json::to_writer_pretty(&mut *out, &report)?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{PortStatus, Protocol};
    use serde_json::Value;

    fn sample() -> Vec<PortResult> {
        vec![
            PortResult::new(22, Protocol::Tcp, PortStatus::Open, "ssh")
                .with_response_time(Some(4))
                .with_banner(Some("SSH-2.0-\"quoted\"".to_string())),
            PortResult::new(8080, Protocol::Tcp, PortStatus::Open, "http-proxy"),
        ]
    }

    #[test]
    fn test_json_round_trip() {
        let mut buf = Vec::new();
        write_json(&mut buf, "example.com", "2024-05-01 12:30:00", &sample()).unwrap();

        let parsed: JsonReport = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.scan_info.open_ports, parsed.results.len());
        assert_eq!(parsed.scan_info.target, "example.com");
        assert_eq!(parsed.results[0].banner, "SSH-2.0-\"quoted\"");
        assert_eq!(parsed.results[1].response_time, 0);
        assert_eq!(parsed.results[1].banner, "");
    }

    #[test]
    fn test_json_field_types() {
        let mut buf = Vec::new();
        write_json(&mut buf, "10.0.0.1", "2024-05-01 12:30:00", &sample()).unwrap();
        let value: Value = serde_json::from_slice(&buf).unwrap();

        let info = &value["scan_info"];
        assert!(info["target"].is_string());
        assert_eq!(info["scan_time"], "2024-05-01 12:30:00");
        assert_eq!(info["open_ports"], 2);

        let results = value["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        for r in results {
            let obj = r.as_object().unwrap();
            assert_eq!(obj.len(), 6);
            assert!(obj["port"].is_u64());
            assert!(obj["protocol"].is_string());
            assert!(obj["state"].is_string());
            assert!(obj["service"].is_string());
            assert!(obj["response_time"].is_u64());
            assert!(obj["banner"].is_string());
        }
        assert_eq!(results[0]["state"], "open");
        assert_eq!(results[0]["protocol"], "tcp");
    }
}
