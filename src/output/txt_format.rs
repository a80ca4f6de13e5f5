//! Plain text file output.

use crate::scanner::PortResult;
use std::io::{self, Write};

/// Write one block per open port.
pub fn write_txt<W: Write>(
    out: &mut W,
    target: &str,
    scan_time: &str,
    results: &[PortResult],
) -> io::Result<()> {
    writeln!(out, "Port scan results")?;
    writeln!(out, "Target: {}", target)?;
    writeln!(out, "Scan time: {}", scan_time)?;
    writeln!(out, "Open ports: {}", results.len())?;
    writeln!(out)?;

    for result in results {
        writeln!(out, "Port {} ({}):", result.port, result.protocol)?;
        writeln!(out, "  State: {}", result.status)?;
        writeln!(out, "  Service: {}", result.service)?;
        writeln!(
            out,
            "  Response time: {}ms",
            result.response_time_ms.unwrap_or(0)
        )?;
        if let Some(banner) = &result.banner {
            writeln!(out, "  Banner: {}", banner)?;
        }
        writeln!(out)?;
    }

    Ok(())
}
