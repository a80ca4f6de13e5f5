//! CSV output formatting.
//!
//! Only the banner column is quoted; embedded quotes are doubled.

use crate::scanner::PortResult;
use std::io::{self, Write};

const HEADER: [&str; 6] = [
    "Port",
    "Protocol",
    "State",
    "Service",
    "Response_Time",
    "Banner",
];

/// Quote a banner for the last CSV column.
fn quote_banner(banner: &str) -> String {
    format!("\"{}\"", banner.replace('"', "\"\""))
}

/// Write results in CSV format.
pub fn write_csv<W: Write>(out: &mut W, results: &[PortResult]) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(out);

    wtr.write_record(HEADER)?;

    for result in results {
        wtr.write_record([
            result.port.to_string(),
            result.protocol.to_string(),
            result.status.to_string(),
            result.service.clone(),
            result.response_time_ms.unwrap_or(0).to_string(),
            quote_banner(result.banner.as_deref().unwrap_or("")),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
