//! CSV output formatting.

use crate::scanner::ScanResult;
use std::io::Write;

/// Write results as CSV, one row per (host, port).
///
/// Hosts that were not found, or were scanned without ports, get a single
/// row with empty `port` and `state` columns.
pub fn write_csv<W: Write>(out: &mut W, results: &[ScanResult]) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(out);

    wtr.write_record(["host", "not_found", "port", "state"])?;

    for result in results {
        let not_found = result.not_found.to_string();

        if result.port_states.is_empty() {
            wtr.write_record([result.host.as_str(), not_found.as_str(), "", ""])?;
            continue;
        }

        for port in &result.port_states {
            let number = port.port.to_string();
            let state = port.state.to_string();
            wtr.write_record([
                result.host.as_str(),
                not_found.as_str(),
                number.as_str(),
                state.as_str(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
