//! Plain text output formatting.
//!
//! The result layout is fixed: scripts parse it, so no colors or headers
//! are mixed into the results. Diagnostics go to stderr with styling.

use crate::scanner::ScanResult;
use console::style;
use std::io::{self, Write};

/// Write results as plain text.
///
/// ```text
/// localhost:
///     22: open
///     80: closed
///
/// example.invalid: Host not found
///
/// ```
pub fn write_plain<W: Write>(out: &mut W, results: &[ScanResult]) -> io::Result<()> {
    for result in results {
        if result.not_found {
            writeln!(out, "{}: Host not found", result.host)?;
            writeln!(out)?;
            continue;
        }

        writeln!(out, "{}:", result.host)?;
        for port in &result.port_states {
            writeln!(out, "\t{}: {}", port.port, port.state)?;
        }
        writeln!(out)?;
    }

    out.flush()
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}
