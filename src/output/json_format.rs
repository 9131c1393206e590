//! JSON output formatting.

use crate::scanner::ScanResult;
use std::io::{self, Write};

/// Write results as a pretty-printed JSON array.
pub fn write_json<W: Write>(out: &mut W, results: &[ScanResult]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *out, results)?;
    writeln!(out)?;
    out.flush()
}
