//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of scan results.
//! Every formatter writes to a caller-supplied writer so commands can be
//! tested against an in-memory buffer.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::write_csv;
pub use json_format::write_json;
pub use plain::{print_error, write_plain};

use crate::error::CliResult;
use crate::scanner::ScanResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Write;

/// Output format for results.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable plain text
    #[default]
    Plain,
    /// JSON structured output
    Json,
    /// CSV format for data analysis
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "plain"),
            Self::Json => write!(f, "json"),
            Self::Csv => write!(f, "csv"),
        }
    }
}

/// Format and write scan results according to the specified format.
pub fn write_results<W: Write>(
    out: &mut W,
    results: &[ScanResult],
    format: OutputFormat,
) -> CliResult<()> {
    match format {
        OutputFormat::Plain => write_plain(out, results)?,
        OutputFormat::Json => write_json(out, results)?,
        OutputFormat::Csv => write_csv(out, results)?,
    }
    Ok(())
}
