//! Scan subcommand implementation.
//!
//! Handles `pscan scan`: loads the host list, parses the ports string,
//! runs the scan engine and renders the results.

use crate::cli::Context;
use crate::error::CliResult;
use crate::output::{self, OutputFormat};
use crate::scanner::ScanEngine;
use crate::storage::HostStore;
use crate::types::{Port, PortSpec};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::time::Duration;
use tracing::warn;

/// Run a port scan on the hosts.
#[derive(Parser, Debug, Default)]
pub struct ScanCommand {
    /// Ports or port ranges to scan, separated with commas or spaces
    /// (e.g. "22 80-82 443")
    #[arg(short, long, env = "PSCAN_PORTS")]
    pub ports: Option<String>,

    /// Timeout for each connection attempt, in seconds
    #[arg(
        short = 't',
        long,
        env = "PSCAN_TIMEOUT",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout: Option<u64>,

    /// Maximum number of hosts scanned concurrently
    #[arg(short = 'c', long)]
    pub concurrency: Option<usize>,

    /// Output format for results
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,
}

impl ScanCommand {
    /// Execute the scan command.
    pub async fn execute<W: Write>(&self, ctx: &Context, out: &mut W) -> CliResult<()> {
        let settings = &ctx.settings;

        let ports_str = self.ports.as_deref().unwrap_or(&settings.default_ports);
        let ports: PortSpec = ports_str.parse()?;

        let timeout = Duration::from_secs(self.timeout.unwrap_or(settings.timeout_secs));
        let format = self.output.unwrap_or(settings.output_format);

        let mut job = settings.job_config();
        if let Some(limit) = self.concurrency {
            job = job.with_host_concurrency(limit);
        }

        let store = ctx.store();
        let mut engine = ScanEngine::new().with_config(job);
        if ctx.verbose && !ctx.quiet {
            engine = engine.with_progress(progress_bar());
        }

        scan_action(out, &store, ports.ports(), timeout, &engine, format).await
    }
}

/// Load the host list from `store`, scan it and write the results.
pub async fn scan_action<W, S>(
    out: &mut W,
    store: &S,
    ports: &[Port],
    timeout: Duration,
    engine: &ScanEngine,
    format: OutputFormat,
) -> CliResult<()>
where
    W: Write,
    S: HostStore + ?Sized,
{
    let hosts = store.load()?;

    if hosts.is_empty() {
        warn!("host list is empty, add hosts with `pscan hosts add`");
    }

    let results = engine.run(hosts.hosts(), ports, timeout).await;

    output::write_results(out, &results, format)
}

/// Host progress bar; the engine sets its length when the scan starts.
fn progress_bar() -> ProgressBar {
    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} hosts")
    {
        pb.set_style(style.progress_chars("=>-"));
    }
    pb
}
