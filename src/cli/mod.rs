//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `pscan hosts add|list|delete` - Manage the host list
//! - `pscan scan` - Scan every host in the list
//! - `pscan config show|init|path` - Inspect or create the settings file

mod config;
mod hosts;
mod scan;

pub use config::{ConfigAction, ConfigCommand};
pub use hosts::{add_action, delete_action, list_action, HostsAction, HostsCommand};
pub use scan::{scan_action, ScanCommand};

use crate::config::AppSettings;
use crate::error::CliResult;
use crate::storage::FileStore;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// pscan - host inventory and TCP port scanner.
///
/// Keep a list of hosts with `pscan hosts`, then probe them all with
/// `pscan scan`.
#[derive(Parser, Debug)]
#[command(name = "pscan")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Fast TCP port scanner for a list of hosts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging and progress output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a custom settings file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Host list file
    #[arg(long, global = true, value_name = "PATH", env = "PSCAN_HOSTS_FILE")]
    pub hosts_file: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage the hosts list
    #[command(alias = "h")]
    Hosts(HostsCommand),

    /// Run a port scan on the hosts
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Inspect or create the settings file
    Config(ConfigCommand),
}

impl Commands {
    /// Subcommand name, for error context.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Hosts(_) => "hosts",
            Self::Scan(_) => "scan",
            Self::Config(_) => "config",
        }
    }
}

/// Settings and paths resolved from flags, environment and settings file.
#[derive(Debug, Clone)]
pub struct Context {
    pub settings: AppSettings,
    pub hosts_file: PathBuf,
    pub settings_file: Option<PathBuf>,
    pub verbose: bool,
    pub quiet: bool,
}

impl Context {
    pub fn store(&self) -> FileStore {
        FileStore::new(&self.hosts_file)
    }
}

impl Cli {
    /// Resolve settings from `--config` or the default settings file,
    /// falling back to built-in defaults when the file does not exist.
    pub fn context(&self) -> CliResult<Context> {
        let settings = match &self.config {
            Some(path) => AppSettings::load_or_default(path)?,
            None => AppSettings::load()?,
        };

        let hosts_file = self
            .hosts_file
            .clone()
            .unwrap_or_else(|| settings.hosts_file.clone());

        Ok(Context {
            settings,
            hosts_file,
            settings_file: self.config.clone(),
            verbose: self.verbose,
            quiet: self.quiet,
        })
    }

    /// Execute the selected subcommand, writing results to stdout.
    pub async fn execute(&self) -> CliResult<()> {
        let ctx = self.context()?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();

        match &self.command {
            Commands::Hosts(cmd) => cmd.execute(&ctx, &mut out),
            Commands::Scan(cmd) => cmd.execute(&ctx, &mut out).await,
            Commands::Config(cmd) => cmd.execute(&ctx, &mut out),
        }
    }
}
