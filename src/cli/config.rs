//! Config subcommand implementation.
//!
//! Handles `pscan config show|init|path`.

use crate::cli::Context;
use crate::config::{AppSettings, Paths};
use crate::error::{CliError, CliResult};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

/// Inspect or create the settings file.
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Settings actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the effective settings as JSON
    Show,

    /// Write a settings file with the default values
    Init {
        /// Overwrite an existing settings file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the settings file location
    Path,
}

impl ConfigCommand {
    /// Execute the config command.
    pub fn execute<W: Write>(&self, ctx: &Context, out: &mut W) -> CliResult<()> {
        match &self.action {
            ConfigAction::Show => {
                let mut effective = ctx.settings.clone();
                effective.hosts_file = ctx.hosts_file.clone();
                serde_json::to_writer_pretty(&mut *out, &effective)
                    .map_err(std::io::Error::from)?;
                writeln!(out)?;
            }
            ConfigAction::Init { force } => {
                let path = settings_path(ctx)?;
                if path.exists() && !force {
                    return Err(CliError::Other(format!(
                        "{} already exists, use --force to overwrite",
                        path.display()
                    )));
                }
                AppSettings::default().save_to(&path)?;
                writeln!(out, "Wrote default settings to {}", path.display())?;
            }
            ConfigAction::Path => {
                writeln!(out, "{}", settings_path(ctx)?.display())?;
            }
        }
        Ok(())
    }
}

fn settings_path(ctx: &Context) -> CliResult<PathBuf> {
    match &ctx.settings_file {
        Some(path) => Ok(path.clone()),
        None => Ok(Paths::discover()?.settings_file()),
    }
}
