//! Hosts subcommand implementation.
//!
//! Handles `pscan hosts add|list|delete`. Each action loads the list,
//! applies every change, and saves once; any error aborts before saving.

use crate::cli::Context;
use crate::error::CliResult;
use crate::storage::HostStore;
use clap::{Parser, Subcommand};
use std::io::Write;
use tracing::info;

/// Manage the hosts list.
#[derive(Parser, Debug)]
pub struct HostsCommand {
    #[command(subcommand)]
    pub action: HostsAction,
}

/// Host list actions.
#[derive(Subcommand, Debug)]
pub enum HostsAction {
    /// Add new host(s) to the list
    #[command(alias = "a")]
    Add {
        /// Hosts to add
        #[arg(required = true, value_name = "HOST")]
        hosts: Vec<String>,
    },

    /// List hosts in the hosts list
    #[command(alias = "l")]
    List,

    /// Delete host(s) from the list
    #[command(aliases = ["d", "rm"])]
    Delete {
        /// Hosts to delete
        #[arg(required = true, value_name = "HOST")]
        hosts: Vec<String>,
    },
}

impl HostsCommand {
    /// Execute the hosts command.
    pub fn execute<W: Write>(&self, ctx: &Context, out: &mut W) -> CliResult<()> {
        let store = ctx.store();

        match &self.action {
            HostsAction::Add { hosts } => add_action(out, &store, hosts),
            HostsAction::List => list_action(out, &store),
            HostsAction::Delete { hosts } => delete_action(out, &store, hosts),
        }
    }
}

/// Add hosts, printing `Added host: <host>` for each.
pub fn add_action<W, S>(out: &mut W, store: &S, hosts: &[String]) -> CliResult<()>
where
    W: Write,
    S: HostStore + ?Sized,
{
    let mut list = store.load()?;

    for host in hosts {
        list.add(host)?;
        writeln!(out, "Added host: {}", host.trim())?;
    }

    store.save(&list)?;
    info!(added = hosts.len(), total = list.len(), "host list updated");
    Ok(())
}

/// Print every host, one per line.
pub fn list_action<W, S>(out: &mut W, store: &S) -> CliResult<()>
where
    W: Write,
    S: HostStore + ?Sized,
{
    let list = store.load()?;
    write!(out, "{}", list)?;
    Ok(())
}

/// Delete hosts, printing `Deleted host: <host>` for each.
pub fn delete_action<W, S>(out: &mut W, store: &S, hosts: &[String]) -> CliResult<()>
where
    W: Write,
    S: HostStore + ?Sized,
{
    let mut list = store.load()?;

    for host in hosts {
        list.remove(host)?;
        writeln!(out, "Deleted host: {}", host.trim())?;
    }

    store.save(&list)?;
    info!(deleted = hosts.len(), total = list.len(), "host list updated");
    Ok(())
}
