//! The ordered, de-duplicated list of scan targets.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error type for host list mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostListError {
    #[error("host {0} already in the list")]
    AlreadyExists(String),
    #[error("host {0} not in the list")]
    NotFound(String),
    #[error("invalid host identifier: {0:?}")]
    InvalidHost(String),
}

/// An ordered collection of unique host identifiers.
///
/// Uniqueness is enforced on [`HostList::add`]. Anything that builds a list
/// through other means (for example [`HostList::from_hosts`] on a hand-edited
/// file) keeps whatever duplicates it was given, and the scanner treats each
/// entry independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HostList {
    hosts: Vec<String>,
}

impl HostList {
    /// Create an empty host list.
    pub const fn new() -> Self {
        Self { hosts: Vec::new() }
    }

    /// Build a list from already-stored hosts, skipping blank entries.
    pub fn from_hosts<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let hosts = hosts
            .into_iter()
            .map(|h| h.as_ref().trim().to_string())
            .filter(|h| !h.is_empty())
            .collect();
        Self { hosts }
    }

    /// Append a host if it is not already present.
    pub fn add(&mut self, host: &str) -> Result<(), HostListError> {
        let host = host.trim();
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(HostListError::InvalidHost(host.to_string()));
        }
        if self.contains(host) {
            return Err(HostListError::AlreadyExists(host.to_string()));
        }
        self.hosts.push(host.to_string());
        Ok(())
    }

    /// Remove a host, preserving the order of the remaining entries.
    pub fn remove(&mut self, host: &str) -> Result<(), HostListError> {
        let host = host.trim();
        let index = self
            .position(host)
            .ok_or_else(|| HostListError::NotFound(host.to_string()))?;
        self.hosts.remove(index);
        Ok(())
    }

    pub fn contains(&self, host: &str) -> bool {
        self.position(host).is_some()
    }

    /// Index of the host in the list.
    pub fn position(&self, host: &str) -> Option<usize> {
        self.hosts.iter().position(|h| h == host)
    }

    /// Hosts in list order.
    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.hosts.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}

impl fmt::Display for HostList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for host in &self.hosts {
            writeln!(f, "{}", host)?;
        }
        Ok(())
    }
}
