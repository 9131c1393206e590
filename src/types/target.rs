//! Target specification types.
//!
//! A host list entry is either an IP literal or a DNS hostname. Anything
//! else is rejected before a lookup is ever attempted.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use trust_dns_resolver::TokioAsyncResolver;

/// Error type for target parsing and resolution.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    #[error("invalid target format: {0}")]
    InvalidFormat(String),
    #[error("failed to resolve hostname '{0}': {1}")]
    DnsResolutionFailed(String, String),
    #[error("no IP addresses found for hostname '{0}'")]
    NoAddressesFound(String),
}

/// A parsed host list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// An IP address, used as-is.
    Single(IpAddr),
    /// A hostname to be resolved.
    Hostname(String),
}

impl TargetSpec {
    /// Parse a target specification from a string.
    pub fn parse(s: &str) -> Result<Self, TargetError> {
        let s = s.trim();

        if let Ok(ip) = s.parse::<IpAddr>() {
            return Ok(Self::Single(ip));
        }

        // Bracketed IPv6, as people tend to copy it out of URLs
        if let Some(inner) = s.strip_prefix('[').and_then(|r| r.strip_suffix(']')) {
            if let Ok(ip) = inner.parse::<IpAddr>() {
                return Ok(Self::Single(ip));
            }
        }

        if is_valid_hostname(s) {
            return Ok(Self::Hostname(s.trim_end_matches('.').to_string()));
        }

        Err(TargetError::InvalidFormat(s.to_string()))
    }

    /// Resolve to the first address returned by the resolver.
    pub async fn resolve(&self, resolver: &TokioAsyncResolver) -> Result<IpAddr, TargetError> {
        match self {
            Self::Single(ip) => Ok(*ip),
            Self::Hostname(hostname) => {
                let response = resolver.lookup_ip(hostname.as_str()).await.map_err(|e| {
                    TargetError::DnsResolutionFailed(hostname.clone(), e.to_string())
                })?;

                response
                    .iter()
                    .next()
                    .ok_or_else(|| TargetError::NoAddressesFound(hostname.clone()))
            }
        }
    }
}

impl FromStr for TargetSpec {
    type Err = TargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single(ip) => write!(f, "{}", ip),
            Self::Hostname(hostname) => write!(f, "{}", hostname),
        }
    }
}

/// Check if a string is a valid hostname.
///
/// A dotted name whose last label is purely numeric is a mistyped IPv4
/// address (`389.389.389.389`), not a hostname.
fn is_valid_hostname(s: &str) -> bool {
    let s = s.strip_suffix('.').unwrap_or(s);
    if s.is_empty() || s.len() > 253 {
        return false;
    }

    // Each label must be 1-63 characters
    for label in s.split('.') {
        if label.is_empty() || label.len() > 63 {
            return false;
        }
        // Must start and end with alphanumeric
        if !label.chars().next().map_or(false, |c| c.is_ascii_alphanumeric()) {
            return false;
        }
        if !label.chars().last().map_or(false, |c| c.is_ascii_alphanumeric()) {
            return false;
        }
        // Can only contain alphanumeric, hyphens and underscores
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return false;
        }
    }

    if s.contains('.') {
        if let Some(tld) = s.rsplit('.').next() {
            if tld.bytes().all(|b| b.is_ascii_digit()) {
                return false;
            }
        }
    }

    true
}
