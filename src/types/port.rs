//! Port types with validation and parsing.
//!
//! The `Port` newtype ensures values are always valid port numbers (1-65535).
//! `PortSpec` parses the ports string accepted by `pscan scan --ports`.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// A validated TCP port number (1-65535).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct Port(u16);

impl Port {
    /// Minimum valid port number.
    pub const MIN: u16 = 1;
    /// Maximum valid port number.
    pub const MAX: u16 = 65535;

    /// Create a new Port from a u16, returning None if invalid.
    #[inline]
    pub const fn new(port: u16) -> Option<Self> {
        if port >= Self::MIN {
            Some(Self(port))
        } else {
            None
        }
    }

    /// Get the raw port number.
    #[inline]
    pub const fn as_u16(self) -> u16 {
        self.0
    }

    /// Check whether an arbitrary integer is a usable TCP port.
    #[inline]
    pub const fn is_valid(value: u64) -> bool {
        value >= Self::MIN as u64 && value <= Self::MAX as u64
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u16> for Port {
    type Error = PortError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| PortError::InvalidValue(value.to_string()))
    }
}

impl From<Port> for u16 {
    fn from(port: Port) -> Self {
        port.0
    }
}

/// Error type for port parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// Non-numeric token, out-of-range integer, or nothing to parse.
    #[error("invalid TCP port value: {0:?}")]
    InvalidValue(String),
    /// Malformed `start-end` token or reversed bounds.
    #[error("invalid range for ports: {0:?}")]
    InvalidRange(String),
}

/// An ordered, de-duplicated list of ports.
///
/// Accepts tokens separated by commas and/or whitespace, where each token
/// is a single port (`80`) or an inclusive range (`8000-8010`). Duplicates
/// are dropped and the first occurrence order is kept:
///
/// ```
/// use pscan::types::PortSpec;
///
/// let spec: PortSpec = "443, 80 79-81".parse().unwrap();
/// let ports: Vec<u16> = spec.iter().map(|p| p.as_u16()).collect();
/// assert_eq!(ports, vec![443, 80, 79, 81]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSpec {
    ports: Vec<Port>,
}

impl PortSpec {
    /// Create an empty port specification.
    pub const fn new() -> Self {
        Self { ports: Vec::new() }
    }

    /// Append a port unless it is already present.
    pub fn push(&mut self, port: Port) {
        if !self.contains(port) {
            self.ports.push(port);
        }
    }

    /// Check whether the port is part of this specification.
    pub fn contains(&self, port: Port) -> bool {
        self.ports.contains(&port)
    }

    /// Ports in insertion order.
    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Iterate over the ports in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = Port> + '_ {
        self.ports.iter().copied()
    }

    /// Number of distinct ports.
    pub fn len(&self) -> usize {
        self.ports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ports.is_empty()
    }

    /// Consume the specification, returning the ordered ports.
    pub fn into_ports(self) -> Vec<Port> {
        self.ports
    }
}

impl FromStr for PortSpec {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut ports = Vec::new();
        let mut seen = HashSet::new();

        let tokens = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty());

        for token in tokens {
            if token.contains('-') {
                let (start, end) = parse_range(token)?;
                for value in start..=end {
                    let port = Port(value);
                    if seen.insert(port) {
                        ports.push(port);
                    }
                }
            } else {
                let value = parse_number(token)
                    .ok_or_else(|| PortError::InvalidValue(token.to_string()))?;
                let port = to_port(value, token)?;
                if seen.insert(port) {
                    ports.push(port);
                }
            }
        }

        if ports.is_empty() {
            return Err(PortError::InvalidValue(s.trim().to_string()));
        }

        Ok(Self { ports })
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.ports.iter().map(|p| p.to_string()).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl<'a> IntoIterator for &'a PortSpec {
    type Item = &'a Port;
    type IntoIter = std::slice::Iter<'a, Port>;

    fn into_iter(self) -> Self::IntoIter {
        self.ports.iter()
    }
}

/// Parse a `start-end` token into validated bounds.
fn parse_range(token: &str) -> Result<(u16, u16), PortError> {
    let bounds: Vec<&str> = token.split('-').collect();
    if bounds.len() != 2 {
        return Err(PortError::InvalidRange(token.to_string()));
    }

    let start =
        parse_number(bounds[0]).ok_or_else(|| PortError::InvalidRange(token.to_string()))?;
    let end = parse_number(bounds[1]).ok_or_else(|| PortError::InvalidRange(token.to_string()))?;

    let start = to_port(start, token)?;
    let end = to_port(end, token)?;

    if start > end {
        return Err(PortError::InvalidRange(token.to_string()));
    }

    Ok((start.0, end.0))
}

/// Parse an unsigned decimal, saturating on overflow so that huge values
/// are reported as out of range rather than as non-numeric.
fn parse_number(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(s.parse::<u64>().unwrap_or(u64::MAX))
}

fn to_port(value: u64, token: &str) -> Result<Port, PortError> {
    if Port::is_valid(value) {
        Ok(Port(value as u16))
    } else {
        Err(PortError::InvalidValue(token.to_string()))
    }
}
