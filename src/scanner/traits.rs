//! Scanner trait abstraction and result types.
//!
//! Defines the `Prober` interface the engine drives, enabling the
//! real TCP implementation to be swapped for a fake in tests.

use crate::types::Port;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

/// State of a single (host, port) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortState {
    /// The TCP handshake completed.
    Open,
    /// Refused, timed out, or failed for any other reason.
    Closed,
}

impl PortState {
    pub fn is_open(self) -> bool {
        self == Self::Open
    }
}

impl Default for PortState {
    fn default() -> Self {
        Self::Closed
    }
}

impl From<bool> for PortState {
    fn from(open: bool) -> Self {
        if open {
            Self::Open
        } else {
            Self::Closed
        }
    }
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// Result of probing a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortResult {
    /// The port number that was probed.
    pub port: Port,
    /// State determined by the probe.
    pub state: PortState,
}

impl PortResult {
    pub fn new(port: Port, state: PortState) -> Self {
        Self { port, state }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }
}

/// Scan outcome for one host list entry.
///
/// `port_states` is empty when `not_found` is set, and otherwise holds one
/// entry per requested port in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    /// The identifier as given in the host list.
    pub host: String,
    /// No TCP-level contact could be established.
    pub not_found: bool,
    /// Per-port states in request order.
    pub port_states: Vec<PortResult>,
}

impl ScanResult {
    /// Result for a host that could not be reached.
    pub fn not_found(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            not_found: true,
            port_states: Vec::new(),
        }
    }

    /// Result for a reachable host.
    pub fn found(host: impl Into<String>, port_states: Vec<PortResult>) -> Self {
        Self {
            host: host.into(),
            not_found: false,
            port_states,
        }
    }

    /// Number of open ports.
    pub fn open_count(&self) -> usize {
        self.port_states.iter().filter(|p| p.is_open()).count()
    }
}

/// Raw outcome of one connection attempt, before it is folded into a
/// [`PortState`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Handshake completed.
    Open,
    /// The remote actively refused or reset the connection.
    Refused,
    /// No answer within the timeout.
    TimedOut,
    /// The remote could not be reached: no route, host or network unreachable.
    Unreachable(String),
    /// The attempt failed on this machine before reaching the network, for
    /// example out of file descriptors or local addresses.
    LocalFailure(String),
}

impl ProbeOutcome {
    /// Whether this outcome shows the host cannot be reached at the TCP
    /// layer.
    ///
    /// Refusals and timeouts are contact and become closed ports. A local
    /// failure says nothing about the remote host, so it never rules it out.
    pub fn rules_out_host(&self) -> bool {
        matches!(self, Self::Unreachable(_))
    }

    pub fn state(&self) -> PortState {
        PortState::from(matches!(self, Self::Open))
    }
}

/// Trait for probing implementations.
///
/// The engine resolves each host once, then calls [`Prober::connect`] for
/// every requested port. Implementations must bound both calls by the given
/// timeout and must not hold the connection open after deciding the outcome.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Resolve a host list entry to an address, `None` if it cannot be
    /// resolved.
    async fn resolve(&self, host: &str, timeout: Duration) -> Option<IpAddr>;

    /// Attempt a single TCP connection.
    async fn connect(&self, ip: IpAddr, port: Port, timeout: Duration) -> ProbeOutcome;
}

#[async_trait]
impl<P: Prober + ?Sized> Prober for std::sync::Arc<P> {
    async fn resolve(&self, host: &str, timeout: Duration) -> Option<IpAddr> {
        (**self).resolve(host, timeout).await
    }

    async fn connect(&self, ip: IpAddr, port: Port, timeout: Duration) -> ProbeOutcome {
        (**self).connect(ip, port, timeout).await
    }
}
