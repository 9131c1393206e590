//! TCP connect prober.
//!
//! Performs standard TCP connect probes using the operating system's
//! socket API and resolves hostnames through an async DNS resolver.
//! No elevated privileges are required.

use crate::scanner::traits::{ProbeOutcome, Prober};
use crate::types::{Port, TargetSpec};
use async_trait::async_trait;
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, trace, warn};
use trust_dns_resolver::config::{ResolverConfig, ResolverOpts};
use trust_dns_resolver::system_conf::read_system_conf;
use trust_dns_resolver::TokioAsyncResolver;

/// Production [`Prober`] built on `tokio::net::TcpStream`.
pub struct TcpProber {
    resolver: TokioAsyncResolver,
}

impl TcpProber {
    /// Create a prober using the system resolver configuration.
    ///
    /// Nameservers and search domains come from the system (for example
    /// `/etc/resolv.conf`). Entries in the local hosts file are honoured, so
    /// `localhost` and other hosts-file names resolve without network access.
    pub fn new() -> Self {
        let (config, opts) = resolver_settings();
        Self::with_resolver(TokioAsyncResolver::tokio(config, opts))
    }

    /// Create a prober around an existing resolver.
    pub fn with_resolver(resolver: TokioAsyncResolver) -> Self {
        Self { resolver }
    }
}

impl Default for TcpProber {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Prober for TcpProber {
    async fn resolve(&self, host: &str, limit: Duration) -> Option<IpAddr> {
        let spec = match TargetSpec::parse(host) {
            Ok(spec) => spec,
            Err(e) => {
                debug!(host, error = %e, "rejected host");
                return None;
            }
        };

        match timeout(limit, spec.resolve(&self.resolver)).await {
            Ok(Ok(ip)) => {
                debug!(host, %ip, "resolved");
                Some(ip)
            }
            Ok(Err(e)) => {
                debug!(host, error = %e, "resolution failed");
                None
            }
            Err(_) => {
                debug!(host, ?limit, "resolution timed out");
                None
            }
        }
    }

    async fn connect(&self, ip: IpAddr, port: Port, limit: Duration) -> ProbeOutcome {
        let addr = SocketAddr::new(ip, port.as_u16());

        let outcome = match timeout(limit, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                ProbeOutcome::Open
            }
            Ok(Err(e)) => classify(&e),
            Err(_) => ProbeOutcome::TimedOut,
        };

        trace!(%addr, ?outcome, "probe");
        outcome
    }
}

/// System resolver configuration with a single attempt per query, or the
/// public defaults when the system configuration cannot be read.
fn resolver_settings() -> (ResolverConfig, ResolverOpts) {
    let (config, mut opts) = match read_system_conf() {
        Ok(system) => system,
        Err(e) => {
            warn!(error = %e, "cannot read system resolver configuration, using defaults");
            (ResolverConfig::default(), ResolverOpts::default())
        }
    };
    opts.attempts = 1;
    opts.use_hosts_file = true;
    (config, opts)
}

/// Map a connect error onto a probe outcome.
fn classify(err: &io::Error) -> ProbeOutcome {
    if is_local_exhaustion(err) {
        return ProbeOutcome::LocalFailure(err.to_string());
    }

    match err.kind() {
        io::ErrorKind::ConnectionRefused
        | io::ErrorKind::ConnectionReset
        | io::ErrorKind::ConnectionAborted => ProbeOutcome::Refused,
        io::ErrorKind::TimedOut => ProbeOutcome::TimedOut,
        io::ErrorKind::AddrNotAvailable | io::ErrorKind::OutOfMemory => {
            ProbeOutcome::LocalFailure(err.to_string())
        }
        _ => ProbeOutcome::Unreachable(err.to_string()),
    }
}

/// Out of file descriptors, per process or system-wide.
#[cfg(unix)]
fn is_local_exhaustion(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(libc::EMFILE) | Some(libc::ENFILE))
}

#[cfg(not(unix))]
fn is_local_exhaustion(_err: &io::Error) -> bool {
    false
}
