//! Scanner module - the scan engine.
//!
//! Runs one tokio task per host, bounded by a host semaphore, while every
//! connection attempt across all hosts draws from a shared connection
//! semaphore. Results come back in host list order: the per-host join
//! handles are awaited in input order, and per-port results are collected
//! through an order-preserving buffered stream.

pub mod tcp;
pub mod traits;

use crate::types::Port;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

pub use tcp::TcpProber;
pub use traits::{PortResult, PortState, ProbeOutcome, Prober, ScanResult};

/// Concurrency limits for a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanJobConfig {
    /// Maximum number of hosts probed at the same time.
    pub host_concurrency: usize,
    /// Maximum number of connection attempts in flight across all hosts.
    pub connect_concurrency: usize,
}

impl ScanJobConfig {
    pub const DEFAULT_HOST_CONCURRENCY: usize = 64;
    pub const DEFAULT_CONNECT_CONCURRENCY: usize = 512;

    pub fn new() -> Self {
        Self {
            host_concurrency: Self::DEFAULT_HOST_CONCURRENCY,
            connect_concurrency: Self::DEFAULT_CONNECT_CONCURRENCY,
        }
    }

    /// Set the number of hosts scanned concurrently (at least one).
    pub fn with_host_concurrency(mut self, limit: usize) -> Self {
        self.host_concurrency = limit.max(1);
        self
    }

    /// Set the number of sockets allowed in flight (at least one).
    pub fn with_connect_concurrency(mut self, limit: usize) -> Self {
        self.connect_concurrency = limit.max(1);
        self
    }
}

impl Default for ScanJobConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The scan engine.
///
/// Holds no state between runs; every call to [`ScanEngine::run`] builds
/// its own semaphores.
#[derive(Clone)]
pub struct ScanEngine {
    prober: Arc<dyn Prober>,
    config: ScanJobConfig,
    progress: Option<ProgressBar>,
}

impl ScanEngine {
    /// Engine backed by the TCP connect prober.
    pub fn new() -> Self {
        Self::with_prober(TcpProber::new())
    }

    /// Engine backed by a custom prober.
    pub fn with_prober(prober: impl Prober + 'static) -> Self {
        Self {
            prober: Arc::new(prober),
            config: ScanJobConfig::default(),
            progress: None,
        }
    }

    pub fn with_config(mut self, config: ScanJobConfig) -> Self {
        self.config = config;
        self
    }

    /// Report progress on the given bar, one tick per finished host.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> ScanJobConfig {
        self.config
    }

    /// Scan every host for every port.
    ///
    /// Returns exactly one [`ScanResult`] per entry of `hosts`, in the same
    /// order. `timeout` bounds each name resolution and each connection
    /// attempt individually. Per-host and per-port failures are encoded in
    /// the results; this never fails.
    pub async fn run<S: AsRef<str>>(
        &self,
        hosts: &[S],
        ports: &[Port],
        timeout: Duration,
    ) -> Vec<ScanResult> {
        let started = Instant::now();
        let ports: Arc<[Port]> = Arc::from(ports);
        let host_permits = Arc::new(Semaphore::new(self.config.host_concurrency));
        let connect_permits = Arc::new(Semaphore::new(self.config.connect_concurrency));

        info!(
            hosts = hosts.len(),
            ports = ports.len(),
            ?timeout,
            "starting scan"
        );
        if let Some(pb) = &self.progress {
            pb.set_length(hosts.len() as u64);
        }

        // Permits are taken before spawning, so at most `host_concurrency`
        // tasks exist at once.
        let mut handles: Vec<JoinHandle<ScanResult>> = Vec::with_capacity(hosts.len());
        for host in hosts {
            let job = HostJob {
                host: host.as_ref().to_string(),
                ports: Arc::clone(&ports),
                prober: Arc::clone(&self.prober),
                connect_permits: Arc::clone(&connect_permits),
                buffer: self.config.connect_concurrency,
                timeout,
            };
            // The semaphore is never closed, so this only waits.
            let permit = Arc::clone(&host_permits).acquire_owned().await.ok();
            let progress = self.progress.clone();

            handles.push(tokio::spawn(async move {
                let result = job.run().await;
                drop(permit);
                if let Some(pb) = progress {
                    pb.inc(1);
                }
                result
            }));
        }

        let mut results = Vec::with_capacity(hosts.len());
        for (host, handle) in hosts.iter().zip(handles) {
            let host = host.as_ref();
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    error!(host, error = %e, "scan task failed");
                    results.push(ScanResult::not_found(host));
                }
            }
        }

        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }

        info!(
            hosts = results.len(),
            found = results.iter().filter(|r| !r.not_found).count(),
            open = results.iter().map(ScanResult::open_count).sum::<usize>(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "scan complete"
        );

        results
    }
}

impl Default for ScanEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Scan `hosts` for `ports` with the TCP connect prober and default limits.
pub async fn run<S: AsRef<str>>(hosts: &[S], ports: &[Port], timeout: Duration) -> Vec<ScanResult> {
    ScanEngine::new().run(hosts, ports, timeout).await
}

/// Everything one host task needs, owned so it can move into the task.
struct HostJob {
    host: String,
    ports: Arc<[Port]>,
    prober: Arc<dyn Prober>,
    connect_permits: Arc<Semaphore>,
    buffer: usize,
    timeout: Duration,
}

impl HostJob {
    async fn run(self) -> ScanResult {
        let Some(ip) = self.prober.resolve(&self.host, self.timeout).await else {
            debug!(host = %self.host, "host not found");
            return ScanResult::not_found(self.host);
        };

        let Some((&first, rest)) = self.ports.split_first() else {
            return ScanResult::found(self.host, Vec::new());
        };

        // The first probe doubles as the reachability check.
        let outcome = self.attempt(ip, first).await;
        if outcome.rules_out_host() {
            debug!(host = %self.host, port = %first, ?outcome, "no TCP contact");
            return ScanResult::not_found(self.host);
        }

        let mut states = Vec::with_capacity(self.ports.len());
        states.push(PortResult::new(first, outcome.state()));

        let rest: Vec<PortResult> = stream::iter(rest.iter().copied())
            .map(|port| {
                let job = &self;
                async move { PortResult::new(port, job.attempt(ip, port).await.state()) }
            })
            .buffered(self.buffer)
            .collect()
            .await;
        states.extend(rest);

        ScanResult::found(self.host, states)
    }

    async fn attempt(&self, ip: IpAddr, port: Port) -> ProbeOutcome {
        let _permit = self.connect_permits.acquire().await.ok();
        let outcome = self.prober.connect(ip, port, self.timeout).await;
        if let ProbeOutcome::LocalFailure(reason) = &outcome {
            warn!(host = %self.host, %port, reason = %reason, "local failure, port reported closed");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::net::Ipv4Addr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Scripted prober: hosts map to an address and a delay, ports map to
    /// outcomes. Unknown ports are refused.
    #[derive(Default)]
    struct FakeProber {
        hosts: HashMap<String, (IpAddr, Duration)>,
        ports: HashMap<u16, (ProbeOutcome, Duration)>,
        connects: AtomicUsize,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        resolving: AtomicUsize,
        peak_resolving: AtomicUsize,
        order: Mutex<Vec<String>>,
        panics_on: Option<String>,
    }

    impl FakeProber {
        fn host(mut self, name: &str, delay_ms: u64) -> Self {
            let ip = IpAddr::V4(Ipv4Addr::new(10, 0, 0, self.hosts.len() as u8 + 1));
            self.hosts
                .insert(name.to_string(), (ip, Duration::from_millis(delay_ms)));
            self
        }

        fn panicking(mut self, name: &str) -> Self {
            self.panics_on = Some(name.to_string());
            self.host(name, 0)
        }

        fn port(mut self, port: u16, outcome: ProbeOutcome, delay_ms: u64) -> Self {
            self.ports
                .insert(port, (outcome, Duration::from_millis(delay_ms)));
            self
        }
    }

    #[async_trait]
    impl Prober for FakeProber {
        async fn resolve(&self, host: &str, _timeout: Duration) -> Option<IpAddr> {
            if self.panics_on.as_deref() == Some(host) {
                panic!("resolver blew up on {}", host);
            }
            let (ip, delay) = *self.hosts.get(host)?;

            let now = self.resolving.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_resolving.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.resolving.fetch_sub(1, Ordering::SeqCst);

            self.order.lock().unwrap().push(host.to_string());
            Some(ip)
        }

        async fn connect(&self, _ip: IpAddr, port: Port, _timeout: Duration) -> ProbeOutcome {
            self.connects.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);

            let (outcome, delay) = self
                .ports
                .get(&port.as_u16())
                .cloned()
                .unwrap_or((ProbeOutcome::Refused, Duration::ZERO));
            tokio::time::sleep(delay).await;

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            outcome
        }
    }

    fn ports(values: &[u16]) -> Vec<Port> {
        values.iter().map(|&p| Port::new(p).unwrap()).collect()
    }

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_port_order_ignores_completion_order() {
        let prober = FakeProber::default()
            .host("a", 0)
            .port(1, ProbeOutcome::Open, 0)
            .port(2, ProbeOutcome::Open, 60)
            .port(3, ProbeOutcome::TimedOut, 30)
            .port(4, ProbeOutcome::Refused, 0);
        let engine = ScanEngine::with_prober(prober);

        let results = engine.run(&["a"], &ports(&[1, 2, 3, 4]), TIMEOUT).await;

        assert_eq!(results.len(), 1);
        let states: Vec<(u16, PortState)> = results[0]
            .port_states
            .iter()
            .map(|p| (p.port.as_u16(), p.state))
            .collect();
        assert_eq!(
            states,
            vec![
                (1, PortState::Open),
                (2, PortState::Open),
                (3, PortState::Closed),
                (4, PortState::Closed),
            ]
        );
    }

    #[tokio::test]
    async fn test_host_order_ignores_completion_order() {
        let prober = FakeProber::default()
            .host("slow", 80)
            .host("medium", 40)
            .host("fast", 0)
            .port(22, ProbeOutcome::Open, 0);
        let engine = ScanEngine::with_prober(prober);
        let hosts = ["slow", "missing", "medium", "fast"];

        let results = engine.run(&hosts, &ports(&[22]), TIMEOUT).await;

        let names: Vec<&str> = results.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(names, hosts);
        assert!(results[1].not_found);
        assert!(results.iter().filter(|r| !r.not_found).all(|r| r.open_count() == 1));
    }

    #[tokio::test]
    async fn test_hosts_run_concurrently() {
        let prober = Arc::new(
            FakeProber::default()
                .host("slow", 80)
                .host("fast", 0),
        );

        let engine = ScanEngine::with_prober(Arc::clone(&prober));
        engine.run(&["slow", "fast"], &[], TIMEOUT).await;

        assert_eq!(*prober.order.lock().unwrap(), vec!["fast", "slow"]);
    }

    #[tokio::test]
    async fn test_unresolved_host_has_no_port_states() {
        let prober = FakeProber::default();
        let engine = ScanEngine::with_prober(prober);

        let results = engine.run(&["389.389.389.389"], &ports(&[80]), TIMEOUT).await;

        assert_eq!(results, vec![ScanResult::not_found("389.389.389.389")]);
    }

    #[tokio::test]
    async fn test_first_port_unreachable_stops_probing() {
        let prober = Arc::new(
            FakeProber::default()
                .host("a", 0)
                .port(1, ProbeOutcome::Unreachable("no route to host".into()), 0),
        );

        let engine = ScanEngine::with_prober(Arc::clone(&prober));
        let results = engine.run(&["a"], &ports(&[1, 2, 3]), TIMEOUT).await;

        assert!(results[0].not_found);
        assert!(results[0].port_states.is_empty());
        assert_eq!(prober.connects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_later_unreachable_is_closed() {
        let prober = FakeProber::default()
            .host("a", 0)
            .port(1, ProbeOutcome::Open, 0)
            .port(2, ProbeOutcome::Unreachable("host unreachable".into()), 0);
        let engine = ScanEngine::with_prober(prober);

        let results = engine.run(&["a"], &ports(&[1, 2]), TIMEOUT).await;

        assert!(!results[0].not_found);
        assert_eq!(results[0].port_states[1].state, PortState::Closed);
    }

    #[tokio::test]
    async fn test_empty_port_list() {
        let engine = ScanEngine::with_prober(FakeProber::default().host("a", 0));

        let results = engine.run(&["a", "b"], &[], TIMEOUT).await;

        assert_eq!(
            results,
            vec![ScanResult::found("a", Vec::new()), ScanResult::not_found("b")]
        );
    }

    #[tokio::test]
    async fn test_duplicate_hosts_scanned_independently() {
        let engine = ScanEngine::with_prober(
            FakeProber::default()
                .host("a", 0)
                .port(7, ProbeOutcome::Open, 0),
        );

        let results = engine.run(&["a", "a"], &ports(&[7]), TIMEOUT).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0], results[1]);
    }

    #[tokio::test]
    async fn test_connect_concurrency_is_capped() {
        let mut prober = FakeProber::default();
        for host in ["a", "b", "c", "d"] {
            prober = prober.host(host, 0);
        }
        for port in 1..=20 {
            prober = prober.port(port, ProbeOutcome::Open, 10);
        }
        let prober = Arc::new(prober);

        let config = ScanJobConfig::new()
            .with_host_concurrency(2)
            .with_connect_concurrency(3);
        let engine = ScanEngine::with_prober(Arc::clone(&prober)).with_config(config);
        let all: Vec<u16> = (1..=20).collect();

        let results = engine
            .run(&["a", "b", "c", "d"], &ports(&all), TIMEOUT)
            .await;

        assert!(results.iter().all(|r| r.open_count() == 20));
        assert!(prober.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(prober.connects.load(Ordering::SeqCst), 80);
    }

    #[tokio::test]
    async fn test_panicking_host_is_not_found() {
        let prober = FakeProber::default()
            .host("a", 20)
            .panicking("boom")
            .host("c", 0)
            .port(22, ProbeOutcome::Open, 0);
        let engine = ScanEngine::with_prober(prober);
        let hosts = ["a", "boom", "c"];

        let results = engine.run(&hosts, &ports(&[22]), TIMEOUT).await;

        assert_eq!(results.len(), hosts.len());
        assert_eq!(results[1], ScanResult::not_found("boom"));
        for i in [0, 2] {
            assert_eq!(results[i].host, hosts[i]);
            assert!(!results[i].not_found);
            assert_eq!(results[i].port_states[0].state, PortState::Open);
        }
    }

    #[tokio::test]
    async fn test_host_concurrency_is_capped() {
        let mut prober = FakeProber::default();
        let hosts: Vec<String> = (0..12).map(|i| format!("h{}", i)).collect();
        for host in &hosts {
            prober = prober.host(host, 10);
        }
        let prober = Arc::new(prober);

        let config = ScanJobConfig::new().with_host_concurrency(2);
        let engine = ScanEngine::with_prober(Arc::clone(&prober)).with_config(config);

        let results = engine.run(&hosts, &[], TIMEOUT).await;

        assert_eq!(results.len(), hosts.len());
        assert!(results.iter().all(|r| !r.not_found));
        assert!(prober.peak_resolving.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_local_failure_on_first_port_keeps_host() {
        let prober = FakeProber::default()
            .host("a", 0)
            .port(1, ProbeOutcome::LocalFailure("too many open files".into()), 0)
            .port(2, ProbeOutcome::Open, 0);
        let engine = ScanEngine::with_prober(prober);

        let results = engine.run(&["a"], &ports(&[1, 2]), TIMEOUT).await;

        assert!(!results[0].not_found);
        let states: Vec<PortState> = results[0].port_states.iter().map(|p| p.state).collect();
        assert_eq!(states, vec![PortState::Closed, PortState::Open]);
    }

    #[test]
    fn test_job_config_minimums() {
        let config = ScanJobConfig::new()
            .with_host_concurrency(0)
            .with_connect_concurrency(0);
        assert_eq!(config.host_concurrency, 1);
        assert_eq!(config.connect_concurrency, 1);
    }
}
