//! # pscan - Host Inventory and TCP Port Scanner
//!
//! pscan keeps a list of hosts on disk and probes a set of TCP ports on
//! every one of them concurrently, reporting each port as open or closed,
//! or the whole host as not found.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use pscan::scanner;
//! use pscan::types::PortSpec;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     let ports: PortSpec = "22 80-82 443".parse().unwrap();
//!     let hosts = ["localhost", "example.com"];
//!
//!     let results = scanner::run(&hosts, ports.ports(), Duration::from_secs(1)).await;
//!
//!     for result in results {
//!         println!("{}: {} open", result.host, result.open_count());
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Ports, the ports-string parser, host list and target parsing
//! - [`scanner`] - The scan engine and the `Prober` trait
//! - [`storage`] - Host list persistence
//! - [`config`] - Settings file management
//! - [`output`] - Plain text, JSON and CSV rendering
//! - [`cli`] - Subcommands
//! - [`error`] - Error types

pub mod cli;
pub mod config;
pub mod error;
pub mod output;
pub mod scanner;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{CliError, CliResult};
pub use scanner::{PortResult, PortState, Prober, ScanEngine, ScanResult};
pub use types::{HostList, Port, PortSpec};
