//! Configuration management for pscan.
//!
//! Provides XDG-compliant settings storage. Command-line flags and
//! environment variables override whatever the settings file says.

mod settings;

pub use settings::{AppSettings, Paths, DEFAULT_HOSTS_FILE, DEFAULT_PORTS};
