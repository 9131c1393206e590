//! Application settings and paths.
//!
//! Settings live in a JSON file under the platform configuration directory
//! (`~/.config/pscan/settings.json` on Linux). Every field is optional and
//! falls back to its built-in default.

use crate::error::{ConfigError, ConfigResult};
use crate::output::OutputFormat;
use crate::scanner::ScanJobConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Host list file used when nothing else is configured.
pub const DEFAULT_HOSTS_FILE: &str = "pscan.hosts";

/// Ports scanned when nothing else is configured.
pub const DEFAULT_PORTS: &str = "22 80-82 443";

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/pscan)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform directories. Nothing is created on disk.
    pub fn discover() -> ConfigResult<Self> {
        let project =
            ProjectDirs::from("", "", "pscan").ok_or(ConfigError::DirectoryNotFound)?;

        Ok(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Host list file, relative to the working directory unless absolute.
    pub hosts_file: PathBuf,
    /// Ports string used by `scan` when `--ports` is not given.
    pub default_ports: String,
    /// Per-attempt timeout in seconds.
    pub timeout_secs: u64,
    /// Hosts scanned concurrently.
    pub host_concurrency: usize,
    /// Connection attempts in flight across all hosts.
    pub connect_concurrency: usize,
    /// Default output format.
    pub output_format: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            hosts_file: PathBuf::from(DEFAULT_HOSTS_FILE),
            default_ports: DEFAULT_PORTS.to_string(),
            timeout_secs: 1,
            host_concurrency: ScanJobConfig::DEFAULT_HOST_CONCURRENCY,
            connect_concurrency: ScanJobConfig::DEFAULT_CONNECT_CONCURRENCY,
            output_format: OutputFormat::Plain,
        }
    }
}

impl AppSettings {
    /// Load settings from the default location, or defaults if there is
    /// no settings file.
    pub fn load() -> ConfigResult<Self> {
        let file = match Paths::discover() {
            Ok(paths) => paths.settings_file(),
            Err(e) => {
                debug!(error = %e, "no configuration directory, using defaults");
                return Ok(Self::default());
            }
        };

        Self::load_or_default(&file)
    }

    /// Load settings from `path`, or defaults if the file does not exist yet.
    pub fn load_or_default(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from(path)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self =
            serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        settings.validate()?;

        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Save settings to the given file, creating parent directories.
    pub fn save_to(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Reject values that would make a scan meaningless.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidFormat(
                "timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.hosts_file.as_os_str().is_empty() {
            return Err(ConfigError::InvalidFormat(
                "hosts_file cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Concurrency limits for the scan engine.
    pub fn job_config(&self) -> ScanJobConfig {
        ScanJobConfig::new()
            .with_host_concurrency(self.host_concurrency)
            .with_connect_concurrency(self.connect_concurrency)
    }
}
