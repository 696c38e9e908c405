//! Configuration system for Refreshr.
//!
//! Layered resolution, later overrides earlier:
//! 1. Built-in defaults
//! 2. Config file (.refreshr.yml in the current directory, or
//!    ~/.config/refreshr/refreshr.yml, or an explicit --config path)
//! 3. CLI flags

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::error::{RefreshrError, Result};

/// Default adb invocation (resolved on PATH).
pub const DEFAULT_ADB_PATH: &str = "adb";

/// Default devcon invocation (resolved on PATH).
pub const DEFAULT_DEVCON_PATH: &str = "devcon";

/// Default per-phase recovery budget in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default delay between health probes while polling, in seconds.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Default settle delay between disable and enable, in seconds.
pub const DEFAULT_SETTLE_SECS: u64 = 2;

/// Ceiling applied to every adb/devcon invocation so a hung tool surfaces
/// as a timeout instead of stalling a phase.
pub const COMMAND_TIMEOUT_SECS: u64 = 30;

/// Project config file name, looked up in the current directory.
const PROJECT_CONFIG: &str = ".refreshr.yml";

/// Raw config file contents; every field optional so the file only states
/// what it wants to override.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct FileConfig {
    pub adb_path: Option<String>,
    pub devcon_path: Option<String>,
    pub timeout_secs: Option<u64>,
    pub poll_interval_secs: Option<u64>,
    pub settle_secs: Option<u64>,
    pub serial: Option<String>,
}

impl FileConfig {
    /// Load configuration from the standard search paths.
    ///
    /// Search order:
    /// 1. Explicit path if provided (an error if unreadable)
    /// 2. .refreshr.yml in the current directory
    /// 3. ~/.config/refreshr/refreshr.yml
    /// 4. Defaults
    pub fn load(explicit_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = explicit_path {
            if !path.is_file() {
                return Err(RefreshrError::Config(format!("config file not found: {}", path.display())));
            }
            return Self::from_file(path);
        }

        let project = PathBuf::from(PROJECT_CONFIG);
        if project.is_file() {
            return Self::from_file(&project);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user = config_dir.join("refreshr").join("refreshr.yml");
            if user.is_file() {
                return Self::from_file(&user);
            }
        }

        Ok(Self::default())
    }

    /// Parse one YAML config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&raw)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }
}

/// Fully resolved settings handed to the core as plain parameters.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Path or PATH name of the adb tool
    pub adb_path: String,
    /// Path or PATH name of the devcon tool
    pub devcon_path: String,
    /// ADB serial to target; first listed device when absent
    pub serial: Option<String>,
    /// Per-phase recovery budget
    pub phase_timeout: Duration,
    /// Delay between health probes while polling
    pub poll_interval: Duration,
    /// Settle delay between disable and enable
    pub settle_delay: Duration,
    /// Per-command execution ceiling
    pub command_timeout: Duration,
    /// Log intended devcon changes without executing them
    pub dry_run: bool,
}

impl Settings {
    /// Merge CLI flags over file values over defaults.
    pub fn resolve(cli: &Cli, file: &FileConfig) -> Self {
        Self {
            adb_path: cli
                .adb_path
                .clone()
                .or_else(|| file.adb_path.clone())
                .unwrap_or_else(|| DEFAULT_ADB_PATH.to_string()),
            devcon_path: cli
                .devcon_path
                .clone()
                .or_else(|| file.devcon_path.clone())
                .unwrap_or_else(|| DEFAULT_DEVCON_PATH.to_string()),
            serial: cli.serial.clone().or_else(|| file.serial.clone()),
            phase_timeout: Duration::from_secs(cli.timeout.or(file.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS)),
            poll_interval: Duration::from_secs(file.poll_interval_secs.unwrap_or(DEFAULT_POLL_INTERVAL_SECS)),
            settle_delay: Duration::from_secs(file.settle_secs.unwrap_or(DEFAULT_SETTLE_SECS)),
            command_timeout: Duration::from_secs(COMMAND_TIMEOUT_SECS),
            dry_run: cli.dry_run,
        }
    }
}
