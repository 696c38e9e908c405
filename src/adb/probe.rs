//! Bridge health probing via `adb devices`.
//!
//! The listing command is always invoked without a target filter; serial
//! filtering happens while parsing the output. Probe failures classify as
//! [`DeviceState::Unknown`] instead of erroring, so a flaky adb server is
//! just another unhealthy observation for the orchestrator to escalate on.

use async_trait::async_trait;
use log::{info, warn};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::exec::CommandRunner;
use crate::recovery::traits::HealthProbe;

/// State token adb reports for a fully usable device.
pub const HEALTHY_STATE: &str = "device";

/// Bridge-level connection state of the target device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceState {
    /// Listed with the healthy state token
    Healthy,
    /// Listed but awaiting USB debugging authorization
    Unauthorized,
    /// Listed but offline
    Offline,
    /// Listed with some other state token, preserved for logging
    Other(String),
    /// No matching record in the listing
    Absent,
    /// The listing command itself failed
    Unknown,
}

impl DeviceState {
    /// Map an `adb devices` state token to a classification.
    pub fn from_token(token: &str) -> Self {
        match token {
            HEALTHY_STATE => DeviceState::Healthy,
            "unauthorized" => DeviceState::Unauthorized,
            "offline" => DeviceState::Offline,
            other => DeviceState::Other(other.to_string()),
        }
    }

    /// Only `Healthy` satisfies recovery; every other state escalates.
    pub fn is_healthy(&self) -> bool {
        matches!(self, DeviceState::Healthy)
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Healthy => write!(f, "device"),
            DeviceState::Unauthorized => write!(f, "unauthorized"),
            DeviceState::Offline => write!(f, "offline"),
            DeviceState::Other(token) => write!(f, "{token}"),
            DeviceState::Absent => write!(f, "absent"),
            DeviceState::Unknown => write!(f, "unknown"),
        }
    }
}

/// Select the target record from `adb devices` output.
///
/// Skips the header line and any record with fewer than two fields. With a
/// serial filter, the first record whose serial matches wins; without one,
/// the first record wins. Returns `(serial, state_token)`.
pub fn parse_device_list(output: &str, serial: Option<&str>) -> Option<(String, String)> {
    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.to_lowercase().starts_with("list of devices") {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(device_serial), Some(state)) = (parts.next(), parts.next()) else {
            continue;
        };
        if let Some(wanted) = serial {
            if device_serial != wanted {
                continue;
            }
        }
        return Some((device_serial.to_string(), state.to_string()));
    }
    None
}

/// Probes the target device's bridge-level state.
pub struct HealthProber<R> {
    runner: Arc<R>,
    adb: PathBuf,
    serial: Option<String>,
    timeout: Option<Duration>,
}

impl<R: CommandRunner> HealthProber<R> {
    pub fn new(runner: Arc<R>, adb: PathBuf, serial: Option<String>, timeout: Option<Duration>) -> Self {
        Self {
            runner,
            adb,
            serial,
            timeout,
        }
    }

    /// One fresh observation. Never errors: command failures are logged and
    /// classified as `Unknown`.
    pub async fn observe(&self) -> DeviceState {
        let output = match self.runner.run(&self.adb, &["devices"], self.timeout).await {
            Ok(output) => output,
            Err(err) => {
                warn!("adb devices did not complete: {err}");
                return DeviceState::Unknown;
            }
        };
        if !output.success() {
            warn!("adb devices failed: {}", output.stderr_trimmed());
            return DeviceState::Unknown;
        }

        match parse_device_list(&output.stdout, self.serial.as_deref()) {
            None => {
                info!("No ADB device found.");
                DeviceState::Absent
            }
            Some((serial, token)) => {
                let state = DeviceState::from_token(&token);
                if state.is_healthy() {
                    info!("ADB device {serial} is healthy ({state}).");
                } else {
                    warn!("ADB device {serial} unhealthy ({state}).");
                }
                state
            }
        }
    }
}

#[async_trait]
impl<R: CommandRunner> HealthProbe for HealthProber<R> {
    async fn probe(&self) -> DeviceState {
        self.observe().await
    }
}
