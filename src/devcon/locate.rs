//! USB device location via devcon enumeration.
//!
//! The target may be invisible to adb precisely because it needs a bus-level
//! reset, so location never consults the bridge. Matching is two-stage with
//! first match winning: display name first, then a vendor-ID allowlist. The
//! allowlist match is deliberately last-resort and coarser (vendor only, not
//! vendor+product) because display names vary across locales and driver
//! versions.

use async_trait::async_trait;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::exec::CommandRunner;
use crate::recovery::traits::LocateDevice;

/// Display name the Android USB interface registers under.
pub const ANDROID_INTERFACE_NAME: &str = "Android Composite ADB Interface";

/// Vendor IDs of common Android handset makers, uppercase 4-hex-digit codes.
pub const ANDROID_VENDOR_IDS: [&str; 9] = [
    "18D1", // Google
    "0BB4", // HTC
    "12D1", // Huawei
    "04E8", // Samsung
    "22B8", // Motorola
    "2A70", // OnePlus
    "0FCE", // Sony
    "0502", // Acer
    "05C6", // Qualcomm
];

/// Immutable matching configuration handed to the locator.
#[derive(Debug, Clone, Copy)]
pub struct MatchRules {
    /// Case-insensitive substring to match against display names
    pub device_name: &'static str,
    /// Vendor-ID allowlist for the fallback stage
    pub vendor_ids: &'static [&'static str],
}

impl MatchRules {
    /// Rules for the Android ADB interface.
    pub const ANDROID: MatchRules = MatchRules {
        device_name: ANDROID_INTERFACE_NAME,
        vendor_ids: &ANDROID_VENDOR_IDS,
    };
}

/// One enumerated USB bus entry.
///
/// Constructed fresh on every enumeration call and never cached across
/// orchestrator phases; the bus can change between them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsbCandidate {
    /// Opaque instance identifier devcon accepts back for disable/enable
    pub instance_id: String,
    /// Human-readable display name
    pub name: String,
    /// `USB\VID_xxxx&PID_xxxx` strings, uppercased
    pub hardware_ids: Vec<String>,
}

/// Parse `devcon findall` output: one `<instanceId>: <displayName>` per line.
pub fn parse_findall(output: &str) -> Vec<UsbCandidate> {
    let mut devices = Vec::new();
    for line in output.lines() {
        let Some((instance_id, name)) = line.split_once(':') else {
            continue;
        };
        devices.push(UsbCandidate {
            instance_id: instance_id.trim().to_string(),
            name: name.trim().to_string(),
            hardware_ids: Vec::new(),
        });
    }
    devices
}

/// Parse `devcon hwids` output: blank-line-separated blocks, each an
/// unindented `<instanceId>: <displayName>` header followed by indented
/// hardware-ID lines.
pub fn parse_hwids(output: &str) -> Vec<UsbCandidate> {
    let mut devices = Vec::new();
    let mut current: Option<UsbCandidate> = None;
    for line in output.lines() {
        if line.trim().is_empty() {
            if let Some(device) = current.take() {
                devices.push(device);
            }
            continue;
        }
        if line.contains(':') && !line.starts_with(char::is_whitespace) {
            if let Some(device) = current.take() {
                devices.push(device);
            }
            let (instance_id, name) = line.split_once(':').unwrap_or((line, ""));
            current = Some(UsbCandidate {
                instance_id: instance_id.trim().to_string(),
                name: name.trim().to_string(),
                hardware_ids: Vec::new(),
            });
            continue;
        }
        if let Some(device) = current.as_mut() {
            if let Some(hwid) = extract_hardware_id(line) {
                device.hardware_ids.push(hwid);
            }
        }
    }
    if let Some(device) = current.take() {
        devices.push(device);
    }
    devices
}

/// Extract an uppercased `USB\VID_xxxx&PID_xxxx` pattern from a line.
fn extract_hardware_id(line: &str) -> Option<String> {
    const PREFIX: &str = "USB\\VID_";
    const PATTERN_LEN: usize = 21; // USB\VID_xxxx&PID_xxxx

    let upper = line.to_ascii_uppercase();
    let start = upper.find(PREFIX)?;
    let candidate = upper.get(start..start + PATTERN_LEN)?;
    let bytes = candidate.as_bytes();
    if &bytes[12..17] != b"&PID_" {
        return None;
    }
    let hex_ok = bytes[8..12].iter().chain(&bytes[17..21]).all(|b| b.is_ascii_hexdigit());
    if !hex_ok {
        return None;
    }
    Some(candidate.to_string())
}

/// Extract the 4-hex-digit vendor-ID field from a hardware-ID string.
pub fn vendor_id(hwid: &str) -> Option<&str> {
    let start = hwid.find("VID_")?;
    let vid = hwid.get(start + 4..start + 8)?;
    if vid.chars().all(|c| c.is_ascii_hexdigit()) { Some(vid) } else { None }
}

/// Finds the USB bus instance identifier of the target device.
pub struct DeviceLocator<R> {
    runner: Arc<R>,
    devcon: PathBuf,
    rules: MatchRules,
    timeout: Option<Duration>,
}

impl<R: CommandRunner> DeviceLocator<R> {
    pub fn new(runner: Arc<R>, devcon: PathBuf, rules: MatchRules, timeout: Option<Duration>) -> Self {
        Self {
            runner,
            devcon,
            rules,
            timeout,
        }
    }

    /// Two-stage search; `None` means the device genuinely was not found,
    /// which the orchestrator surfaces as its own terminal outcome.
    pub async fn find(&self) -> Option<String> {
        match self.runner.run(&self.devcon, &["findall", "=usb"], self.timeout).await {
            Ok(output) if output.success() => {
                let needle = self.rules.device_name.to_lowercase();
                for candidate in parse_findall(&output.stdout) {
                    if candidate.name.to_lowercase().contains(&needle) {
                        info!("Matched device by name: {}", candidate.name);
                        return Some(candidate.instance_id);
                    }
                }
            }
            Ok(output) => warn!("devcon findall failed: {}", output.stderr_trimmed()),
            Err(err) => warn!("devcon findall did not complete: {err}"),
        }

        let output = match self.runner.run(&self.devcon, &["hwids", "=usb"], self.timeout).await {
            Ok(output) if output.success() => output,
            Ok(output) => {
                error!("devcon hwids failed: {}", output.stderr_trimmed());
                return None;
            }
            Err(err) => {
                error!("devcon hwids did not complete: {err}");
                return None;
            }
        };
        for candidate in parse_hwids(&output.stdout) {
            for hwid in &candidate.hardware_ids {
                if let Some(vid) = vendor_id(hwid) {
                    if self.rules.vendor_ids.iter().any(|allowed| *allowed == vid) {
                        info!("Matched device by VID/PID: {hwid}");
                        return Some(candidate.instance_id);
                    }
                }
            }
        }
        None
    }
}

#[async_trait]
impl<R: CommandRunner> LocateDevice for DeviceLocator<R> {
    async fn locate(&self) -> Option<String> {
        self.find().await
    }
}
