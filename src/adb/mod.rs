//! ADB bridge layer - health probing and soft reset.
//!
//! This module provides:
//! - DeviceState classification from `adb devices` output
//! - HealthProber for one fresh observation of the target device
//! - SoftResetter for the kill-server/start-server/reconnect sequence

pub mod probe;
pub mod reset;

pub use probe::{DeviceState, HealthProber, parse_device_list};
pub use reset::{SOFT_RESET_SEQUENCE, SoftResetter};
