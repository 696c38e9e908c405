//! devcon bus-control layer - device location and hard reset.
//!
//! This module provides:
//! - Two-stage USB device matching (display name, then vendor-ID allowlist)
//! - Parsers for `devcon findall` and `devcon hwids` output
//! - HardResetter for the disable/settle/enable cycle

pub mod locate;
pub mod reset;

pub use locate::{
    ANDROID_INTERFACE_NAME, ANDROID_VENDOR_IDS, DeviceLocator, MatchRules, UsbCandidate, parse_findall, parse_hwids,
};
pub use reset::{HardResetConfig, HardResetter, SETTLE_DELAY};
