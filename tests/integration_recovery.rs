//! End-to-end recovery scenarios
//!
//! Drives the real prober/resetter/locator components and the orchestrator
//! against a scripted command runner, so the full escalation path is
//! exercised without real adb or devcon binaries.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use refreshr::adb::{HealthProber, SoftResetter};
use refreshr::devcon::{DeviceLocator, HardResetConfig, HardResetter, MatchRules};
use refreshr::exec::MockRunner;
use refreshr::recovery::{Recovery, RecoveryConfig, RecoveryOutcome};

const HEALTHY_LISTING: &str = "List of devices attached\nabc123\tdevice\n";
const OFFLINE_LISTING: &str = "List of devices attached\nabc123\toffline\n";
const ANDROID_FINDALL: &str = "USB\\VID_18D1&PID_4EE7\\5&1A2B3C&0&2: Android Composite ADB Interface\n";
const NO_MATCH_FINDALL: &str = "USB\\ROOT_HUB30\\4&2C9A1F&0: USB Root Hub (USB 3.0)\n";
const NO_MATCH_HWIDS: &str = "USB\\VID_8086&PID_15EC\\1: Intel Hub\n    USB\\VID_8086&PID_15EC\n";

/// Wire the real component stack onto one scripted runner.
fn recovery(
    mock: Arc<MockRunner>,
) -> Recovery<HealthProber<MockRunner>, SoftResetter<MockRunner>, DeviceLocator<MockRunner>, HardResetter<MockRunner>>
{
    let prober = HealthProber::new(Arc::clone(&mock), PathBuf::from("adb"), None, None);
    let soft = SoftResetter::new(Arc::clone(&mock), PathBuf::from("adb"), None);
    let locator = DeviceLocator::new(Arc::clone(&mock), PathBuf::from("devcon"), MatchRules::ANDROID, None);
    let hard = HardResetter::new(
        mock,
        PathBuf::from("devcon"),
        HardResetConfig::default().settle(Duration::ZERO),
    );

    // Scaled-down timing so poll exhaustion takes milliseconds, not minutes.
    let config = RecoveryConfig::new(Duration::from_millis(200), Duration::from_millis(50));
    Recovery::new(prober, soft, locator, hard, config)
}

/// Scenario A: first probe healthy, nothing else ever runs.
#[tokio::test]
async fn test_already_healthy_device_is_left_alone() {
    let mock = Arc::new(MockRunner::new(|_, _| Ok(MockRunner::output(0, HEALTHY_LISTING))));

    let outcome = recovery(Arc::clone(&mock)).run().await;

    assert_eq!(outcome, RecoveryOutcome::AlreadyHealthy);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(mock.calls(), vec!["adb devices"]);
}

/// Soft reset fixes the device: the hard path is never entered.
#[tokio::test]
async fn test_soft_reset_recovers_without_touching_the_bus() {
    // Offline until the reconnect from the soft reset lands.
    let reconnected = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&reconnected);
    let mock = Arc::new(MockRunner::new(move |_, args| {
        if args == ["devices"] {
            let listing = if *flag.lock().unwrap() { HEALTHY_LISTING } else { OFFLINE_LISTING };
            return Ok(MockRunner::output(0, listing));
        }
        if args == ["reconnect"] {
            *flag.lock().unwrap() = true;
        }
        Ok(MockRunner::output(0, ""))
    }));

    let outcome = recovery(Arc::clone(&mock)).run().await;

    assert_eq!(outcome, RecoveryOutcome::RecoveredBySoftReset);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(mock.call_count("kill-server"), 1);
    assert_eq!(mock.call_count("findall"), 0);
    assert_eq!(mock.call_count("disable"), 0);
}

/// Scenario B: device stays unhealthy and enumeration finds nothing.
#[tokio::test]
async fn test_unlocatable_device_fails_without_hard_reset() {
    let mock = Arc::new(MockRunner::new(|_, args| {
        if args == ["devices"] {
            return Ok(MockRunner::output(0, OFFLINE_LISTING));
        }
        if args[0] == "findall" {
            return Ok(MockRunner::output(0, NO_MATCH_FINDALL));
        }
        if args[0] == "hwids" {
            return Ok(MockRunner::output(0, NO_MATCH_HWIDS));
        }
        Ok(MockRunner::output(0, ""))
    }));

    let outcome = recovery(Arc::clone(&mock)).run().await;

    assert_eq!(outcome, RecoveryOutcome::DeviceNotFound);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(mock.call_count("disable"), 0);
    assert_eq!(mock.call_count("enable"), 0);
    // The soft path was attempted before giving up.
    assert_eq!(mock.call_count("kill-server"), 1);
}

/// Scenario C: the device only comes back after the bus-level cycle.
#[tokio::test]
async fn test_hard_reset_recovers_with_one_disable_enable_cycle() {
    let reenabled = Arc::new(Mutex::new(false));
    let flag = Arc::clone(&reenabled);
    let mock = Arc::new(MockRunner::new(move |_, args| {
        if args == ["devices"] {
            let listing = if *flag.lock().unwrap() { HEALTHY_LISTING } else { OFFLINE_LISTING };
            return Ok(MockRunner::output(0, listing));
        }
        if args[0] == "findall" {
            return Ok(MockRunner::output(0, ANDROID_FINDALL));
        }
        if args[0] == "enable" {
            *flag.lock().unwrap() = true;
        }
        Ok(MockRunner::output(0, ""))
    }));

    let outcome = recovery(Arc::clone(&mock)).run().await;

    assert_eq!(outcome, RecoveryOutcome::RecoveredByHardReset);
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(mock.call_count("disable"), 1);
    assert_eq!(mock.call_count("enable"), 1);
    // Soft reset ran before and after the hard reset.
    assert_eq!(mock.call_count("kill-server"), 2);
}

/// A failing disable is terminal and never reaches enable.
#[tokio::test]
async fn test_disable_failure_is_terminal() {
    let mock = Arc::new(MockRunner::new(|_, args| {
        if args == ["devices"] {
            return Ok(MockRunner::output(0, OFFLINE_LISTING));
        }
        if args[0] == "findall" {
            return Ok(MockRunner::output(0, ANDROID_FINDALL));
        }
        if args[0] == "disable" {
            return Ok(MockRunner::failure(1, "device in use"));
        }
        Ok(MockRunner::output(0, ""))
    }));

    let outcome = recovery(Arc::clone(&mock)).run().await;

    assert_eq!(outcome, RecoveryOutcome::HardResetFailed);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(mock.call_count("enable"), 0);
}

/// Device never recovers: both polling budgets burn down to a timeout.
#[tokio::test]
async fn test_stubborn_device_times_out() {
    let mock = Arc::new(MockRunner::new(|_, args| {
        if args == ["devices"] {
            return Ok(MockRunner::output(0, OFFLINE_LISTING));
        }
        if args[0] == "findall" {
            return Ok(MockRunner::output(0, ANDROID_FINDALL));
        }
        Ok(MockRunner::output(0, ""))
    }));

    let outcome = recovery(Arc::clone(&mock)).run().await;

    assert_eq!(outcome, RecoveryOutcome::TimedOut);
    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(mock.call_count("disable"), 1);
    assert_eq!(mock.call_count("enable"), 1);
}

/// A serial filter must ignore other healthy devices entirely.
#[tokio::test]
async fn test_serial_filter_ignores_other_devices() {
    let mock = Arc::new(MockRunner::new(|_, args| {
        if args == ["devices"] {
            // Another device is healthy; the target never shows up.
            return Ok(MockRunner::output(0, HEALTHY_LISTING));
        }
        if args[0] == "findall" {
            return Ok(MockRunner::output(0, NO_MATCH_FINDALL));
        }
        if args[0] == "hwids" {
            return Ok(MockRunner::output(0, NO_MATCH_HWIDS));
        }
        Ok(MockRunner::output(0, ""))
    }));

    let prober = HealthProber::new(
        Arc::clone(&mock),
        PathBuf::from("adb"),
        Some("missing-serial".to_string()),
        None,
    );
    let soft = SoftResetter::new(Arc::clone(&mock), PathBuf::from("adb"), None);
    let locator = DeviceLocator::new(Arc::clone(&mock), PathBuf::from("devcon"), MatchRules::ANDROID, None);
    let hard = HardResetter::new(
        Arc::clone(&mock),
        PathBuf::from("devcon"),
        HardResetConfig::default().settle(Duration::ZERO),
    );
    let config = RecoveryConfig::new(Duration::from_millis(100), Duration::from_millis(25));

    let outcome = Recovery::new(prober, soft, locator, hard, config).run().await;

    // abc123 being healthy never satisfies a probe for missing-serial.
    assert_eq!(outcome, RecoveryOutcome::DeviceNotFound);
}
