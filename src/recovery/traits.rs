//! Collaborator seams for the recovery orchestrator.
//!
//! The orchestrator only ever talks to these four traits, so its escalation
//! logic can be exercised with stubs while the real implementations talk to
//! adb and devcon.

use async_trait::async_trait;

use crate::adb::probe::DeviceState;

/// One fresh observation of the target device's bridge-level state.
#[async_trait]
pub trait HealthProbe: Send + Sync {
    async fn probe(&self) -> DeviceState;
}

/// Protocol-level reset: cycle the bridge server and request reconnect.
/// Success is judged only by the probe that follows.
#[async_trait]
pub trait SoftReset: Send + Sync {
    async fn reset(&self);
}

/// Find the bus instance identifier of the target device, if any.
#[async_trait]
pub trait LocateDevice: Send + Sync {
    async fn locate(&self) -> Option<String>;
}

/// Bus-level reset of one instance; false means the cycle did not complete.
#[async_trait]
pub trait HardReset: Send + Sync {
    async fn reset(&self, instance_id: &str) -> bool;
}
