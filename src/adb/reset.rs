//! Soft reset - adb server lifecycle cycling.
//!
//! All three lifecycle commands run unconditionally: a server restart may
//! fix device state even when the reconnect that follows exits non-zero.
//! Success is judged only by the subsequent probe, never by these exit
//! codes, so this operation has no return value beyond logging.

use log::{debug, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::exec::CommandRunner;
use crate::recovery::traits::SoftReset;

/// The fixed lifecycle sequence, in issue order.
pub const SOFT_RESET_SEQUENCE: [&str; 3] = ["kill-server", "start-server", "reconnect"];

/// Restarts the adb server and requests a device reconnect.
pub struct SoftResetter<R> {
    runner: Arc<R>,
    adb: PathBuf,
    timeout: Option<Duration>,
}

impl<R: CommandRunner> SoftResetter<R> {
    pub fn new(runner: Arc<R>, adb: PathBuf, timeout: Option<Duration>) -> Self {
        Self { runner, adb, timeout }
    }

    /// Issue the full lifecycle sequence, logging individual failures.
    pub async fn cycle(&self) {
        for subcommand in SOFT_RESET_SEQUENCE {
            match self.runner.run(&self.adb, &[subcommand], self.timeout).await {
                Ok(output) if output.success() => debug!("adb {subcommand} succeeded"),
                Ok(output) => warn!("adb {} failed: {}", subcommand, output.stderr_trimmed()),
                Err(err) => warn!("adb {subcommand} did not complete: {err}"),
            }
        }
    }
}

#[async_trait]
impl<R: CommandRunner> SoftReset for SoftResetter<R> {
    async fn reset(&self) {
        self.cycle().await;
    }
}
