//! Recovery driver - runs the state machine exactly once.
//!
//! Each transient phase performs its side effect through a collaborator
//! trait, feeds the observed signal into the pure transition function, and
//! follows the returned flow. A success outcome is only ever produced
//! immediately after a fresh probe observed a healthy device.

use log::{error, info, warn};
use std::time::Duration;
use tokio::time::{Instant, sleep};

use crate::recovery::state::{Attempt, Flow, Phase, RecoveryOutcome, Signal, advance};
use crate::recovery::traits::{HardReset, HealthProbe, LocateDevice, SoftReset};

/// Default per-phase recovery budget.
pub const DEFAULT_PHASE_TIMEOUT: Duration = Duration::from_secs(30);

/// Default delay between health probes while polling.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Timing contract for the orchestrator.
///
/// Each polling phase gets the full `phase_timeout`; the post-soft-reset and
/// post-hard-reset budgets are not aggregated.
#[derive(Debug, Clone)]
pub struct RecoveryConfig {
    /// Time budget for each polling phase
    pub phase_timeout: Duration,
    /// Delay between probes within a polling phase
    pub poll_interval: Duration,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            phase_timeout: DEFAULT_PHASE_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl RecoveryConfig {
    pub fn new(phase_timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            phase_timeout,
            poll_interval,
        }
    }
}

/// Drives the escalation sequence over four collaborator seams.
pub struct Recovery<P, S, L, H>
where
    P: HealthProbe,
    S: SoftReset,
    L: LocateDevice,
    H: HardReset,
{
    probe: P,
    soft: S,
    locate: L,
    hard: H,
    config: RecoveryConfig,
}

impl<P, S, L, H> Recovery<P, S, L, H>
where
    P: HealthProbe,
    S: SoftReset,
    L: LocateDevice,
    H: HardReset,
{
    pub fn new(probe: P, soft: S, locate: L, hard: H, config: RecoveryConfig) -> Self {
        Self {
            probe,
            soft,
            locate,
            hard,
            config,
        }
    }

    /// Run the machine to a terminal outcome. Exactly one outcome is
    /// produced per invocation; the cycle never restarts itself.
    pub async fn run(&self) -> RecoveryOutcome {
        let mut phase = Phase::Probing;
        loop {
            let signal = self.step(&phase).await;
            match advance(phase, signal) {
                Flow::Continue(next) => phase = next,
                Flow::Done(outcome) => {
                    if outcome.is_healthy() {
                        info!("Recovery finished: {outcome}.");
                    } else {
                        error!("Recovery failed: {outcome}.");
                    }
                    return outcome;
                }
            }
        }
    }

    /// Perform the current phase's side effect and report what happened.
    async fn step(&self, phase: &Phase) -> Signal {
        match phase {
            Phase::Probing => Signal::Probed(self.probe.probe().await),
            Phase::SoftResetting(attempt) => {
                match attempt {
                    Attempt::Initial => info!("Attempting soft reset of ADB server."),
                    Attempt::AfterHard => info!("Repeating soft reset after hard reset."),
                }
                self.soft.reset().await;
                Signal::SoftResetDone
            }
            Phase::Polling(_) => {
                if self.poll_until_healthy().await {
                    Signal::PollRecovered
                } else {
                    Signal::PollTimedOut
                }
            }
            Phase::Locating => {
                warn!("Soft reset did not recover device; attempting hard reset.");
                match self.locate.locate().await {
                    Some(instance_id) => Signal::Located(instance_id),
                    None => {
                        error!("Unable to locate USB device for hard reset.");
                        Signal::NotLocated
                    }
                }
            }
            Phase::HardResetting(instance_id) => {
                if self.hard.reset(instance_id).await {
                    Signal::HardResetOk
                } else {
                    Signal::HardResetFailed
                }
            }
        }
    }

    /// Probe on a fixed interval until healthy or the phase budget elapses.
    /// The deadline comes from a monotonic clock read once at entry, so
    /// cumulative sleep overhead cannot stretch the budget.
    async fn poll_until_healthy(&self) -> bool {
        let deadline = Instant::now() + self.config.phase_timeout;
        while Instant::now() < deadline {
            if self.probe.probe().await.is_healthy() {
                return true;
            }
            sleep(self.config.poll_interval).await;
        }
        false
    }
}
