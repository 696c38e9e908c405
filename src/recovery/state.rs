//! The recovery state machine.
//!
//! Escalation is a fixed sequence - probe, soft reset, poll, locate, hard
//! reset, soft reset, poll - expressed as an explicit phase enum and a pure
//! transition function, so every transition is independently testable
//! without touching adb or devcon.

use std::fmt;

use crate::adb::probe::DeviceState;

/// Which escalation round a soft-reset/poll pair belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    /// First round, before any bus-level action
    Initial,
    /// Second round, following a successful hard reset
    AfterHard,
}

/// Transient phases of one recovery run.
///
/// `HardResetting` carries the located instance identifier so the whole
/// machine state lives in one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Probing,
    SoftResetting(Attempt),
    Polling(Attempt),
    Locating,
    HardResetting(String),
}

/// What a phase observed, fed back into [`advance`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    Probed(DeviceState),
    SoftResetDone,
    PollRecovered,
    PollTimedOut,
    Located(String),
    NotLocated,
    HardResetOk,
    HardResetFailed,
}

/// Terminal result of one recovery run. Exactly one is produced per
/// invocation and maps directly to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryOutcome {
    AlreadyHealthy,
    RecoveredBySoftReset,
    RecoveredByHardReset,
    DeviceNotFound,
    HardResetFailed,
    TimedOut,
}

impl RecoveryOutcome {
    /// True when the device was observed healthy by a fresh probe.
    pub fn is_healthy(&self) -> bool {
        matches!(
            self,
            RecoveryOutcome::AlreadyHealthy
                | RecoveryOutcome::RecoveredBySoftReset
                | RecoveryOutcome::RecoveredByHardReset
        )
    }

    /// Process exit code for this outcome.
    pub fn exit_code(&self) -> u8 {
        if self.is_healthy() { 0 } else { 1 }
    }
}

impl fmt::Display for RecoveryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecoveryOutcome::AlreadyHealthy => write!(f, "device already healthy"),
            RecoveryOutcome::RecoveredBySoftReset => write!(f, "device recovered after soft reset"),
            RecoveryOutcome::RecoveredByHardReset => write!(f, "device recovered after hard reset"),
            RecoveryOutcome::DeviceNotFound => write!(f, "no matching USB device found"),
            RecoveryOutcome::HardResetFailed => write!(f, "hard reset failed"),
            RecoveryOutcome::TimedOut => write!(f, "device did not recover before timeout"),
        }
    }
}

/// Result of one transition: keep going or stop with an outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue(Phase),
    Done(RecoveryOutcome),
}

/// Pure transition function of the machine.
///
/// Total over all inputs: a signal that is not meaningful in the current
/// phase leaves the phase unchanged. The driver only produces well-formed
/// pairs; the rule exists so this function has no unreachable arms.
pub fn advance(phase: Phase, signal: Signal) -> Flow {
    use Flow::{Continue, Done};

    match (phase, signal) {
        (Phase::Probing, Signal::Probed(state)) => {
            if state.is_healthy() {
                Done(RecoveryOutcome::AlreadyHealthy)
            } else {
                Continue(Phase::SoftResetting(Attempt::Initial))
            }
        }
        (Phase::SoftResetting(attempt), Signal::SoftResetDone) => Continue(Phase::Polling(attempt)),
        (Phase::Polling(Attempt::Initial), Signal::PollRecovered) => Done(RecoveryOutcome::RecoveredBySoftReset),
        (Phase::Polling(Attempt::Initial), Signal::PollTimedOut) => Continue(Phase::Locating),
        (Phase::Polling(Attempt::AfterHard), Signal::PollRecovered) => Done(RecoveryOutcome::RecoveredByHardReset),
        (Phase::Polling(Attempt::AfterHard), Signal::PollTimedOut) => Done(RecoveryOutcome::TimedOut),
        (Phase::Locating, Signal::Located(instance_id)) => Continue(Phase::HardResetting(instance_id)),
        (Phase::Locating, Signal::NotLocated) => Done(RecoveryOutcome::DeviceNotFound),
        (Phase::HardResetting(_), Signal::HardResetOk) => Continue(Phase::SoftResetting(Attempt::AfterHard)),
        (Phase::HardResetting(_), Signal::HardResetFailed) => Done(RecoveryOutcome::HardResetFailed),
        (phase, _) => Continue(phase),
    }
}
