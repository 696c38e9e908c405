//! Recovery orchestration - the escalating state machine.
//!
//! This module provides:
//! - Collaborator trait seams (probe, soft reset, locate, hard reset)
//! - The pure phase/signal transition function
//! - The Recovery driver that runs the machine exactly once per invocation

pub mod orchestrator;
pub mod state;
pub mod traits;

pub use orchestrator::{Recovery, RecoveryConfig};
pub use state::{Attempt, Flow, Phase, RecoveryOutcome, Signal, advance};
pub use traits::{HardReset, HealthProbe, LocateDevice, SoftReset};
