//! Child process execution - the single seam to the outside world.
//!
//! Everything refreshr does to a device happens by invoking the external
//! adb and devcon tools through the [`CommandRunner`] trait. `ProcessRunner`
//! is the real implementation; `MockRunner` is the scripted test double.

pub mod mock;
pub mod runner;

pub use mock::MockRunner;
pub use runner::{CommandOutput, CommandRunner, ProcessRunner};
