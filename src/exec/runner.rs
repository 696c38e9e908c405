//! Command runner - executes external tools with an optional timeout.
//!
//! Non-zero exit codes are NOT errors at this layer: an adb reconnect may
//! exit non-zero and still have had side effects worth inspecting, so the
//! exit status is captured and handed to the caller for interpretation.
//! Only two things are errors here: the OS refusing to launch the child,
//! and the child outliving its timeout (in which case it is killed).

use async_trait::async_trait;
use log::debug;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{RefreshrError, Result};

/// Captured result of one child process run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, if the process exited normally (None if killed by signal)
    pub status: Option<i32>,
    /// Captured stdout, lossily decoded
    pub stdout: String,
    /// Captured stderr, lossily decoded
    pub stderr: String,
}

impl CommandOutput {
    /// True when the process ran to completion with exit code 0.
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Trimmed stderr for log messages.
    pub fn stderr_trimmed(&self) -> &str {
        self.stderr.trim()
    }
}

/// Executes an external command and captures its output.
///
/// The trait seam exists so every component above this layer can be tested
/// against a scripted runner instead of real adb/devcon binaries.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run `program` with `args`, waiting at most `timeout` if one is given.
    async fn run(&self, program: &Path, args: &[&str], timeout: Option<Duration>) -> Result<CommandOutput>;
}

/// Real child-process runner backed by tokio.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

fn render_command(program: &Path, args: &[&str]) -> String {
    let mut rendered = program.display().to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn run(&self, program: &Path, args: &[&str], timeout: Option<Duration>) -> Result<CommandOutput> {
        let rendered = render_command(program, args);
        debug!("Running command: {}", rendered);

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // If the timeout fires, dropping the future must take the child with it.
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(|source| RefreshrError::LaunchFailure {
            command: rendered.clone(),
            source,
        })?;

        let output = match timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait_with_output()).await {
                Ok(result) => result?,
                Err(_) => {
                    return Err(RefreshrError::CommandTimeout {
                        command: rendered,
                        timeout_secs: limit.as_secs(),
                    });
                }
            },
            None => child.wait_with_output().await?,
        };

        Ok(CommandOutput {
            status: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
