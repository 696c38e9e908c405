//! Scripted command runner for tests.
//!
//! The handler closure decides what each invocation returns, so a test can
//! model a device that changes state between probes. Every invocation is
//! recorded for call-count assertions.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use crate::error::Result;
use crate::exec::runner::{CommandOutput, CommandRunner};

type Handler = dyn Fn(&str, &[&str]) -> Result<CommandOutput> + Send + Sync;

/// Test double for [`CommandRunner`].
pub struct MockRunner {
    handler: Box<Handler>,
    calls: Mutex<Vec<String>>,
}

impl MockRunner {
    /// Create a runner whose responses are produced by `handler`.
    ///
    /// The handler receives the program name (file stem only, so scripted
    /// tests do not care whether the caller resolved `adb` to a full path)
    /// and the argument list.
    pub fn new(handler: impl Fn(&str, &[&str]) -> Result<CommandOutput> + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Runner that answers every invocation with exit 0 and empty output.
    pub fn always_ok() -> Self {
        Self::new(|_, _| Ok(MockRunner::output(0, "")))
    }

    /// Convenience constructor for a scripted [`CommandOutput`].
    pub fn output(status: i32, stdout: &str) -> CommandOutput {
        CommandOutput {
            status: Some(status),
            stdout: stdout.to_string(),
            stderr: String::new(),
        }
    }

    /// Scripted failure with stderr text, mirroring how real tools complain.
    pub fn failure(status: i32, stderr: &str) -> CommandOutput {
        CommandOutput {
            status: Some(status),
            stdout: String::new(),
            stderr: stderr.to_string(),
        }
    }

    /// Every recorded invocation, rendered as "program arg1 arg2 ...".
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of recorded invocations containing `needle`.
    pub fn call_count(&self, needle: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.contains(needle))
            .count()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, program: &Path, args: &[&str], _timeout: Option<Duration>) -> Result<CommandOutput> {
        let name = program
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.display().to_string());

        let mut rendered = name.clone();
        for arg in args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        self.calls.lock().unwrap().push(rendered);

        (self.handler)(&name, args)
    }
}
