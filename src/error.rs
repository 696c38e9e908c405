//! Error types for Refreshr
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in Refreshr
#[derive(Debug, Error)]
pub enum RefreshrError {
    /// Child process exceeded its timeout and was killed
    #[error("Command timed out after {timeout_secs}s: {command}")]
    CommandTimeout { command: String, timeout_secs: u64 },

    /// The OS refused to launch the child process
    #[error("Failed to launch '{command}': {source}")]
    LaunchFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A required external tool could not be resolved
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RefreshrError {
    /// A hung child that was killed, as opposed to one that ran and failed.
    pub fn is_timeout(&self) -> bool {
        matches!(self, RefreshrError::CommandTimeout { .. })
    }
}

/// Result type alias for Refreshr operations
pub type Result<T> = std::result::Result<T, RefreshrError>;
