//! Host environment preconditions.
//!
//! Both gates run once, before anything mutating: the two external tools
//! must resolve to real executables, and devcon needs an elevated shell on
//! Windows.

use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use crate::error::{RefreshrError, Result};

/// Resolve a tool given either a filesystem path or a bare name.
///
/// A value containing a path separator must name an existing file; a bare
/// name is looked up on PATH.
pub fn resolve_tool(path_or_name: &str) -> Result<PathBuf> {
    if path_or_name.contains(MAIN_SEPARATOR) || path_or_name.contains('/') {
        let candidate = Path::new(path_or_name);
        if candidate.is_file() {
            return Ok(candidate.to_path_buf());
        }
        return Err(RefreshrError::ToolNotFound(path_or_name.to_string()));
    }
    which::which(path_or_name).map_err(|_| RefreshrError::ToolNotFound(path_or_name.to_string()))
}

/// Whether the process holds the privileges devcon needs.
///
/// Disabling and re-enabling devices requires an elevated shell on Windows;
/// `net session` exits zero only when elevated, which keeps the gate a thin
/// boolean probe instead of a Win32 binding.
#[cfg(windows)]
pub fn is_elevated() -> bool {
    use std::process::{Command, Stdio};

    Command::new("net")
        .arg("session")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Elevation is a Windows-only concern; elsewhere the gate is satisfied.
#[cfg(not(windows))]
pub fn is_elevated() -> bool {
    true
}
