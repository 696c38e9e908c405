//! CLI definition using clap.
//!
//! Single-purpose tool, so no subcommands: every flag tunes the one
//! recovery run.

use clap::Parser;
use std::path::PathBuf;

/// Refresh wedged ADB USB devices using devcon
#[derive(Parser, Debug)]
#[command(name = "refreshr")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to adb, or a name resolved on PATH
    #[arg(long)]
    pub adb_path: Option<String>,

    /// Path to devcon, or a name resolved on PATH
    #[arg(long)]
    pub devcon_path: Option<String>,

    /// Seconds to wait for recovery per phase
    #[arg(short, long)]
    pub timeout: Option<u64>,

    /// ADB device serial to target
    #[arg(short, long)]
    pub serial: Option<String>,

    /// Log intended devcon changes without executing them
    #[arg(long)]
    pub dry_run: bool,

    /// Optional config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["refreshr"]).unwrap();
        assert!(cli.adb_path.is_none());
        assert!(cli.devcon_path.is_none());
        assert!(cli.timeout.is_none());
        assert!(cli.serial.is_none());
        assert!(!cli.dry_run);
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn test_cli_tool_paths() {
        let cli = Cli::try_parse_from([
            "refreshr",
            "--adb-path",
            "/opt/platform-tools/adb",
            "--devcon-path",
            "C:/tools/devcon.exe",
        ])
        .unwrap();
        assert_eq!(cli.adb_path.as_deref(), Some("/opt/platform-tools/adb"));
        assert_eq!(cli.devcon_path.as_deref(), Some("C:/tools/devcon.exe"));
    }

    #[test]
    fn test_cli_timeout_short_and_long() {
        let cli = Cli::try_parse_from(["refreshr", "-t", "45"]).unwrap();
        assert_eq!(cli.timeout, Some(45));

        let cli = Cli::try_parse_from(["refreshr", "--timeout", "90"]).unwrap();
        assert_eq!(cli.timeout, Some(90));
    }

    #[test]
    fn test_cli_timeout_rejects_non_numeric() {
        assert!(Cli::try_parse_from(["refreshr", "-t", "soon"]).is_err());
    }

    #[test]
    fn test_cli_serial() {
        let cli = Cli::try_parse_from(["refreshr", "-s", "R58M123ABC"]).unwrap();
        assert_eq!(cli.serial.as_deref(), Some("R58M123ABC"));
    }

    #[test]
    fn test_cli_dry_run_flag() {
        let cli = Cli::try_parse_from(["refreshr", "--dry-run"]).unwrap();
        assert!(cli.dry_run);
    }

    #[test]
    fn test_cli_config_option() {
        let cli = Cli::try_parse_from(["refreshr", "-c", "/path/to/refreshr.yml"]).unwrap();
        assert_eq!(cli.config.as_ref(), Some(&PathBuf::from("/path/to/refreshr.yml")));
    }

    #[test]
    fn test_cli_verbose_flag() {
        let cli = Cli::try_parse_from(["refreshr", "-v"]).unwrap();
        assert!(cli.is_verbose());
    }

    #[test]
    fn test_help_works() {
        // Verify the clap definition is internally consistent.
        Cli::command().debug_assert();
    }

    #[test]
    fn test_version_flag() {
        // Version flag causes early exit with error (expected)
        assert!(Cli::try_parse_from(["refreshr", "--version"]).is_err());
    }
}
