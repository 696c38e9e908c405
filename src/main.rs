use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::error;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use refreshr::adb::{HealthProber, SoftResetter};
use refreshr::cli::Cli;
use refreshr::config::{FileConfig, Settings};
use refreshr::devcon::{DeviceLocator, HardResetConfig, HardResetter, MatchRules};
use refreshr::exec::ProcessRunner;
use refreshr::host;
use refreshr::recovery::{Recovery, RecoveryConfig, RecoveryOutcome};

/// A required external tool could not be located/resolved.
const EXIT_TOOL_MISSING: u8 = 2;

/// The elevated-privilege precondition is not satisfied.
const EXIT_NOT_ELEVATED: u8 = 3;

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
        .init();
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let file = FileConfig::load(cli.config.as_ref()).context("Failed to load configuration")?;
    let settings = Settings::resolve(&cli, &file);

    if !host::is_elevated() {
        error!("Administrator privileges are required to disable/enable devices.");
        return Ok(ExitCode::from(EXIT_NOT_ELEVATED));
    }

    let adb = match host::resolve_tool(&settings.adb_path) {
        Ok(path) => path,
        Err(err) => {
            error!("{err}");
            return Ok(ExitCode::from(EXIT_TOOL_MISSING));
        }
    };
    let devcon = match host::resolve_tool(&settings.devcon_path) {
        Ok(path) => path,
        Err(err) => {
            error!("{err}");
            return Ok(ExitCode::from(EXIT_TOOL_MISSING));
        }
    };

    let runner = Arc::new(ProcessRunner::new());
    let command_timeout = Some(settings.command_timeout);

    let prober = HealthProber::new(
        Arc::clone(&runner),
        adb.clone(),
        settings.serial.clone(),
        command_timeout,
    );
    let soft = SoftResetter::new(Arc::clone(&runner), adb, command_timeout);
    let locator = DeviceLocator::new(Arc::clone(&runner), devcon.clone(), MatchRules::ANDROID, command_timeout);
    let hard = HardResetter::new(
        runner,
        devcon,
        HardResetConfig::default()
            .settle(settings.settle_delay)
            .dry_run(settings.dry_run)
            .timeout(command_timeout),
    );

    let recovery = Recovery::new(
        prober,
        soft,
        locator,
        hard,
        RecoveryConfig::new(settings.phase_timeout, settings.poll_interval),
    );
    let outcome: RecoveryOutcome = recovery.run().await;

    if outcome.is_healthy() {
        println!("{}", outcome.to_string().green());
    } else {
        println!("{}", outcome.to_string().red());
    }
    Ok(ExitCode::from(outcome.exit_code()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.is_verbose());
    run(cli).await
}
