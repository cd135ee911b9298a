//! # Run Command Implementation
//!
//! This module implements the `run` subcommand: it takes an exclusive lock,
//! runs a child command, and logs the command's standard output one level
//! indented under a heading.
//!
//! ## Functionality
//!
//! - **Locking**: `--lock PATH` or `--lock-name NAME` (a file in the default
//!   locks directory). Without either, the command runs unlocked. A lock that
//!   cannot be taken within `--timeout` seconds aborts before the child
//!   starts.
//! - **Destinations**: Standard output by default, or the destinations of a
//!   `--config` file, plus optional `--log-file` and `--debug-file`.
//! - **Exit Status**: A failing child is recorded as a failure and its exit
//!   code is passed on.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};
use std::time::Duration;

use brewed_log::config;
use brewed_log::defaults::{default_locks_dir, DEFAULT_LOCK_TIMEOUT};
use brewed_log::destination::{DestinationConfig, Level, Target};
use brewed_log::lock::{lock_path, run_locked};
use brewed_log::logger::Logger;
use brewed_log::message::{HeadingLevel, LogMessage};

/// Run a command while holding an exclusive lock
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Lock file to hold while the command runs.
    #[arg(long, value_name = "PATH", conflicts_with = "lock_name")]
    pub lock: Option<PathBuf>,

    /// Name of a lock file in the default locks directory.
    #[arg(long, value_name = "NAME")]
    pub lock_name: Option<String>,

    /// Seconds to wait for the lock (defaults to the config value, then 600).
    #[arg(short, long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Logging configuration file.
    #[arg(short, long, value_name = "FILE", env = "BREWED_LOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Also append output-level messages to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Also append debug-level messages, timestamped, to this file.
    #[arg(long, value_name = "PATH")]
    pub debug_file: Option<PathBuf>,

    /// The command to run, and its arguments.
    #[arg(required = true, trailing_var_arg = true, value_name = "COMMAND")]
    pub command: Vec<String>,
}

/// Execute the `run` command.
pub fn execute(args: RunArgs) -> Result<()> {
    let log_config = match &args.config {
        Some(path) => Some(
            config::from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?,
        ),
        None => None,
    };

    let mut logger = match &log_config {
        Some(log_config) => Logger::from_config(log_config)?,
        None => Logger::with_console()?,
    };
    if let Some(path) = &args.log_file {
        logger.open_destination(DestinationConfig::new(Target::File(path.clone())))?;
    }
    if let Some(path) = &args.debug_file {
        logger.open_destination(
            DestinationConfig::new(Target::File(path.clone()))
                .level(Level::Debug)
                .timestamp(true),
        )?;
    }

    let timeout = match (args.timeout, &log_config) {
        (Some(secs), _) => Duration::from_secs(secs),
        (None, Some(log_config)) => log_config.lock_timeout(),
        (None, None) => DEFAULT_LOCK_TIMEOUT,
    };

    let lock = match (&args.lock, &args.lock_name) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(name)) => Some(lock_path(&default_locks_dir(), name)?),
        (None, None) => None,
    };

    let status = match &lock {
        Some(path) => {
            logger.debug(&[LogMessage::text(format!("Locking '{}'", path.display()))])?;
            run_locked(&mut logger, path, timeout, |logger| {
                run_command(logger, &args.command)
            })??
        }
        None => run_command(&mut logger, &args.command)?,
    };

    if !status.success() {
        logger.record_failure(&[LogMessage::text(format!(
            "'{}' exited with {}",
            args.command.join(" "),
            status
        ))])?;
        let code = status.code().unwrap_or(1);
        drop(logger);
        std::process::exit(code);
    }

    Ok(())
}

fn run_command(logger: &mut Logger, command: &[String]) -> Result<ExitStatus> {
    let Some((program, program_args)) = command.split_first() else {
        bail!("No command given");
    };

    let heading = LogMessage::heading(HeadingLevel::H2, format!("Running: {}", command.join(" ")));
    logger.out_scoped(&[heading], |logger| -> Result<ExitStatus> {
        let output = Command::new(program)
            .args(program_args)
            .stdin(Stdio::inherit())
            .stderr(Stdio::inherit())
            .output()
            .with_context(|| format!("Failed to start '{}'", program))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let lines: Vec<LogMessage> = stdout.lines().map(LogMessage::text).collect();
        logger.output(&lines)?;
        logger.debug(&[LogMessage::text(format!("exit status: {}", output.status))])?;

        Ok(output.status)
    })?
}
