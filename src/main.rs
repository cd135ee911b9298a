//! # Brewed Log CLI
//!
//! `brewed-log` runs another program under an exclusive lock and logs what it
//! prints through the `brewed_log` logger.
//!
//! - `run` builds a logger from `--config` (or standard output), takes the
//!   lock named by `--lock` or `--lock-name`, and logs the child's output one
//!   level indented under a heading. A non-zero child exit is recorded as a
//!   failure and becomes this process's exit code.
//! - `check-config` reports the destinations a configuration would open.
//!
//! The tool's own diagnostics go through `env_logger` on standard error,
//! filtered by `--log-level`, so they never mix with the structured log.
//! Errors such as a lock timeout exit with status 1.

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    cli::Cli::parse().execute()
}
