//! # Check-Config Command Implementation
//!
//! Parses a logging configuration file and lists the destinations it would
//! open, without opening any of them. This is a read-only operation.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use brewed_log::config;

/// Parse a logging configuration and list its destinations
#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// Path to the logging configuration file.
    #[arg(value_name = "FILE")]
    pub config: PathBuf,
}

/// Execute the `check-config` command.
pub fn execute(args: CheckConfigArgs) -> Result<()> {
    let log_config = config::from_file(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    println!("Configuration: {}", args.config.display());
    println!("Lock timeout: {}s", log_config.lock_timeout().as_secs());
    println!("Destinations: {}", log_config.destinations.len());
    for destination in &log_config.destinations {
        println!(
            "  {} [{}] -> {}{}{}",
            destination.resolved_id()?,
            destination.level,
            destination.target,
            if destination.resolved_folding() { " folding" } else { "" },
            if destination.timestamp { " timestamp" } else { "" },
        );
    }

    Ok(())
}
