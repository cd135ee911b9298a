//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands;

/// Brewed Log - Run commands under a lock with structured, indented logging
#[derive(Parser, Debug)]
#[command(name = "brewed-log")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Diagnostic log level for the tool itself (error, warn, info, debug, trace)
    #[arg(long, global = true, value_name = "LEVEL", default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a command while holding an exclusive lock
    Run(commands::run::RunArgs),

    /// Parse a logging configuration and list its destinations
    CheckConfig(commands::check_config::CheckConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        env_logger::Builder::new()
            .parse_filters(&self.log_level)
            .format_timestamp(None)
            .init();

        match self.command {
            Commands::Run(args) => commands::run::execute(args),
            Commands::CheckConfig(args) => commands::check_config::execute(args),
        }
    }
}
