//! # CLI Command Implementations
//!
//! Each subcommand of `brewed-log` lives in its own file, with:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic through the `brewed_log` library.

pub mod check_config;
pub mod run;
