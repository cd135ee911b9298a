//! # Brewed Log
//!
//! This library provides a structured, indenting logger for command-line
//! scripts and an exclusive file lock to keep two copies of a script from
//! running at once.
//!
//! ## Quick Example
//!
//! ```
//! use brewed_log::destination::{DestinationConfig, Level, SharedBuffer, Target};
//! use brewed_log::logger::Logger;
//! use brewed_log::message::{HeadingLevel, LogMessage};
//!
//! let out = SharedBuffer::new();
//! let debug = SharedBuffer::new();
//!
//! let mut logger = Logger::new();
//! logger
//!     .open_destination(DestinationConfig::new(Target::Buffer(out.clone())).id("out"))
//!     .unwrap();
//! logger
//!     .open_destination(
//!         DestinationConfig::new(Target::Buffer(debug.clone()))
//!             .id("debug")
//!             .level(Level::Debug),
//!     )
//!     .unwrap();
//!
//! logger
//!     .output(&[LogMessage::heading(HeadingLevel::H2, "Sync"), "3 files".into()])
//!     .unwrap();
//! logger.debug(&["details".into()]).unwrap();
//!
//! assert_eq!(out.contents(), "\n{++} Sync\n3 files\n");
//! assert_eq!(debug.contents(), "\n{++} Sync\n3 files\ndetails\n");
//! ```
//!
//! ## Core Concepts
//!
//! - **Destinations (`destination`)**: One sink each (console, append-mode
//!   file, or in-memory buffer) with its own indentation and folding depth.
//! - **Messages (`message`)**: The kinds of things that can be logged: text,
//!   headings, rules, booleans, and YAML dumps of serializable values.
//! - **Logger (`logger`)**: The registry that fans messages out to
//!   destinations by level and keeps a list of recorded failures.
//! - **Scopes (`scope`)**: Indentation and folding for the duration of a
//!   closure, restored by a guard on every exit path.
//! - **Locking (`lock`)**: An advisory `flock` on a lock file with a bounded
//!   wait.
//! - **Configuration (`config`)**: Destinations declared in YAML.

pub mod config;
pub mod defaults;
pub mod destination;
pub mod error;
pub mod lock;
pub mod logger;
pub mod message;
pub mod pretty;
pub mod scope;

#[cfg(test)]
mod scope_proptest;
