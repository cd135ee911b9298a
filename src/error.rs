//! # Error Handling
//!
//! This module defines the centralized error type for `brewed-log`. It uses
//! `thiserror` to describe every failure the logger and the file lock can
//! surface to their callers.
//!
//! ## Key Components
//!
//! - **`Error`**: The enum of all failure modes: invalid destination
//!   configuration, duplicate destination ids, unbalanced indentation or
//!   folding state, lock timeouts, and wrapped I/O and YAML errors.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`.
//!
//! - **`format_error_chain`**: Renders any error together with its
//!   `source()` chain, the way failures are written into the log.
//!
//! Nothing here retries. [`Error::is_retryable`] only classifies an error so
//! that a caller (typically a CLI entry point) can decide between giving up
//! and trying again later.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for brewed-log operations
#[derive(Error, Debug)]
pub enum Error {
    /// A log destination could not be configured.
    ///
    /// Raised when no identifier can be derived, the target is missing, or
    /// the sink cannot be opened for writing.
    #[error("Destination configuration error: {message}")]
    Config { message: String },

    /// A destination with this identifier is already registered.
    #[error("Destination id '{id}' already open")]
    DuplicateId { id: String },

    /// An explicit fan-out named a destination that is not registered.
    #[error("Unknown destination id '{id}'")]
    UnknownDestination { id: String },

    /// An indentation adjustment would make the depth negative.
    #[error("Indent underflow on '{id}': depth {depth} adjusted by {delta}")]
    IndentUnderflow { id: String, depth: usize, delta: isize },

    /// A snapshot asked to restore a folding depth deeper than the current one.
    #[error("Cannot restore '{id}' to folding depth {target} from depth {current}")]
    StateRestore {
        id: String,
        current: usize,
        target: usize,
    },

    /// The exclusive lock was not obtained before the timeout elapsed.
    #[error("Timed out after {}s waiting for lock on '{}'", timeout.as_secs_f64(), path.display())]
    LockTimeout { path: PathBuf, timeout: Duration },

    /// The operating system refused the lock for a reason other than contention.
    #[error("Lock error on '{}': {message}", path.display())]
    Lock { path: PathBuf, message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML error, wrapped from `serde_yaml::Error`.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Whether waiting and trying the same operation again may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::LockTimeout { .. })
    }

    /// Whether the invoking command should give up for good.
    pub fn is_fatal(&self) -> bool {
        !self.is_retryable()
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Format an error and every error in its `source()` chain.
///
/// The first line is `EXCEPTION: <message>`; each cause follows on its own
/// tab-indented line.
pub fn format_error_chain(error: &(dyn std::error::Error + 'static)) -> String {
    let mut text = format!("EXCEPTION: {}", error);
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(&format!("\n\tcaused by: {}", cause));
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_config() {
        let error = Error::Config {
            message: ":id is required".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Destination configuration error"));
        assert!(display.contains(":id is required"));
    }

    #[test]
    fn test_error_display_duplicate_id() {
        let error = Error::DuplicateId {
            id: "stdout".to_string(),
        };
        assert_eq!(format!("{}", error), "Destination id 'stdout' already open");
    }

    #[test]
    fn test_error_display_lock_timeout() {
        let error = Error::LockTimeout {
            path: PathBuf::from("/tmp/app.lock"),
            timeout: Duration::from_secs(1),
        };
        let display = format!("{}", error);
        assert!(display.contains("Timed out after 1s"));
        assert!(display.contains("/tmp/app.lock"));
    }

    #[test]
    fn test_error_display_state_restore() {
        let error = Error::StateRestore {
            id: "debug".to_string(),
            current: 1,
            target: 3,
        };
        let display = format!("{}", error);
        assert!(display.contains("folding depth 3"));
        assert!(display.contains("from depth 1"));
    }

    #[test]
    fn test_error_from_io_error() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let error: Error = io_error.into();
        let display = format!("{}", error);
        assert!(display.contains("I/O error"));
        assert!(display.contains("File not found"));
    }

    #[test]
    fn test_error_from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: [unclosed").unwrap_err();
        let error: Error = yaml_error.into();
        assert!(format!("{}", error).contains("YAML error"));
    }

    #[test]
    fn test_only_lock_timeout_is_retryable() {
        let timeout = Error::LockTimeout {
            path: PathBuf::from("a.lock"),
            timeout: Duration::from_secs(5),
        };
        assert!(timeout.is_retryable());
        assert!(!timeout.is_fatal());

        let duplicate = Error::DuplicateId { id: "x".to_string() };
        assert!(!duplicate.is_retryable());
        assert!(duplicate.is_fatal());
    }

    #[test]
    fn test_format_error_chain_includes_sources() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = Error::Io(io_error);
        let text = format_error_chain(&error);
        assert!(text.starts_with("EXCEPTION: I/O error: denied"));
    }

    #[test]
    fn test_format_error_chain_single_error() {
        let error = Error::UnknownDestination {
            id: "nope".to_string(),
        };
        assert_eq!(
            format_error_chain(&error),
            "EXCEPTION: Unknown destination id 'nope'"
        );
    }
}
