//! Default values shared by the library and the `brewed-log` binary.

use std::path::PathBuf;
use std::time::Duration;

/// How long [`FileLock::acquire`](crate::lock::FileLock::acquire) waits by default.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(600);

/// Interval between attempts to take a contended lock.
pub const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Returns the default directory for application lock files.
///
/// Uses the platform's local data directory:
/// - Linux: `~/.local/share/brewed-locks`
/// - macOS: `~/Library/Application Support/brewed-locks`
///
/// Falls back to `.brewed-locks` in the current directory if the platform
/// directory cannot be determined.
pub fn default_locks_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|dir| dir.join("brewed-locks"))
        .unwrap_or_else(|| PathBuf::from(".brewed-locks"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_locks_dir_name() {
        assert!(default_locks_dir().ends_with("brewed-locks"));
    }

    #[test]
    fn test_default_timeout_is_ten_minutes() {
        assert_eq!(DEFAULT_LOCK_TIMEOUT.as_secs(), 600);
    }
}
