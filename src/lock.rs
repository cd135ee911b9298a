//! # File Locking
//!
//! [`FileLock`] uses one file as a mutex shared between processes. It holds
//! an exclusive advisory `flock(2)` on an open descriptor for that file;
//! only processes that also lock the file are kept out.
//!
//! Acquisition never blocks indefinitely. The lock is retried every
//! [`LOCK_POLL_INTERVAL`] until the timeout passes, after which the
//! descriptor is closed and [`Error::LockTimeout`] is returned. Nothing is
//! written to the lock file; its existence is the only trace left behind.
//!
//! Locks are tied to the open file description, so two `FileLock`s on the
//! same path exclude each other even inside one process.

use std::ffi::OsStr;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Component, Path, PathBuf};
use std::time::{Duration, Instant};

use nix::errno::Errno;
use nix::fcntl::{Flock, FlockArg};

use crate::defaults::LOCK_POLL_INTERVAL;
use crate::error::{format_error_chain, Error, Result};
use crate::logger::Logger;
use crate::message::LogMessage;

/// An exclusive lock on a file, released on [`FileLock::release`] or drop.
pub struct FileLock {
    path: PathBuf,
    lock: Option<Flock<File>>,
}

impl std::fmt::Debug for FileLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileLock")
            .field("path", &self.path)
            .field("locked", &self.is_locked())
            .finish()
    }
}

impl FileLock {
    /// Open `path` (creating it with mode `0644`) and take an exclusive lock,
    /// waiting at most `timeout`.
    ///
    /// # Errors
    ///
    /// - [`Error::LockTimeout`] if another holder keeps the lock for longer
    ///   than `timeout`.
    /// - [`Error::Lock`] if the file cannot be opened or locked.
    pub fn acquire(path: impl AsRef<Path>, timeout: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .mode(0o644)
            .open(&path)
            .map_err(|e| Error::Lock {
                path: path.clone(),
                message: e.to_string(),
            })?;

        // A timeout too large to represent as an instant never expires.
        let deadline = Instant::now().checked_add(timeout);
        loop {
            match Flock::lock(file, FlockArg::LockExclusiveNonblock) {
                Ok(lock) => {
                    log::debug!("acquired lock on '{}'", path.display());
                    return Ok(Self {
                        path,
                        lock: Some(lock),
                    });
                }
                Err((returned, errno)) if errno == Errno::EWOULDBLOCK => {
                    let now = Instant::now();
                    let pause = match deadline {
                        Some(deadline) if now >= deadline => {
                            drop(returned);
                            return Err(Error::LockTimeout { path, timeout });
                        }
                        Some(deadline) => LOCK_POLL_INTERVAL.min(deadline - now),
                        None => LOCK_POLL_INTERVAL,
                    };
                    file = returned;
                    std::thread::sleep(pause);
                }
                Err((returned, Errno::EINTR)) => file = returned,
                Err((_, errno)) => {
                    return Err(Error::Lock {
                        path,
                        message: errno.desc().to_string(),
                    });
                }
            }
        }
    }

    /// Run `body` while holding the lock on `path`.
    ///
    /// The lock is released when `body` returns or unwinds.
    pub fn with_lock<R, F>(path: impl AsRef<Path>, timeout: Duration, body: F) -> Result<R>
    where
        F: FnOnce() -> R,
    {
        let lock = Self::acquire(path, timeout)?;
        let result = body();
        drop(lock);
        Ok(result)
    }

    /// Release the lock and close the file. Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(lock) = self.lock.take() {
            drop(lock);
            log::debug!("released lock on '{}'", self.path.display());
        }
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        self.release();
    }
}

/// Run `body` under the lock on `path`, reporting a failure to acquire it
/// through `logger` before returning the error.
pub fn run_locked<R, F>(logger: &mut Logger, path: &Path, timeout: Duration, body: F) -> Result<R>
where
    F: FnOnce(&mut Logger) -> R,
{
    match FileLock::acquire(path, timeout) {
        Ok(lock) => {
            let result = body(logger);
            drop(lock);
            Ok(result)
        }
        Err(e) => {
            let report = format!(
                "EXCEPTION while locking path '{}': {}",
                path.display(),
                format_error_chain(&e)
            );
            if let Err(log_error) = logger.output(&[LogMessage::Text(report)]) {
                log::warn!("could not report lock failure: {}", log_error);
            }
            Err(e)
        }
    }
}

/// Path of the lock file `file_name` inside `locks_dir`.
///
/// All lock files share one parent directory, so `file_name` must be a
/// plain file name. `locks_dir` is created if it is missing but its own
/// parent exists.
///
/// # Errors
///
/// Returns [`Error::Config`] for a file name with path components, or when
/// `locks_dir` cannot be used as a directory.
pub fn lock_path(locks_dir: &Path, file_name: &str) -> Result<PathBuf> {
    let mut components = Path::new(file_name).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain {
        return Err(Error::Config {
            message: format!(
                "lock file '{}' must be a plain file name inside '{}'",
                file_name,
                locks_dir.display()
            ),
        });
    }

    if !locks_dir.is_dir() {
        let parent_exists = locks_dir.parent().is_some_and(Path::is_dir);
        if !parent_exists {
            return Err(Error::Config {
                message: format!("invalid locks directory '{}'", locks_dir.display()),
            });
        }
        std::fs::create_dir(locks_dir).map_err(|e| Error::Config {
            message: format!("failed to create '{}': {}", locks_dir.display(), e),
        })?;
    }

    Ok(locks_dir.join(file_name))
}

/// Lock file path named after the running executable: `<file name>.lock`.
pub fn process_lock_path(locks_dir: &Path) -> Result<PathBuf> {
    program_lock_path(locks_dir, &std::env::current_exe()?)
}

/// Lock file path for `program`, keeping its full file name, so `tool.sh`
/// locks `tool.sh.lock`.
pub fn program_lock_path(locks_dir: &Path, program: &Path) -> Result<PathBuf> {
    let name = program
        .file_name()
        .and_then(OsStr::to_str)
        .ok_or_else(|| Error::Config {
            message: format!("cannot derive a lock name from '{}'", program.display()),
        })?;
    lock_path(locks_dir, &format!("{}.lock", name))
}
