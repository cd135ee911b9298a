//! # Scoped Indentation
//!
//! [`Logger::scoped_indent`] writes a message, then runs a closure with the
//! target destinations indented one or more levels deeper and a folding
//! region opened on each. The [`IndentScope`] guard restores every target
//! when it is dropped, so the indentation never leaks past the closure,
//! whether it returns normally, returns an error, or panics.
//!
//! ```
//! use brewed_log::destination::{DestinationConfig, SharedBuffer, Target};
//! use brewed_log::logger::Logger;
//!
//! let buffer = SharedBuffer::new();
//! let mut logger = Logger::new();
//! logger
//!     .open_destination(DestinationConfig::new(Target::Buffer(buffer.clone())).id("mem"))
//!     .unwrap();
//!
//! logger
//!     .out_scoped(&["scope:".into()], |logger| logger.output(&["inner".into()]))
//!     .unwrap()
//!     .unwrap();
//!
//! assert_eq!(buffer.contents(), "scope:\n\tinner\n");
//! ```

use std::ops::{Deref, DerefMut};

use crate::destination::DestinationState;
use crate::error::Result;
use crate::logger::{Fanout, Logger};
use crate::message::LogMessage;

/// Guard holding the pre-scope state of every indented destination.
///
/// Dereferences to the [`Logger`] so the scope body can keep logging.
/// Dropping the guard restores each destination, in the order they were
/// indented. Destinations closed inside the scope are skipped.
pub struct IndentScope<'a> {
    logger: &'a mut Logger,
    snapshots: Vec<(String, DestinationState)>,
}

impl Deref for IndentScope<'_> {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        self.logger
    }
}

impl DerefMut for IndentScope<'_> {
    fn deref_mut(&mut self) -> &mut Logger {
        self.logger
    }
}

impl Drop for IndentScope<'_> {
    fn drop(&mut self) {
        for (id, state) in self.snapshots.drain(..) {
            if let Some(destination) = self.logger.destination_mut(&id) {
                if let Err(e) = destination.restore_state(state) {
                    log::warn!("failed to restore log destination '{}': {}", id, e);
                }
            }
        }
    }
}

impl Logger {
    /// Indent and open a fold on every destination selected by `fanout`.
    ///
    /// A `delta` of zero is treated as one; a negative `delta` outdents. If a
    /// destination cannot be adjusted, the ones already changed are restored
    /// before the error is returned.
    pub fn indent_scope(&mut self, fanout: &Fanout, delta: isize) -> Result<IndentScope<'_>> {
        let delta = if delta == 0 { 1 } else { delta };
        let ids = self.targets(fanout)?;

        let mut scope = IndentScope {
            logger: self,
            snapshots: Vec::with_capacity(ids.len()),
        };
        for id in ids {
            if let Some(destination) = scope.logger.destination_mut(&id) {
                let state = destination.state();
                scope.snapshots.push((id, state));
                destination.adjust_indent(delta)?;
                destination.open_fold()?;
            }
        }
        Ok(scope)
    }

    /// Write `messages` at the current depth, then run `body` with the
    /// selected destinations indented by `delta` levels.
    ///
    /// Returns whatever `body` returns. The destinations are restored after
    /// `body` finishes, including when it unwinds.
    pub fn scoped_indent<R, F>(
        &mut self,
        fanout: &Fanout,
        delta: isize,
        messages: &[LogMessage],
        body: F,
    ) -> Result<R>
    where
        F: FnOnce(&mut Logger) -> R,
    {
        self.emit(fanout, messages)?;
        let mut scope = self.indent_scope(fanout, delta)?;
        let result = body(&mut *scope);
        drop(scope);
        Ok(result)
    }

    /// [`Logger::scoped_indent`] over every destination, one level deep.
    pub fn out_scoped<R, F>(&mut self, messages: &[LogMessage], body: F) -> Result<R>
    where
        F: FnOnce(&mut Logger) -> R,
    {
        self.scoped_indent(&Fanout::All, 1, messages, body)
    }

    /// [`Logger::scoped_indent`] over debug destinations, one level deep.
    pub fn debug_scoped<R, F>(&mut self, messages: &[LogMessage], body: F) -> Result<R>
    where
        F: FnOnce(&mut Logger) -> R,
    {
        self.scoped_indent(&Fanout::Debug, 1, messages, body)
    }
}
