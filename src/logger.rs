//! # Logger Registry
//!
//! A [`Logger`] holds every open [`LogDestination`] and fans messages out to
//! them. Destinations are split by level:
//!
//! - `output` messages go to every destination, output-level ones first and
//!   then debug-level ones, each group in registration order;
//! - `debug` messages go only to debug-level destinations.
//!
//! There is no global instance. An application builds one logger at start
//! (usually with [`Logger::with_console`]) and passes `&mut Logger` to the
//! code that logs. The registry is not synchronized; callers that log from
//! several threads must serialize access themselves.

use std::collections::HashMap;
use std::io;

use crate::config::LogConfig;
use crate::destination::{DestinationConfig, Level, LogDestination, Target};
use crate::error::{format_error_chain, Error, Result};
use crate::message::{HeadingLevel, LogMessage, DOUBLE_LINE, FOLDING_CLOSE, FOLDING_OPEN, SINGLE_LINE};

/// Heading written in front of every recorded failure.
pub const FAILURES_HEADING: &str = "==FAILURES REPORTED==";

/// Which destinations a log call writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fanout {
    /// Output-level destinations, then debug-level destinations.
    All,
    /// Debug-level destinations only.
    Debug,
    /// The named destinations, in the given order.
    Ids(Vec<String>),
}

/// Registry of open log destinations.
#[derive(Debug, Default)]
pub struct Logger {
    index: HashMap<String, LogDestination>,
    output_ids: Vec<String>,
    debug_ids: Vec<String>,
    failures: Vec<String>,
}

impl Logger {
    /// Create a logger with no destinations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a logger writing output-level messages to standard output
    /// under the id `stdout`.
    pub fn with_console() -> Result<Self> {
        let mut logger = Self::new();
        logger.open_destination(DestinationConfig::new(Target::Stdout).id("stdout"))?;
        Ok(logger)
    }

    /// Create a logger and open every destination listed in `config`, in order.
    pub fn from_config(config: &LogConfig) -> Result<Self> {
        let mut logger = Self::new();
        for destination in &config.destinations {
            logger.open_destination(destination.clone())?;
        }
        Ok(logger)
    }

    /// Open a destination and register it.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] if the destination cannot be opened.
    /// - [`Error::DuplicateId`] if its id is already registered. The
    ///   registered destination is left untouched.
    pub fn open_destination(&mut self, config: DestinationConfig) -> Result<&mut LogDestination> {
        let destination = LogDestination::open(config)?;
        self.register(destination)
    }

    /// Register an already opened destination.
    ///
    /// A rejected destination is closed before the error is returned; a
    /// failure to close it is only logged.
    pub fn register(&mut self, mut destination: LogDestination) -> Result<&mut LogDestination> {
        let id = destination.id().to_string();
        if self.index.contains_key(&id) {
            if let Err(e) = destination.close() {
                log::warn!("failed to close rejected log destination '{}': {}", id, e);
            }
            return Err(Error::DuplicateId { id });
        }

        match destination.level() {
            Level::Debug => self.debug_ids.push(id.clone()),
            Level::Output => self.output_ids.push(id.clone()),
        }
        Ok(self.index.entry(id).or_insert(destination))
    }

    /// Unregister and close a destination. Unknown ids are ignored.
    pub fn close_destination(&mut self, id: &str) -> Result<()> {
        if let Some(mut destination) = self.index.remove(id) {
            self.output_ids.retain(|other| other != id);
            self.debug_ids.retain(|other| other != id);
            destination.close()?;
        }
        Ok(())
    }

    /// Close every destination, in fan-out order.
    ///
    /// All destinations are unregistered even if one fails to flush; the
    /// first failure is returned.
    pub fn close_all(&mut self) -> Result<()> {
        let mut first_error = None;
        for id in self.ids() {
            if let Err(e) = self.close_destination(&id) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn destination(&self, id: &str) -> Option<&LogDestination> {
        self.index.get(id)
    }

    pub fn destination_mut(&mut self, id: &str) -> Option<&mut LogDestination> {
        self.index.get_mut(id)
    }

    /// Ids of all registered destinations, in [`Fanout::All`] order.
    pub fn ids(&self) -> Vec<String> {
        self.output_ids.iter().chain(&self.debug_ids).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Every failure recorded so far, oldest first.
    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Resolve a fan-out to destination ids, without duplicates.
    pub(crate) fn targets(&self, fanout: &Fanout) -> Result<Vec<String>> {
        match fanout {
            Fanout::All => Ok(self.ids()),
            Fanout::Debug => Ok(self.debug_ids.clone()),
            Fanout::Ids(ids) => {
                let mut targets: Vec<String> = Vec::with_capacity(ids.len());
                for id in ids {
                    if !self.index.contains_key(id) {
                        return Err(Error::UnknownDestination { id: id.clone() });
                    }
                    if !targets.contains(id) {
                        targets.push(id.clone());
                    }
                }
                Ok(targets)
            }
        }
    }

    /// Write messages to every destination.
    pub fn output(&mut self, messages: &[LogMessage]) -> Result<()> {
        self.emit(&Fanout::All, messages)
    }

    /// Write messages to debug-level destinations only.
    pub fn debug(&mut self, messages: &[LogMessage]) -> Result<()> {
        self.emit(&Fanout::Debug, messages)
    }

    /// Write messages to the destinations selected by `fanout`.
    ///
    /// Each message is written to every target before the next message is
    /// started.
    pub fn emit(&mut self, fanout: &Fanout, messages: &[LogMessage]) -> Result<()> {
        let ids = self.targets(fanout)?;
        for message in messages {
            self.dispatch(&ids, message)?;
        }
        Ok(())
    }

    fn dispatch(&mut self, ids: &[String], message: &LogMessage) -> Result<()> {
        match message {
            LogMessage::Text(text) => self.each(ids, |d| d.write_line(text, false)),
            LogMessage::Heading(level, text) => {
                self.each(ids, |d| d.write_line("", false))?;
                self.each(ids, |d| d.write(level.prefix(), false))?;
                self.each(ids, |d| d.write_line_here(text, false))
            }
            LogMessage::Separator => self.each(ids, |d| d.write_line(SINGLE_LINE, false)),
            LogMessage::DoubleSeparator => self.each(ids, |d| d.write_line(DOUBLE_LINE, false)),
            LogMessage::Boolean(true) => self.each(ids, |d| d.write_line("\tTRUE", false)),
            LogMessage::Boolean(false) => self.each(ids, |d| d.write_line("\tFALSE", false)),
            LogMessage::Nil => self.each(ids, |d| d.write_line("\tNIL", false)),
            LogMessage::Dump { type_name, body } => {
                let header = format!("[= {} =]", type_name);
                self.each(ids, |d| d.write_line(&header, true))?;
                self.each(ids, |d| d.write_line_here(FOLDING_OPEN, false))?;
                self.each(ids, |d| d.write_line(body, true))?;
                self.each(ids, |d| d.write_line_here(FOLDING_CLOSE, false))
            }
        }
    }

    fn each<F>(&mut self, ids: &[String], mut write: F) -> Result<()>
    where
        F: FnMut(&mut LogDestination) -> io::Result<()>,
    {
        for id in ids {
            if let Some(destination) = self.index.get_mut(id) {
                write(destination)?;
            }
        }
        Ok(())
    }

    /// Record a failure and report it to every destination.
    ///
    /// The plain text of the messages, joined by newlines, is kept in
    /// [`Logger::failures`].
    pub fn record_failure(&mut self, messages: &[LogMessage]) -> Result<()> {
        let text = messages
            .iter()
            .map(LogMessage::plain_text)
            .collect::<Vec<_>>()
            .join("\n");
        self.failures.push(text);

        let mut report = Vec::with_capacity(messages.len() + 1);
        report.push(LogMessage::heading(HeadingLevel::H1, FAILURES_HEADING));
        report.extend_from_slice(messages);
        self.output(&report)
    }

    /// Record an error, with its chain of causes, as a failure.
    pub fn record_error(&mut self, error: &(dyn std::error::Error + 'static)) -> Result<()> {
        self.record_failure(&[LogMessage::Text(format_error_chain(error))])
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Err(e) = self.close_all() {
            log::warn!("failed to close log destinations: {}", e);
        }
    }
}
