//! # Log Destinations
//!
//! A [`LogDestination`] owns one output sink (standard output, standard
//! error, an append-mode file, or an in-memory [`SharedBuffer`]) together
//! with its own indentation and folding state.
//!
//! ## Line Prefix
//!
//! Every line a destination writes starts with the same prefix:
//!
//! 1. `YYYY-MM-DD HH:MM| ` when timestamps are enabled,
//! 2. one tab per indentation level when indenting is enabled,
//! 3. `" | "` when the text is bordered.
//!
//! Embedded newlines in a message are each followed by the prefix, so
//! multi-line text stays aligned with the current indentation.
//!
//! ## Folding
//!
//! [`LogDestination::open_fold`] and [`LogDestination::restore_state`]
//! bracket regions with `|{` and `}|` marker lines, which editors can use to
//! collapse verbose output. Markers are only written when folding is enabled
//! for the destination, but the folding depth is tracked either way.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::message::{BORDER, FOLDING_CLOSE, FOLDING_OPEN, TAB};

/// Severity level of a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Receives `output` messages.
    #[default]
    Output,
    /// Receives both `output` and `debug` messages.
    Debug,
}

impl FromStr for Level {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "output" => Ok(Level::Output),
            "debug" => Ok(Level::Debug),
            other => Err(Error::Config {
                message: format!("invalid level '{}'", other),
            }),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Output => write!(f, "output"),
            Level::Debug => write!(f, "debug"),
        }
    }
}

/// An in-memory sink that can be cloned and inspected after writing.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written so far, decoded lossily as UTF-8.
    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        String::from_utf8_lossy(&bytes).into_owned()
    }

    pub fn clear(&self) {
        self.0
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl PartialEq for SharedBuffer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for SharedBuffer {}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut bytes = self
            .0
            .lock()
            .map_err(|_| io::Error::other("shared buffer lock poisoned"))?;
        bytes.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.0
            .lock()
            .map(|_| ())
            .map_err(|_| io::Error::other("shared buffer lock poisoned"))
    }
}

/// Where a destination writes.
///
/// Parsed from a target token: `>`, `>1`, `>>`, `>>1`, `STDOUT` and `stdout`
/// select standard output; `>2`, `>>2`, `STDERR` and `stderr` select standard
/// error; anything else is a file path.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum Target {
    Stdout,
    Stderr,
    File(PathBuf),
    Buffer(SharedBuffer),
}

impl Target {
    /// The identifier used when the configuration does not name one.
    fn default_id(&self) -> Option<String> {
        match self {
            Target::Stdout => Some("STDOUT".to_string()),
            Target::Stderr => Some("STDERR".to_string()),
            Target::File(path) => path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .filter(|stem| !stem.is_empty()),
            Target::Buffer(_) => None,
        }
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self> {
        match token.trim() {
            "" => Err(Error::Config {
                message: "a target is required".to_string(),
            }),
            ">" | ">1" | ">>" | ">>1" | "STDOUT" | "stdout" => Ok(Target::Stdout),
            ">2" | ">>2" | "STDERR" | "stderr" => Ok(Target::Stderr),
            path => Ok(Target::File(PathBuf::from(path))),
        }
    }
}

impl TryFrom<String> for Target {
    type Error = Error;

    fn try_from(token: String) -> Result<Self> {
        token.parse()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Stdout => write!(f, "STDOUT"),
            Target::Stderr => write!(f, "STDERR"),
            Target::File(path) => write!(f, "{}", path.display()),
            Target::Buffer(_) => write!(f, "<buffer>"),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Options for opening a [`LogDestination`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DestinationConfig {
    /// Unique identifier. Derived from the target when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub target: Target,
    #[serde(default)]
    pub level: Level,
    /// Prefix lines with one tab per indentation level.
    #[serde(default = "default_true")]
    pub indenting: bool,
    /// Prefix lines with the local date and time.
    #[serde(default)]
    pub timestamp: bool,
    /// Write fold markers. Defaults to on for debug destinations only.
    #[serde(default)]
    pub folding: Option<bool>,
    /// Open the destination muted.
    #[serde(default)]
    pub disabled: bool,
}

impl DestinationConfig {
    pub fn new(target: Target) -> Self {
        Self {
            id: None,
            target,
            level: Level::Output,
            indenting: true,
            timestamp: false,
            folding: None,
            disabled: false,
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn indenting(mut self, indenting: bool) -> Self {
        self.indenting = indenting;
        self
    }

    pub fn timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn folding(mut self, folding: bool) -> Self {
        self.folding = Some(folding);
        self
    }

    /// The identifier the destination will be registered under.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no id was given and none can be derived
    /// from the target.
    pub fn resolved_id(&self) -> Result<String> {
        let id = match &self.id {
            Some(id) => Some(id.trim().to_string()),
            None => self.target.default_id(),
        };
        match id {
            Some(id) if !id.is_empty() => Ok(id),
            _ => Err(Error::Config {
                message: format!("an id is required for target '{}'", self.target),
            }),
        }
    }

    /// Whether fold markers will be written.
    pub fn resolved_folding(&self) -> bool {
        self.folding.unwrap_or(self.level == Level::Debug)
    }
}

/// Indentation and folding depth captured before a scoped region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DestinationState {
    pub indent_depth: usize,
    pub folding_depth: usize,
}

enum Sink {
    Stdout(io::Stdout),
    Stderr(io::Stderr),
    File(File),
    Buffer(SharedBuffer),
    Closed,
}

impl Sink {
    fn writer(&mut self) -> Option<&mut dyn Write> {
        match self {
            Sink::Stdout(out) => Some(out as &mut dyn Write),
            Sink::Stderr(err) => Some(err as &mut dyn Write),
            Sink::File(file) => Some(file as &mut dyn Write),
            Sink::Buffer(buffer) => Some(buffer as &mut dyn Write),
            Sink::Closed => None,
        }
    }
}

/// One active output sink with its own indentation and folding state.
pub struct LogDestination {
    id: String,
    level: Level,
    target: Target,
    sink: Sink,
    indenting: bool,
    indent_depth: usize,
    folding: bool,
    folding_depth: usize,
    timestamp: bool,
    disabled: bool,
}

impl fmt::Debug for LogDestination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogDestination")
            .field("id", &self.id)
            .field("level", &self.level)
            .field("target", &self.target)
            .field("indent_depth", &self.indent_depth)
            .field("folding_depth", &self.folding_depth)
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl LogDestination {
    /// Open the sink described by `config`.
    ///
    /// Files are opened for appending and created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when no identifier can be determined or the
    /// file cannot be opened for writing.
    pub fn open(config: DestinationConfig) -> Result<Self> {
        let id = config.resolved_id()?;
        let folding = config.resolved_folding();

        let sink = match &config.target {
            Target::Stdout => Sink::Stdout(io::stdout()),
            Target::Stderr => Sink::Stderr(io::stderr()),
            Target::Buffer(buffer) => Sink::Buffer(buffer.clone()),
            Target::File(path) => {
                let file = OpenOptions::new()
                    .append(true)
                    .create(true)
                    .open(path)
                    .map_err(|e| Error::Config {
                        message: format!("cannot open '{}' for writing: {}", path.display(), e),
                    })?;
                Sink::File(file)
            }
        };

        log::debug!("opened log destination '{}' -> {}", id, config.target);

        Ok(Self {
            id,
            level: config.level,
            target: config.target,
            sink,
            indenting: config.indenting,
            indent_depth: 0,
            folding,
            folding_depth: 0,
            timestamp: config.timestamp,
            disabled: config.disabled,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn indent_depth(&self) -> usize {
        self.indent_depth
    }

    pub fn folding_depth(&self) -> usize {
        self.folding_depth
    }

    pub fn is_folding(&self) -> bool {
        self.folding
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Mute or unmute the destination. Depth tracking continues while muted.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.sink, Sink::Closed)
    }

    fn line_prefix(&self, bordered: bool) -> String {
        let mut prefix = String::new();
        if self.timestamp {
            prefix.push_str(&chrono::Local::now().format("%Y-%m-%d %H:%M| ").to_string());
        }
        if self.indenting {
            prefix.push_str(&TAB.repeat(self.indent_depth));
        }
        if bordered {
            prefix.push_str(BORDER);
        }
        prefix
    }

    fn emit(&mut self, parts: &[&str]) -> io::Result<()> {
        if self.disabled {
            return Ok(());
        }
        let Some(writer) = self.sink.writer() else {
            return Ok(());
        };
        for part in parts {
            writer.write_all(part.as_bytes())?;
        }
        writer.flush()
    }

    fn continue_lines(&self, text: &str, bordered: bool) -> (String, String) {
        let bol = self.line_prefix(bordered);
        let body = text.replace('\n', &format!("\n{}", bol));
        (bol, body)
    }

    /// Write `text` starting a new line, without a trailing newline.
    pub fn write(&mut self, text: &str, bordered: bool) -> io::Result<()> {
        let (bol, body) = self.continue_lines(text.trim_start_matches('\n'), bordered);
        self.emit(&[&bol, &body])
    }

    /// Write `text` as a complete line.
    pub fn write_line(&mut self, text: &str, bordered: bool) -> io::Result<()> {
        let (bol, body) = self.continue_lines(text.trim_start_matches('\n'), bordered);
        self.emit(&[&bol, &body, "\n"])
    }

    /// Continue a partial line started by [`LogDestination::write`].
    pub fn write_here(&mut self, text: &str, bordered: bool) -> io::Result<()> {
        let (_, body) = self.continue_lines(text, bordered);
        self.emit(&[&body])
    }

    /// Finish a partial line started by [`LogDestination::write`].
    pub fn write_line_here(&mut self, text: &str, bordered: bool) -> io::Result<()> {
        let (_, body) = self.continue_lines(text.trim_end_matches('\n'), bordered);
        self.emit(&[&body, "\n"])
    }

    /// Shift the indentation depth by `delta` and return the previous depth.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndentUnderflow`] if the depth would drop below zero;
    /// the depth is left unchanged.
    pub fn adjust_indent(&mut self, delta: isize) -> Result<usize> {
        let old = self.indent_depth;
        self.indent_depth = old
            .checked_add_signed(delta)
            .ok_or_else(|| Error::IndentUnderflow {
                id: self.id.clone(),
                depth: old,
                delta,
            })?;
        Ok(old)
    }

    /// Open a folding region and return the previous folding depth.
    pub fn open_fold(&mut self) -> io::Result<usize> {
        let old = self.folding_depth;
        self.folding_depth += 1;
        if self.folding {
            self.emit(&[FOLDING_OPEN, "\n"])?;
        }
        Ok(old)
    }

    pub fn state(&self) -> DestinationState {
        DestinationState {
            indent_depth: self.indent_depth,
            folding_depth: self.folding_depth,
        }
    }

    /// Roll back to a snapshot taken with [`LogDestination::state`].
    ///
    /// One `}|` line is written for each folding level closed, innermost
    /// first. The depth reaches the snapshot even when a marker cannot be
    /// written; the first write error is returned afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateRestore`] without changing anything when the
    /// snapshot's folding depth is deeper than the current one.
    pub fn restore_state(&mut self, state: DestinationState) -> Result<()> {
        if state.folding_depth > self.folding_depth {
            return Err(Error::StateRestore {
                id: self.id.clone(),
                current: self.folding_depth,
                target: state.folding_depth,
            });
        }

        self.indent_depth = state.indent_depth;

        let mut first_error = None;
        while self.folding_depth > state.folding_depth {
            self.folding_depth -= 1;
            if self.folding {
                if let Err(e) = self.emit(&[FOLDING_CLOSE, "\n"]) {
                    first_error.get_or_insert(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    /// Flush and detach the sink. Files are closed; console streams are left
    /// open. Calling this again does nothing.
    pub fn close(&mut self) -> io::Result<()> {
        if let Some(writer) = self.sink.writer() {
            writer.flush()?;
            log::debug!("closed log destination '{}'", self.id);
        }
        self.sink = Sink::Closed;
        Ok(())
    }
}

impl Drop for LogDestination {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to flush log destination '{}': {}", self.id, e);
        }
    }
}
