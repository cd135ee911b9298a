//! # Logging Configuration
//!
//! Destinations can be declared in a YAML file instead of being opened one
//! by one in code:
//!
//! ```yaml
//! lock_timeout_secs: 120
//! destinations:
//!   - target: STDOUT
//!   - id: nightly
//!     target: /var/log/nightly.log
//!     level: debug
//!     timestamp: true
//! ```
//!
//! Each entry maps onto a [`DestinationConfig`]. Console tokens that start
//! with `>` must be quoted (`target: ">2"`), since a bare `>` begins a YAML
//! block scalar. Unknown keys are rejected so that typos surface early.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::defaults::DEFAULT_LOCK_TIMEOUT;
use crate::destination::DestinationConfig;
use crate::error::{Error, Result};

/// Parsed logging configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Destinations to open, in registration order.
    #[serde(default)]
    pub destinations: Vec<DestinationConfig>,
    /// How long to wait for an application lock.
    #[serde(default)]
    pub lock_timeout_secs: Option<u64>,
}

impl LogConfig {
    /// The configured lock timeout, or [`DEFAULT_LOCK_TIMEOUT`].
    pub fn lock_timeout(&self) -> Duration {
        self.lock_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_LOCK_TIMEOUT)
    }
}

/// Parse a logging configuration from YAML text.
///
/// An empty document yields an empty configuration. Destination ids are
/// checked up front, so a missing or duplicate id fails here rather than
/// half way through opening the destinations.
pub fn parse(yaml: &str) -> Result<LogConfig> {
    if yaml.trim().is_empty() {
        return Ok(LogConfig::default());
    }
    let config: LogConfig = serde_yaml::from_str(yaml)?;

    let mut seen = Vec::with_capacity(config.destinations.len());
    for destination in &config.destinations {
        let id = destination.resolved_id()?;
        if seen.contains(&id) {
            return Err(Error::DuplicateId { id });
        }
        seen.push(id);
    }

    Ok(config)
}

/// Read and parse a logging configuration file.
pub fn from_file(path: &Path) -> Result<LogConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}
