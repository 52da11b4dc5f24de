//! Relay Configuration
//!
//! Startup configuration: the entry list parsed from the command-line JSON
//! argument plus notification options.

use std::collections::HashSet;

use super::entry::Entry;
use crate::utils::error::{RelayError, RelayResult};

/// Runtime configuration for a relay process
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Entries to watch, in the order supplied
    pub entries: Vec<Entry>,
    /// Whether to send desktop notifications
    pub notify: bool,
    /// Title used for desktop notifications
    pub notify_title: String,
}

impl RelayConfig {
    /// Parse and validate a JSON array of entries.
    pub fn from_json(raw: &str) -> RelayResult<Self> {
        let entries: Vec<Entry> = serde_json::from_str(raw)?;
        Self::validate(&entries)?;

        Ok(Self {
            entries,
            notify: true,
            notify_title: default_notify_title(),
        })
    }

    /// Disable or enable desktop notifications
    pub fn with_notify(mut self, notify: bool) -> Self {
        self.notify = notify;
        self
    }

    /// Override the notification title
    pub fn with_notify_title(mut self, title: impl Into<String>) -> Self {
        self.notify_title = title.into();
        self
    }

    fn validate(entries: &[Entry]) -> RelayResult<()> {
        if entries.is_empty() {
            return Err(RelayError::config("no entries supplied"));
        }

        let mut seen = HashSet::new();
        for entry in entries {
            if entry.src.as_os_str().is_empty() || entry.dst.as_os_str().is_empty() {
                return Err(RelayError::config("entry paths must not be empty"));
            }
            if entry.src == entry.dst {
                return Err(RelayError::config(format!(
                    "entry source and destination are the same: {:?}",
                    entry.src
                )));
            }
            if !seen.insert(&entry.src) {
                return Err(RelayError::config(format!(
                    "duplicate source: {:?}",
                    entry.src
                )));
            }
        }
        Ok(())
    }
}

/// Base name of the running executable, used as the notification title
pub fn default_notify_title() -> String {
    std::env::args_os()
        .next()
        .as_deref()
        .map(std::path::Path::new)
        .and_then(|p| p.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "bucket-relay".to_string())
}
