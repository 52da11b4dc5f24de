//! Error Handling
//!
//! Unified error types for the relay.
//! Uses thiserror for ergonomic error definitions.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Boxed cause carried by startup errors
pub type BoxedCause = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Relay-wide error type
#[derive(Error, Debug)]
pub enum RelayError {
    /// Malformed or missing startup input
    #[error("Configuration error: {0}")]
    Config(String),

    /// Watch source construction, source stat or initial watch install failed
    #[error("Initialization error: {stage}: {source}")]
    Init {
        stage: String,
        #[source]
        source: BoxedCause,
    },

    /// Errors delivered by (or raised while driving) the watch source
    #[error("Watch error: {0}")]
    Watch(String),

    /// Any failure while copying between source and destination
    #[error("Sync error: {stage} {path:?}: {source}")]
    Sync {
        stage: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `sync` was asked about a path that was never registered
    #[error("No such source: {0:?}")]
    Lookup(PathBuf),

    /// Desktop notification delivery failed
    #[error("Notification error: {0}")]
    Notify(String),
}

/// Result type alias for relay errors
pub type RelayResult<T> = Result<T, RelayError>;

impl RelayError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an init error wrapping its cause
    pub fn init(stage: impl Into<String>, source: impl Into<BoxedCause>) -> Self {
        Self::Init {
            stage: stage.into(),
            source: source.into(),
        }
    }

    /// Create a watch error
    pub fn watch(msg: impl Into<String>) -> Self {
        Self::Watch(msg.into())
    }

    /// Create a sync error for the given stage and path
    pub fn sync(stage: &'static str, path: &Path, source: std::io::Error) -> Self {
        Self::Sync {
            stage,
            path: path.to_path_buf(),
            source,
        }
    }

    /// Create a lookup error
    pub fn lookup(path: &Path) -> Self {
        Self::Lookup(path.to_path_buf())
    }

    /// Create a notification error
    pub fn notify(msg: impl Into<String>) -> Self {
        Self::Notify(msg.into())
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("failed to parse entries: {}", err))
    }
}

impl From<notify::Error> for RelayError {
    fn from(err: notify::Error) -> Self {
        Self::Watch(err.to_string())
    }
}
