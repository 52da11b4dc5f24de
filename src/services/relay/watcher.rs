//! Watch Source
//!
//! Filesystem notification primitive feeding the relay loop.
//! Uses the `notify` crate for cross-platform file system event monitoring.
//! Events and delivery errors arrive on two independent channels.

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;

use super::events::WatchEvent;
use crate::utils::error::{RelayError, RelayResult};

/// A mechanism that can install and remove watches on individual files.
///
/// Delivery happens out of band through [`WatchChannels`].
pub trait WatchSource: Send {
    /// Start watching a single file
    fn watch(&mut self, path: &Path) -> RelayResult<()>;
    /// Stop watching a single file
    fn unwatch(&mut self, path: &Path) -> RelayResult<()>;
    /// Whether a watch is currently installed for `path`
    fn is_watching(&self, path: &Path) -> bool;
}

/// Receiving halves consumed by the relay loop
#[derive(Debug)]
pub struct WatchChannels {
    /// Change events
    pub events: mpsc::UnboundedReceiver<WatchEvent>,
    /// Delivery errors
    pub errors: mpsc::UnboundedReceiver<RelayError>,
}

impl WatchChannels {
    /// Create a connected sink/channels pair
    pub fn pair() -> (WatchSink, WatchChannels) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (errors_tx, errors_rx) = mpsc::unbounded_channel();
        (
            WatchSink {
                events: events_tx,
                errors: errors_tx,
            },
            WatchChannels {
                events: events_rx,
                errors: errors_rx,
            },
        )
    }
}

/// Sending halves held by whatever produces watch events
#[derive(Debug, Clone)]
pub struct WatchSink {
    events: mpsc::UnboundedSender<WatchEvent>,
    errors: mpsc::UnboundedSender<RelayError>,
}

impl WatchSink {
    /// Deliver a change event. Returns false once the loop has gone away.
    pub fn send_event(&self, event: WatchEvent) -> bool {
        self.events.send(event).is_ok()
    }

    /// Deliver a watch error. Returns false once the loop has gone away.
    pub fn send_error(&self, error: RelayError) -> bool {
        self.errors.send(error).is_ok()
    }

    fn handle(&self, result: notify::Result<notify::Event>) {
        match result {
            Ok(event) => {
                for event in WatchEvent::from_notify(event) {
                    self.send_event(event);
                }
            }
            Err(error) => {
                self.send_error(RelayError::from(error));
            }
        }
    }
}

/// Watch source backed by the platform's recommended `notify` watcher.
///
/// No debouncing: every create/write must reach the loop.
pub struct NotifyWatchSource {
    watcher: RecommendedWatcher,
    watched_paths: HashSet<PathBuf>,
}

impl NotifyWatchSource {
    /// Create a watcher and the channels its events are delivered on
    pub fn new() -> RelayResult<(Self, WatchChannels)> {
        let (sink, channels) = WatchChannels::pair();
        let watcher =
            notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
                sink.handle(result)
            })
            .map_err(|e| RelayError::init("failed to initialize watcher", e))?;

        Ok((
            Self {
                watcher,
                watched_paths: HashSet::new(),
            },
            channels,
        ))
    }

    /// Get list of currently watched paths
    pub fn watched_paths(&self) -> Vec<PathBuf> {
        self.watched_paths.iter().cloned().collect()
    }
}

impl WatchSource for NotifyWatchSource {
    fn watch(&mut self, path: &Path) -> RelayResult<()> {
        self.watcher
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|e| RelayError::watch(format!("failed to watch {:?}: {}", path, e)))?;
        self.watched_paths.insert(path.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> RelayResult<()> {
        self.watched_paths.remove(path);
        self.watcher
            .unwatch(path)
            .map_err(|e| RelayError::watch(format!("failed to unwatch {:?}: {}", path, e)))
    }

    fn is_watching(&self, path: &Path) -> bool {
        self.watched_paths.contains(path)
    }
}
