//! Relay Engine
//!
//! Registration, the event loop, and the sync decision.
//!
//! All registry reads and writes happen on the task driving [`Relay::run`];
//! the watch backend only talks to it through [`WatchChannels`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use super::copy::copy_file;
use super::events::WatchEvent;
use super::registry::{Registry, SourceState};
use super::watcher::{WatchChannels, WatchSource};
use crate::models::Entry;
use crate::services::notifier::Notifier;
use crate::utils::error::{RelayError, RelayResult};

/// Direction a sync call took
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// source -> destination
    Forward,
    /// destination -> source
    Backward,
}

/// Watches source files and mirrors them to their destinations
pub struct Relay<W: WatchSource> {
    watcher: W,
    channels: WatchChannels,
    notifier: Arc<dyn Notifier>,
    registry: Registry,
}

impl<W: WatchSource> Relay<W> {
    /// Create a relay over a watch source and the channels it delivers on
    pub fn new(watcher: W, channels: WatchChannels, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            watcher,
            channels,
            notifier,
            registry: Registry::new(),
        }
    }

    /// Read access to the registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Read access to the watch source
    pub fn watcher(&self) -> &W {
        &self.watcher
    }

    /// Stat and watch every entry's source.
    ///
    /// All or nothing: on the first failure, watches installed so far are
    /// removed again and the registry stays empty.
    pub fn register(&mut self, entries: &[Entry]) -> RelayResult<()> {
        if !self.registry.is_empty() {
            return Err(RelayError::config("entries are already registered"));
        }

        let mut registry = Registry::new();
        let mut installed: Vec<PathBuf> = Vec::new();

        for entry in entries {
            match self.register_entry(entry) {
                Ok(state) => {
                    installed.push(entry.src.clone());
                    registry.insert(state);
                }
                Err(err) => {
                    for path in &installed {
                        if let Err(e) = self.watcher.unwatch(path) {
                            tracing::warn!(source = %path.display(), "failed to roll back watch: {}", e);
                        }
                    }
                    return Err(err);
                }
            }
        }

        self.registry = registry;
        Ok(())
    }

    fn register_entry(&mut self, entry: &Entry) -> RelayResult<SourceState> {
        let mtime = fs::metadata(&entry.src)
            .and_then(|m| m.modified())
            .map_err(|e| RelayError::init(format!("failed to stat {:?}", entry.src), e))?;

        // Copying a file onto itself truncates it before it is read
        if let (Ok(src), Ok(dst)) = (entry.src.canonicalize(), entry.dst.canonicalize()) {
            if src == dst {
                return Err(RelayError::init(
                    format!("source and destination are the same file {:?}", entry.src),
                    format!("{:?} resolves to {:?}", entry.dst, src),
                ));
            }
        }

        self.watcher
            .watch(&entry.src)
            .map_err(|e| RelayError::init(format!("failed to watch file {:?}", entry.src), e))?;

        tracing::info!(
            source = %entry.src.display(),
            destination = %entry.dst.display(),
            "watching"
        );
        Ok(SourceState::new(entry.clone(), mtime))
    }

    /// Consume watch events until an error arrives.
    ///
    /// Never returns `Ok`: the relay runs until the watch source reports an
    /// error, a sync fails, or both channels close.
    pub async fn run(&mut self) -> RelayResult<()> {
        loop {
            tokio::select! {
                biased;

                Some(error) = self.channels.errors.recv() => {
                    return Err(error);
                }
                Some(event) = self.channels.events.recv() => {
                    self.handle_event(event)?;
                }
                else => {
                    return Err(RelayError::watch("watch source closed"));
                }
            }
        }
    }

    fn handle_event(&mut self, event: WatchEvent) -> RelayResult<()> {
        tracing::debug!(path = %event.path.display(), kind = ?event.kind, "received event");

        if !event.kind.is_sync_trigger() {
            return Ok(());
        }
        self.sync(&event.path).map(|_| ())
    }

    /// Sync one registered source with its destination.
    ///
    /// Copies destination -> source when the destination mtime is strictly
    /// after the recorded source mtime, otherwise source -> destination.
    pub fn sync(&mut self, path: &Path) -> RelayResult<SyncOutcome> {
        let (entry, last_source_mtime) = {
            let key = self
                .registry
                .resolve(path)
                .ok_or_else(|| RelayError::lookup(path))?;
            let state = self
                .registry
                .get(key)
                .ok_or_else(|| RelayError::lookup(path))?;
            (state.entry.clone(), state.last_source_mtime)
        };

        let outcome = match modified(&entry.dst) {
            Ok(dst_mtime) if dst_mtime > last_source_mtime => {
                self.sync_backward(&entry)?;
                SyncOutcome::Backward
            }
            Ok(_) => {
                self.sync_forward(&entry)?;
                SyncOutcome::Forward
            }
            Err(e) => {
                tracing::warn!(
                    destination = %entry.dst.display(),
                    "failed to stat dst file, syncing forward: {}",
                    e
                );
                self.sync_forward(&entry)?;
                SyncOutcome::Forward
            }
        };

        if let Some(state) = self.registry.get_mut(&entry.src) {
            state.last_source_mtime = SystemTime::now();
        }
        Ok(outcome)
    }

    fn sync_forward(&self, entry: &Entry) -> RelayResult<()> {
        let bytes = copy_file(&entry.src, &entry.dst)?;
        tracing::info!(
            source = %entry.src.display(),
            destination = %entry.dst.display(),
            bytes,
            "synced"
        );
        Ok(())
    }

    fn sync_backward(&mut self, entry: &Entry) -> RelayResult<()> {
        let guard = WatchGuard::release(&mut self.watcher, &entry.src)?;
        let copied = copy_file(&entry.dst, &entry.src);
        let restored = guard.restore();

        let bytes = match (copied, restored) {
            (Ok(bytes), Ok(())) => bytes,
            (Err(err), restored) => {
                if let Err(e) = restored {
                    tracing::error!(source = %entry.src.display(), "failed to restore watch: {}", e);
                }
                return Err(err);
            }
            (Ok(_), Err(err)) => return Err(err),
        };

        tracing::info!(
            source = %entry.src.display(),
            destination = %entry.dst.display(),
            bytes,
            "synced back"
        );

        let message = format!("{:?} <- {:?}: SYNCED BACK", entry.src, entry.dst);
        if let Err(e) = self.notifier.notify(&message) {
            tracing::debug!("notification dropped: {}", e);
        }
        Ok(())
    }
}

fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

/// Scoped release of a source watch.
///
/// The watch is removed on creation and re-installed by [`WatchGuard::restore`]
/// or, failing that, on drop.
pub struct WatchGuard<'a, W: WatchSource> {
    watcher: &'a mut W,
    path: PathBuf,
    restored: bool,
}

impl<'a, W: WatchSource> WatchGuard<'a, W> {
    /// Remove the watch on `path` until the guard is restored or dropped
    pub fn release(watcher: &'a mut W, path: &Path) -> RelayResult<Self> {
        watcher.unwatch(path)?;
        Ok(Self {
            watcher,
            path: path.to_path_buf(),
            restored: false,
        })
    }

    /// Re-install the watch, reporting failure to the caller
    pub fn restore(mut self) -> RelayResult<()> {
        self.restored = true;
        self.watcher.watch(&self.path)
    }
}

impl<W: WatchSource> Drop for WatchGuard<'_, W> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.watcher.watch(&self.path) {
            tracing::error!(source = %self.path.display(), "failed to restore watch: {}", e);
        }
    }
}
