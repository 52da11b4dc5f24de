//! Watch Event Definitions
//!
//! Normalized change events delivered by a watch source to the relay loop.

use std::path::PathBuf;

/// Kind of change observed on a watched file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeType {
    /// File was created
    Created,
    /// File content was written
    Written,
    /// File was renamed (moved away or into place)
    Renamed,
    /// File was removed
    Removed,
    /// Permissions or other metadata changed
    Permission,
    /// File was opened or read
    Access,
    /// Anything the backend could not classify
    Other,
}

impl ChangeType {
    /// Only creation and writes trigger a sync; every other kind is logged and ignored.
    pub fn is_sync_trigger(self) -> bool {
        matches!(self, ChangeType::Created | ChangeType::Written)
    }
}

impl From<notify::EventKind> for ChangeType {
    fn from(kind: notify::EventKind) -> Self {
        use notify::event::ModifyKind;
        use notify::EventKind;
        match kind {
            EventKind::Create(_) => ChangeType::Created,
            EventKind::Modify(ModifyKind::Name(_)) => ChangeType::Renamed,
            EventKind::Modify(ModifyKind::Metadata(_)) => ChangeType::Permission,
            EventKind::Modify(_) => ChangeType::Written,
            EventKind::Remove(_) => ChangeType::Removed,
            EventKind::Access(_) => ChangeType::Access,
            EventKind::Any | EventKind::Other => ChangeType::Other,
        }
    }
}

/// A change on a single path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchEvent {
    /// Path the change was reported on
    pub path: PathBuf,
    /// Kind of change
    pub kind: ChangeType,
}

impl WatchEvent {
    /// Create a new watch event
    pub fn new(path: impl Into<PathBuf>, kind: ChangeType) -> Self {
        Self {
            path: path.into(),
            kind,
        }
    }

    /// Split a notify event into one watch event per reported path
    pub fn from_notify(event: notify::Event) -> Vec<Self> {
        let kind = ChangeType::from(event.kind);
        event
            .paths
            .into_iter()
            .map(|path| Self { path, kind })
            .collect()
    }
}
