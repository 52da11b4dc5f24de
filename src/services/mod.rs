//! Services
//!
//! The relay engine and its collaborators.

pub mod notifier;
pub mod relay;

pub use notifier::{DesktopNotifier, NoopNotifier, Notifier};
pub use relay::{NotifyWatchSource, Relay, SyncOutcome, WatchChannels, WatchSource};
