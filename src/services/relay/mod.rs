//! File Relay Service
//!
//! Mirrors watched source files to their destinations.
//! Uses the `notify` crate for cross-platform file system event monitoring.
//!
//! Features:
//! - Watch individual source files (no directory trees)
//! - Forward sync on create/write, replicating the source mtime
//! - Backward sync when the destination is newer than the last recorded source state
//! - Watch release/re-install around backward sync to avoid feedback loops

mod copy;
mod engine;
mod events;
mod registry;
mod watcher;

pub use copy::*;
pub use engine::*;
pub use events::*;
pub use registry::*;
pub use watcher::*;
