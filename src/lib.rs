//! Bucket Relay - File Mirroring Library
//!
//! Keeps designated source files mirrored to destination paths.
//! It includes:
//! - The watch/dispatch/sync engine
//! - Startup configuration models
//! - A best-effort desktop notifier
//! - Error and logging utilities

pub mod models;
pub mod services;
pub mod utils;

pub use models::{Entry, RelayConfig};
pub use services::{Relay, SyncOutcome};
pub use utils::error::{RelayError, RelayResult};
