//! Data Models
//!
//! Startup configuration types.

pub mod config;
pub mod entry;

pub use config::*;
pub use entry::*;
