//! Utilities
//!
//! Common utilities used throughout the relay.

pub mod error;
pub mod logging;

pub use error::*;
pub use logging::*;
