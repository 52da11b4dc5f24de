//! Entry Model
//!
//! A configured source/destination pair to keep in sync.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Source/destination pair supplied once at startup
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Entry {
    /// File whose changes are mirrored
    #[serde(alias = "source")]
    pub src: PathBuf,
    /// File receiving the mirrored content
    #[serde(alias = "destination")]
    pub dst: PathBuf,
}

impl Entry {
    /// Create a new entry
    pub fn new(src: impl Into<PathBuf>, dst: impl Into<PathBuf>) -> Self {
        Self {
            src: src.into(),
            dst: dst.into(),
        }
    }
}
