//! World configuration.
//!
//! All knobs have sensible defaults, so most code just uses
//! [`WorldConfig::default()`]. Tools that want different limits can load a
//! JSON file:
//!
//! ```json
//! { "max_hierarchy_depth": 64, "skip_unknown_components": true }
//! ```
//!
//! Missing keys fall back to their defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Limits and policies for a [`World`](crate::ecs::World).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Longest parent chain a transform node may resolve through. Walks that
    /// exceed it are reported as cyclic.
    pub max_hierarchy_depth: usize,
    /// How deep component creation may recurse through required siblings.
    pub max_composition_depth: usize,
    /// Log and skip unknown capability names while deserializing, instead of
    /// failing the whole read.
    pub skip_unknown_components: bool,
    /// In debug builds, log a warning when a Dirty world matrix is read.
    pub warn_on_stale_read: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_hierarchy_depth: 1024,
            max_composition_depth: 16,
            skip_unknown_components: false,
            warn_on_stale_read: true,
        }
    }
}

impl WorldConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}
