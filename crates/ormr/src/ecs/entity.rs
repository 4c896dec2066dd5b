//! # Entity — Named Nodes of the Composition Tree
//!
//! An [`EntityId`] is a stable handle into the [`World`](super::world::World)'s
//! arena. The arena is a [`slotmap::SlotMap`], which pairs each slot with a
//! version counter: when an entity is destroyed and its slot reused, old
//! handles stop resolving instead of silently pointing at the newcomer.
//!
//! ```text
//! EntityId { slot: 5, version: 1 }  ← original
//! EntityId { slot: 5, version: 3 }  ← after destroy + reuse
//! ```
//!
//! The record behind a handle owns its name, a non-owning parent handle, the
//! ordered list of owned children and the components attached to it.

use slotmap::new_key_type;

use super::component::Component;
use crate::error::{Result, SceneError};

new_key_type! {
    /// A lightweight, copyable handle to an entity in a [`World`](super::world::World).
    ///
    /// Only valid for the world that created it, and only while the entity is
    /// alive.
    pub struct EntityId;
}

/// Path delimiter between entity names.
pub const DELIMITER: char = '/';
/// Path segment meaning "this entity".
pub const TO_SELF: &str = ".";
/// Path segment meaning "the parent entity".
pub const TO_PARENT: &str = "..";

/// Storage behind an [`EntityId`].
pub(crate) struct EntityRecord {
    pub(crate) name: String,
    /// Non-owning back-reference. `None` for roots.
    pub(crate) parent: Option<EntityId>,
    /// Owned children, in insertion order.
    pub(crate) children: Vec<EntityId>,
    /// At most one component per capability name, in attachment order.
    pub(crate) components: Vec<Box<dyn Component>>,
    /// Whether this entity (and its branch) is written by scene serialization.
    pub(crate) serialize: bool,
}

impl EntityRecord {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
            serialize: true,
        }
    }

    /// Index of the component occupying exactly this capability slot.
    pub(crate) fn slot(&self, name: &str) -> Option<usize> {
        self.components
            .iter()
            .position(|c| c.component_name() == name)
    }
}

/// Child names must be addressable by paths: non-empty, no delimiters, and
/// not one of the relative segments.
pub(crate) fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name == TO_SELF
        || name == TO_PARENT
        || name.contains(DELIMITER)
        || name.contains(':')
    {
        return Err(SceneError::InvalidName(name.to_string()));
    }
    Ok(())
}
