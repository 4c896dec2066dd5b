//! # Paths — Addressing Entities, Components and Fields
//!
//! ```text
//!   /scene/car/wheel_1:TransformNode.position
//!   │└──── entity ────┘ └─ capability ─┘└ field ┘
//!   └ root anchor (optional)
//! ```
//!
//! - Entity segments are separated by `/`. `.` means "here" and `..` means
//!   "parent".
//! - A leading `/` starts at the root of the tree. Otherwise the path is
//!   relative to the entity it is resolved from.
//! - A component path ends with `:Capability`. The colon is required; an
//!   empty entity part (`:TransformNode`) addresses the starting entity.
//! - A property path appends `.field` to a component path.
//!
//! Parsing is pure: it never touches a world, so malformed strings are
//! rejected before anything is created.

use super::entity::{DELIMITER, TO_PARENT, TO_SELF};
use crate::error::{Result, SceneError};

/// One step of an entity path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// `.`
    Current,
    /// `..`
    Parent,
    /// A child name.
    Child(&'a str),
}

/// A parsed entity path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityPath<'a> {
    /// Whether resolution starts at the root instead of the given entity.
    pub absolute: bool,
    /// Steps to take, in order.
    pub segments: Vec<Segment<'a>>,
}

impl<'a> EntityPath<'a> {
    /// Parse an entity path. The empty string is the starting entity itself.
    pub fn parse(path: &'a str) -> Result<Self> {
        Self::parse_in(path, path)
    }

    /// Parse `text`, reporting errors against `full`.
    fn parse_in(text: &'a str, full: &str) -> Result<Self> {
        let (absolute, rest) = match text.strip_prefix(DELIMITER) {
            Some(rest) => (true, rest),
            None => (false, text),
        };

        let mut segments = Vec::new();
        if !rest.is_empty() {
            for part in rest.split(DELIMITER) {
                segments.push(match part {
                    "" => return Err(SceneError::malformed(full, "empty entity name segment")),
                    TO_SELF => Segment::Current,
                    TO_PARENT => Segment::Parent,
                    name if name.contains(':') => {
                        return Err(SceneError::malformed(full, "`:` inside an entity name"));
                    }
                    name => Segment::Child(name),
                });
            }
        }

        Ok(Self { absolute, segments })
    }
}

/// A parsed `entity/path:Capability` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComponentPath<'a> {
    /// Where the component lives.
    pub entity: EntityPath<'a>,
    /// Capability name after the last `:`.
    pub capability: &'a str,
}

impl<'a> ComponentPath<'a> {
    /// Parse a component path.
    ///
    /// The split happens at the last `:`; a path without one is malformed, as
    /// is an empty capability name.
    pub fn parse(path: &'a str) -> Result<Self> {
        let Some((entity, capability)) = path.rsplit_once(':') else {
            return Err(SceneError::malformed(path, "missing `:` before capability name"));
        };
        if capability.is_empty() {
            return Err(SceneError::malformed(path, "empty capability name"));
        }
        if capability.contains(DELIMITER) {
            return Err(SceneError::malformed(path, "`/` inside a capability name"));
        }
        Ok(Self {
            entity: EntityPath::parse_in(entity, path)?,
            capability,
        })
    }
}

/// A parsed `entity/path:Capability.field` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyPath<'a> {
    /// The component holding the field.
    pub component: ComponentPath<'a>,
    /// Field name.
    pub field: &'a str,
}

impl<'a> PropertyPath<'a> {
    /// Parse a property path. The field is separated from the capability by
    /// the first `.` after the last `:`.
    pub fn parse(path: &'a str) -> Result<Self> {
        let Some(colon) = path.rfind(':') else {
            return Err(SceneError::malformed(path, "missing `:` before capability name"));
        };
        let Some((capability, field)) = path[colon + 1..].split_once('.') else {
            return Err(SceneError::malformed(path, "missing `.` before field name"));
        };
        if field.is_empty() {
            return Err(SceneError::malformed(path, "empty field name"));
        }
        if capability.is_empty() {
            return Err(SceneError::malformed(path, "empty capability name"));
        }
        Ok(Self {
            component: ComponentPath {
                entity: EntityPath::parse_in(&path[..colon], path)?,
                capability,
            },
            field,
        })
    }
}
