//! Error taxonomy for the object model.
//!
//! Structural and lookup failures surface to the immediate caller; nothing in
//! the core retries or swallows them. Replacing a component in an occupied
//! capability slot is *not* an error (it is a defined replace-and-detach), so
//! it has no variant here.

/// Result alias used throughout the crate.
pub type Result<T, E = SceneError> = std::result::Result<T, E>;

/// Everything that can go wrong while building, addressing, serializing or
/// updating the entity tree.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// No descriptor is registered under this capability name.
    #[error("unknown capability `{name}`")]
    UnknownCapability {
        /// The name that was looked up.
        name: String,
    },

    /// A path string violates the `segment/segment:Capability` grammar.
    #[error("malformed path `{path}`: {reason}")]
    MalformedPath {
        /// The offending path.
        path: String,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// A transform node's parent chain loops back on itself, or is deeper
    /// than the configured bound.
    #[error("cyclic transform parent resolution at `{path}`")]
    CyclicParentResolution {
        /// Path of the node whose resolution failed.
        path: String,
    },

    /// Creating a component kept requiring further components past the
    /// configured composition depth.
    #[error("cyclic component composition while creating `{name}` (depth {depth})")]
    CyclicComposition {
        /// The capability being created when the bound was hit.
        name: String,
        /// Depth reached.
        depth: usize,
    },

    /// Attaching an entity under one of its own descendants.
    #[error("entity `{path}` cannot become a descendant of itself")]
    CyclicHierarchy {
        /// Path of the entity being attached.
        path: String,
    },

    /// The handle does not refer to a live entity.
    #[error("entity handle is stale or was never allocated")]
    NoSuchEntity,

    /// A sibling with that name already exists.
    #[error("entity `{parent}` already has a child named `{name}`")]
    DuplicateChildName {
        /// Path of the parent entity.
        parent: String,
        /// The conflicting child name.
        name: String,
    },

    /// Entity names must be non-empty and must not contain path delimiters.
    #[error("invalid entity name `{0}`")]
    InvalidName(String),

    /// The component's descriptor declares no such field.
    #[error("component `{component}` has no field `{field}`")]
    UnknownField {
        /// Capability name of the component.
        component: String,
        /// Requested field name.
        field: String,
    },

    /// A field was given a value (or JSON) of the wrong shape.
    #[error("field `{component}.{field}` expects {expected}")]
    FieldTypeMismatch {
        /// Capability name of the component.
        component: String,
        /// Field name.
        field: String,
        /// Human-readable expected shape.
        expected: &'static str,
    },

    /// The slot for a capability is held by a component of another type.
    #[error("capability `{name}` is occupied by a different component type")]
    CapabilityTypeMismatch {
        /// The capability name.
        name: String,
    },

    /// A scene document does not have the expected shape.
    #[error("invalid scene document: {0}")]
    InvalidDocument(String),

    /// A world matrix was read while its node was still Dirty.
    #[error("world matrix of `{path}` read while an update is pending")]
    StaleTransform {
        /// Path of the node.
        path: String,
    },

    /// JSON parse or conversion failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem failure while saving or loading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SceneError {
    pub(crate) fn malformed(path: &str, reason: &'static str) -> Self {
        Self::MalformedPath {
            path: path.to_string(),
            reason,
        }
    }

    pub(crate) fn unknown_capability(name: &str) -> Self {
        Self::UnknownCapability {
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_culprit() {
        let err = SceneError::unknown_capability("Teleporter");
        assert_eq!(err.to_string(), "unknown capability `Teleporter`");

        let err = SceneError::malformed("a/b", "missing `:` before capability name");
        assert!(err.to_string().contains("a/b"));
    }

    #[test]
    fn io_errors_convert() {
        fn open() -> Result<String> {
            Ok(std::fs::read_to_string("/definitely/not/here.json")?)
        }
        assert!(matches!(open(), Err(SceneError::Io(_))));
    }
}
