//! # Scene I/O — Entity Trees as JSON
//!
//! ```json
//! {
//!   "name": "scene",
//!   "components": {
//!     "TransformNode": { "position": [1.0, 2.0, 3.0], "rotation": [0.0, 0.0, 0.0, 1.0], "scale": [1.0, 1.0, 1.0] }
//!   },
//!   "children": [
//!     { "name": "camera", "components": { "Camera": { "fov": 60.0 } }, "children": [] }
//!   ]
//! }
//! ```
//!
//! - Components are keyed by capability name and hold one entry per
//!   non-transient field, in declaration order.
//! - Fields missing on read take their declared default.
//! - References are written as component paths from the tree root
//!   (`"rig/arm:TransformNode"`). On read they resolve through
//!   `make_path_to_component`, so a reference may point at an entity that
//!   appears later in the document (or not at all): the target is created as
//!   a placeholder and filled in when its own entry is read.
//! - Children are matched by name, so reading into an existing tree updates
//!   it in place.

use std::path::Path;

use serde_json::{Map, Value};

use crate::ecs::{Component, EntityId, World};
use crate::error::{Result, SceneError};
use crate::registry::{self, FieldKind, FieldValue};

impl World {
    /// Serialize one component's non-transient fields.
    pub fn write_component(&self, component: &dyn Component) -> Result<Map<String, Value>> {
        let name = component.component_name();
        let descriptor = registry::read(&self.registry)
            .get(name)
            .filter(|d| d.component_name() == name)
            .cloned()
            .ok_or_else(|| SceneError::unknown_capability(name))?;

        let mut out = Map::new();
        for field in descriptor.fields().iter().filter(|f| !f.is_transient()) {
            match (field.get(component)?, field.kind()) {
                (FieldValue::Ref(None), _) => {}
                (FieldValue::Ref(Some(target)), FieldKind::Ref { capability }) => {
                    if !self.contains(target) {
                        log::warn!("`{name}.{}` references a destroyed entity; not written", field.name());
                        continue;
                    }
                    let slot = self
                        .get_component_by_name(target, capability)
                        .map_or(capability.as_str(), |c| c.component_name());
                    out.insert(field.name().to_string(), Value::String(self.component_path(target, slot)));
                }
                (value, _) => {
                    if let Some(json) = value.to_json() {
                        out.insert(field.name().to_string(), json);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Serialize `entity` and its serializable descendants.
    pub fn write_entity(&self, entity: EntityId) -> Result<Value> {
        let record = self.record(entity)?;

        let mut components = Map::new();
        for component in &record.components {
            match self.write_component(&**component) {
                Ok(fields) => {
                    components.insert(component.component_name().to_string(), Value::Object(fields));
                }
                Err(SceneError::UnknownCapability { name }) if self.config.skip_unknown_components => {
                    log::warn!("`{}`: skipping unregistered component `{name}`", self.path(entity));
                }
                Err(err) => return Err(err),
            }
        }

        let children = record
            .children
            .iter()
            .filter(|&&child| self.is_serialized(child))
            .map(|&child| self.write_entity(child))
            .collect::<Result<Vec<_>>>()?;

        let mut out = Map::new();
        out.insert("name".into(), Value::String(record.name.clone()));
        out.insert("components".into(), Value::Object(components));
        out.insert("children".into(), Value::Array(children));
        Ok(Value::Object(out))
    }

    /// Pretty-printed [`write_entity`](Self::write_entity).
    pub fn to_json_string(&self, entity: EntityId) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.write_entity(entity)?)?)
    }

    /// Read one component entry into `entity`, creating the component if
    /// needed. Missing fields take their defaults.
    pub fn read_component(&mut self, entity: EntityId, name: &str, json: &Value) -> Result<()> {
        let object = json
            .as_object()
            .ok_or_else(|| SceneError::InvalidDocument(format!("component `{name}` is not an object")))?;

        let index = self.ensure_component(entity, name, 0)?;
        let slot = self.record(entity)?.components[index].component_name();
        let descriptor = registry::read(&self.registry)
            .get(slot)
            .cloned()
            .ok_or_else(|| SceneError::unknown_capability(slot))?;

        let mut values = Vec::with_capacity(descriptor.fields().len());
        for field in descriptor.fields().iter().filter(|f| !f.is_transient()) {
            let value = match (field.kind(), object.get(field.name())) {
                (_, None) => field.default_value().clone(),
                (FieldKind::Ref { .. }, Some(Value::Null)) => FieldValue::Ref(None),
                (FieldKind::Ref { .. }, Some(Value::String(path))) if path.is_empty() => FieldValue::Ref(None),
                (FieldKind::Ref { .. }, Some(Value::String(path))) => {
                    let root = self.root_of(entity);
                    FieldValue::Ref(Some(self.make_path_to_component(root, path)?.entity))
                }
                (kind, Some(json)) => FieldValue::from_json(kind, json, field.default_value())
                    .ok_or_else(|| field.mismatch(kind.describe()))?,
            };
            values.push((field, value));
        }

        let record = self.record_mut(entity)?;
        // Resolving references may have attached components here; find the slot again.
        let index = record.slot(slot).ok_or_else(|| SceneError::unknown_capability(slot))?;
        let component = &mut *record.components[index];
        for (field, value) in values {
            field.set(component, value)?;
        }
        component.after_read();
        let dirty = component
            .as_transform()
            .is_some_and(|node| node.is_transform_update_requested());

        if dirty {
            self.request_transform_update(entity, true);
        }
        Ok(())
    }

    /// Read an entity document into an existing entity: its name, children
    /// (matched by name, created if missing) and components.
    pub fn read_entity(&mut self, entity: EntityId, json: &Value) -> Result<()> {
        let object = json.as_object().ok_or_else(|| {
            SceneError::InvalidDocument(format!("entity `{}` is not an object", self.path(entity)))
        })?;

        if let Some(name) = object.get("name").and_then(Value::as_str) {
            self.set_name(entity, name)?;
        }

        if let Some(children) = object.get("children") {
            let children = children
                .as_array()
                .ok_or_else(|| SceneError::InvalidDocument("`children` is not an array".into()))?;
            for child in children {
                let name = child
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| SceneError::InvalidDocument("child entity without a name".into()))?;
                let id = self.entity(entity, name)?;
                self.read_entity(id, child)?;
            }
        }

        if let Some(components) = object.get("components") {
            let components = components
                .as_object()
                .ok_or_else(|| SceneError::InvalidDocument("`components` is not an object".into()))?;
            for (name, value) in components {
                match self.read_component(entity, name, value) {
                    Err(SceneError::UnknownCapability { name }) if self.config.skip_unknown_components => {
                        log::error!("`{}`: skipping unknown component `{name}`", self.path(entity));
                    }
                    other => other?,
                }
            }
        }
        Ok(())
    }

    /// Create a new root from an entity document. Nothing is left behind if
    /// reading fails.
    pub fn spawn_from_json(&mut self, json: &Value) -> Result<EntityId> {
        let name = json.get("name").and_then(Value::as_str).unwrap_or_default();
        let root = self.spawn(name);
        if let Err(err) = self.read_entity(root, json) {
            self.destroy(root);
            return Err(err);
        }
        log::debug!("loaded scene `{name}` ({} entities)", self.branch(root).len());
        Ok(root)
    }

    /// Parse and [`spawn_from_json`](Self::spawn_from_json).
    pub fn spawn_from_json_str(&mut self, json: &str) -> Result<EntityId> {
        let value: Value = serde_json::from_str(json)?;
        self.spawn_from_json(&value)
    }

    /// Write `entity`'s branch to a JSON file.
    pub fn save(&self, entity: EntityId, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json_string(entity)?)?;
        log::info!("saved `{}` to {}", self.name(entity).unwrap_or_default(), path.display());
        Ok(())
    }

    /// Load a JSON file as a new root.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<EntityId> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let root = self.spawn_from_json_str(&contents)?;
        log::info!("loaded {}", path.display());
        Ok(root)
    }
}
