//! Component descriptors and the typed builder that declares them.
//!
//! ```ignore
//! registry.descriptor(TransformNode::new, |d| {
//!     d.add_aliases(&["Spatial"]);
//!     d.vec3("position", Vec3::ZERO, |n| n.position(), |n, v| n.set_position(v));
//!     d.mat4("worldMatrix", Mat4::IDENTITY, |n| n.world_matrix(), |n, m| n.set_world_matrix(m))
//!         .transient();
//! });
//! ```
//!
//! Getters and setters are plain function pointers over the concrete type.
//! The builder wraps them in closures that downcast from `dyn Component`, so
//! the descriptor itself stays type-erased.

use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::Registry;
use super::field::{FieldDescriptor, FieldKind, FieldValue};
use crate::ecs::{Capability, Component, EntityId};
use crate::math::{Mat4, Vec2, Vec3, Vec4};

type Factory = Box<dyn Fn() -> Box<dyn Component> + Send + Sync>;

/// Reflection and construction metadata for one component kind.
pub struct ComponentDescriptor {
    pub(crate) component_name: &'static str,
    pub(crate) factory: Factory,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) aliases: Vec<String>,
    pub(crate) nested: Vec<Arc<ComponentDescriptor>>,
}

impl ComponentDescriptor {
    /// Canonical capability name.
    pub fn component_name(&self) -> &'static str {
        self.component_name
    }

    /// Construct a fresh, detached instance.
    pub fn create(&self) -> Box<dyn Component> {
        (self.factory)()
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Alternative capability names this kind answers to.
    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    /// Descriptors declared inside this one's builder.
    pub fn nested(&self) -> &[Arc<ComponentDescriptor>] {
        &self.nested
    }

    /// Whether `name` is the canonical name or one of the aliases.
    pub fn answers_to(&self, name: &str) -> bool {
        self.component_name == name || self.aliases.iter().any(|a| a == name)
    }

    /// Serialize every non-transient, non-reference field.
    ///
    /// References need a world to become paths; see
    /// [`World::write_component`](crate::ecs::World::write_component).
    pub fn write_plain_fields(&self, component: &dyn Component) -> crate::Result<Map<String, Value>> {
        let mut out = Map::new();
        for field in self.fields.iter().filter(|f| !f.transient) {
            if let Some(json) = field.get(component)?.to_json() {
                out.insert(field.name.clone(), json);
            }
        }
        Ok(out)
    }

    /// Copy every field value from `source` to `target`. Both must be of
    /// this descriptor's type.
    pub fn copy_fields(&self, source: &dyn Component, target: &mut dyn Component) -> crate::Result<()> {
        for field in &self.fields {
            field.set(target, field.get(source)?)?;
        }
        Ok(())
    }

    /// Reset every field to its declared default.
    pub fn reset(&self, component: &mut dyn Component) -> crate::Result<()> {
        for field in &self.fields {
            field.reset(component)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ComponentDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentDescriptor")
            .field("component_name", &self.component_name)
            .field("fields", &self.fields)
            .field("aliases", &self.aliases)
            .field("nested", &self.nested.iter().map(|d| d.component_name).collect::<Vec<_>>())
            .finish()
    }
}

/// Declares the fields, aliases and nested kinds of component type `T`.
///
/// Obtained from [`Registry::descriptor`].
pub struct DescriptorBuilder<'r, T> {
    pub(crate) registry: &'r mut Registry,
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) aliases: Vec<String>,
    pub(crate) nested: Vec<Arc<ComponentDescriptor>>,
    pub(crate) _marker: PhantomData<fn() -> T>,
}

impl<T: Capability> DescriptorBuilder<'_, T> {
    /// Add alternative capability names.
    pub fn add_aliases(&mut self, aliases: &[&str]) -> &mut Self {
        self.aliases.extend(aliases.iter().map(|a| a.to_string()));
        self
    }

    /// Register another descriptor and record it as nested in this one.
    pub fn descriptor<U: Capability>(
        &mut self,
        factory: impl Fn() -> U + Send + Sync + 'static,
        configure: impl FnOnce(&mut DescriptorBuilder<'_, U>),
    ) -> Arc<ComponentDescriptor> {
        let nested = self.registry.descriptor(factory, configure);
        self.nested.push(Arc::clone(&nested));
        nested
    }

    /// Declare a `bool` field.
    pub fn bool(&mut self, name: &str, default: bool, get: fn(&T) -> bool, set: fn(&mut T, bool)) -> &mut FieldDescriptor {
        self.push(name, FieldKind::Bool, FieldValue::Bool(default), get, set, FieldValue::Bool, |v| match v {
            FieldValue::Bool(b) => Some(b),
            _ => None,
        })
    }

    /// Declare an `i32` field.
    pub fn int(&mut self, name: &str, default: i32, get: fn(&T) -> i32, set: fn(&mut T, i32)) -> &mut FieldDescriptor {
        self.push(name, FieldKind::Int, FieldValue::Int(default), get, set, FieldValue::Int, |v| match v {
            FieldValue::Int(i) => Some(i),
            _ => None,
        })
    }

    /// Declare an `f32` field.
    pub fn float(&mut self, name: &str, default: f32, get: fn(&T) -> f32, set: fn(&mut T, f32)) -> &mut FieldDescriptor {
        self.push(name, FieldKind::Float, FieldValue::Float(default), get, set, FieldValue::Float, |v| match v {
            FieldValue::Float(f) => Some(f),
            _ => None,
        })
    }

    /// Declare a `String` field.
    pub fn string(
        &mut self,
        name: &str,
        default: &str,
        get: fn(&T) -> String,
        set: fn(&mut T, String),
    ) -> &mut FieldDescriptor {
        self.push(
            name,
            FieldKind::String,
            FieldValue::String(default.to_string()),
            get,
            set,
            FieldValue::String,
            |v| match v {
                FieldValue::String(s) => Some(s),
                _ => None,
            },
        )
    }

    /// Declare a [`Vec2`] field.
    pub fn vec2(&mut self, name: &str, default: Vec2, get: fn(&T) -> Vec2, set: fn(&mut T, Vec2)) -> &mut FieldDescriptor {
        self.push(name, FieldKind::Vec2, FieldValue::Vec2(default), get, set, FieldValue::Vec2, |v| match v {
            FieldValue::Vec2(v) => Some(v),
            _ => None,
        })
    }

    /// Declare a [`Vec3`] field.
    pub fn vec3(&mut self, name: &str, default: Vec3, get: fn(&T) -> Vec3, set: fn(&mut T, Vec3)) -> &mut FieldDescriptor {
        self.push(name, FieldKind::Vec3, FieldValue::Vec3(default), get, set, FieldValue::Vec3, |v| match v {
            FieldValue::Vec3(v) => Some(v),
            _ => None,
        })
    }

    /// Declare a [`Vec4`] field.
    pub fn vec4(&mut self, name: &str, default: Vec4, get: fn(&T) -> Vec4, set: fn(&mut T, Vec4)) -> &mut FieldDescriptor {
        self.push(name, FieldKind::Vec4, FieldValue::Vec4(default), get, set, FieldValue::Vec4, |v| match v {
            FieldValue::Vec4(v) => Some(v),
            _ => None,
        })
    }

    /// Declare a [`Mat4`] field.
    pub fn mat4(&mut self, name: &str, default: Mat4, get: fn(&T) -> Mat4, set: fn(&mut T, Mat4)) -> &mut FieldDescriptor {
        self.push(name, FieldKind::Mat4, FieldValue::Mat4(default), get, set, FieldValue::Mat4, |v| match v {
            FieldValue::Mat4(m) => Some(m),
            _ => None,
        })
    }

    /// Declare a reference to another entity carrying `capability`.
    ///
    /// Serialized as the referenced component's path from the root; on read
    /// the path is resolved (creating placeholders) before the setter runs.
    pub fn reference(
        &mut self,
        name: &str,
        capability: &str,
        get: fn(&T) -> Option<EntityId>,
        set: fn(&mut T, Option<EntityId>),
    ) -> &mut FieldDescriptor {
        self.push(
            name,
            FieldKind::Ref {
                capability: capability.to_string(),
            },
            FieldValue::Ref(None),
            get,
            set,
            FieldValue::Ref,
            |v| match v {
                FieldValue::Ref(r) => Some(r),
                _ => None,
            },
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn push<V: 'static>(
        &mut self,
        name: &str,
        kind: FieldKind,
        default: FieldValue,
        get: fn(&T) -> V,
        set: fn(&mut T, V),
        wrap: fn(V) -> FieldValue,
        unwrap: fn(FieldValue) -> Option<V>,
    ) -> &mut FieldDescriptor {
        if self.fields.iter().any(|f| f.name == name) {
            log::warn!("{}: field `{name}` declared twice; last declaration wins", T::NAME);
            self.fields.retain(|f| f.name != name);
        }
        self.fields.push(FieldDescriptor {
            owner: T::NAME,
            name: name.to_string(),
            kind,
            default,
            transient: false,
            get: Box::new(move |component: &dyn Component| {
                component.downcast_ref::<T>().map(|t| wrap(get(t)))
            }),
            set: Box::new(move |component: &mut dyn Component, value: FieldValue| {
                match (component.downcast_mut::<T>(), unwrap(value)) {
                    (Some(t), Some(v)) => {
                        set(t, v);
                        true
                    }
                    _ => false,
                }
            }),
        });
        let last = self.fields.len() - 1;
        &mut self.fields[last]
    }
}
