//! # Registry — Capability Names to Factories and Fields
//!
//! Every component kind that should be creatable by name, reflectable or
//! serializable gets a [`ComponentDescriptor`] here.
//!
//! ```text
//!   "TransformNode" ──┐
//!   "Spatial"  ───────┼──▶ ComponentDescriptor { factory, fields, aliases, nested }
//!                     │
//!   "Shape" ──────────┴──▶ (last registered implementor; see `implementors`)
//! ```
//!
//! A process-wide registry, pre-populated with the built-in components, is
//! shared by every [`World`](crate::ecs::World) created with `World::new()`.
//! It lives behind an `RwLock`: registration takes the write lock, lookups
//! the read lock. Worlds built with `World::with_registry` use their own.

mod descriptor;
mod field;

pub use descriptor::{ComponentDescriptor, DescriptorBuilder};
pub use field::{FieldDescriptor, FieldKind, FieldValue};

use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ecs::{Capability, Component};
use crate::error::{Result, SceneError};

/// A registry shared between worlds.
pub type SharedRegistry = Arc<RwLock<Registry>>;

static GLOBAL: LazyLock<SharedRegistry> = LazyLock::new(|| Arc::new(RwLock::new(Registry::with_defaults())));

/// The process-wide registry.
pub fn global() -> SharedRegistry {
    Arc::clone(&GLOBAL)
}

/// Register descriptors into the process-wide registry.
///
/// ```ignore
/// ormr::registry::register(|r| {
///     r.descriptor(Health::default, |d| {
///         d.int("points", 100, |h| h.points, |h, v| h.points = v);
///     });
/// });
/// ```
pub fn register(f: impl FnOnce(&mut Registry)) {
    f(&mut write(&GLOBAL));
}

/// Read-lock a registry. A poisoned lock still holds consistent data (every
/// mutation is a single map insert), so poisoning is ignored.
pub(crate) fn read(registry: &RwLock<Registry>) -> RwLockReadGuard<'_, Registry> {
    registry.read().unwrap_or_else(PoisonError::into_inner)
}

/// Write-lock a registry.
pub(crate) fn write(registry: &RwLock<Registry>) -> RwLockWriteGuard<'_, Registry> {
    registry.write().unwrap_or_else(PoisonError::into_inner)
}

/// Name-keyed table of component descriptors.
#[derive(Default)]
pub struct Registry {
    /// Canonical names and aliases.
    by_name: HashMap<String, Arc<ComponentDescriptor>>,
    /// Canonical names in first-registration order.
    order: Vec<&'static str>,
    /// Alias to every canonical name declaring it.
    implementors: HashMap<String, Vec<&'static str>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in components.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::components::register_defaults(&mut registry);
        registry
    }

    /// Wrap in a lock for use by one or more worlds.
    pub fn into_shared(self) -> SharedRegistry {
        Arc::new(RwLock::new(self))
    }

    /// Declare and register the descriptor for `T`.
    ///
    /// Re-registering a name replaces the earlier descriptor.
    pub fn descriptor<T: Capability>(
        &mut self,
        factory: impl Fn() -> T + Send + Sync + 'static,
        configure: impl FnOnce(&mut DescriptorBuilder<'_, T>),
    ) -> Arc<ComponentDescriptor> {
        let mut builder = DescriptorBuilder {
            registry: self,
            fields: Vec::new(),
            aliases: Vec::new(),
            nested: Vec::new(),
            _marker: PhantomData,
        };
        configure(&mut builder);
        let DescriptorBuilder {
            fields,
            aliases,
            nested,
            ..
        } = builder;

        let descriptor = Arc::new(ComponentDescriptor {
            component_name: T::NAME,
            factory: Box::new(move || Box::new(factory()) as Box<dyn Component>),
            fields,
            aliases,
            nested,
        });
        self.insert(Arc::clone(&descriptor));
        descriptor
    }

    /// Register a prebuilt descriptor under its name and aliases.
    pub fn insert(&mut self, descriptor: Arc<ComponentDescriptor>) {
        let name = descriptor.component_name();

        match self.by_name.insert(name.to_string(), Arc::clone(&descriptor)) {
            Some(previous) if previous.component_name() == name => {
                log::warn!("descriptor `{name}` registered twice; the later one replaces it");
                for alias in previous.aliases() {
                    if !descriptor.answers_to(alias) {
                        self.drop_alias(name, alias);
                    }
                }
                // Alias entries still pointing at the replaced descriptor follow it.
                for entry in self.by_name.values_mut() {
                    if entry.component_name() == name {
                        *entry = Arc::clone(&descriptor);
                    }
                }
            }
            _ => {}
        }
        if !self.order.contains(&name) {
            self.order.push(name);
        }

        for alias in descriptor.aliases() {
            // An alias never shadows another kind's canonical name.
            let shadows_canonical = self
                .by_name
                .get(alias)
                .is_some_and(|existing| existing.component_name() == alias);
            if shadows_canonical {
                log::warn!("`{name}` declares alias `{alias}`, which is already a capability name");
            } else {
                self.by_name.insert(alias.clone(), Arc::clone(&descriptor));
            }
            let list = self.implementors.entry(alias.clone()).or_default();
            if !list.contains(&name) {
                list.push(name);
            }
        }
        log::debug!("registered component descriptor `{name}`");
    }

    /// Forget that `name` declares `alias`. Lookup by the alias falls back
    /// to the most recent remaining implementor.
    fn drop_alias(&mut self, name: &str, alias: &str) {
        let fallback = match self.implementors.get_mut(alias) {
            Some(list) => {
                list.retain(|n| *n != name);
                list.last().copied()
            }
            None => None,
        };
        if self.implementors.get(alias).is_some_and(|list| list.is_empty()) {
            self.implementors.remove(alias);
        }

        let points_here = self
            .by_name
            .get(alias)
            .is_some_and(|entry| entry.component_name() == name);
        if points_here {
            match fallback.and_then(|n| self.by_name.get(n).cloned()) {
                Some(other) => {
                    self.by_name.insert(alias.to_string(), other);
                }
                None => {
                    self.by_name.remove(alias);
                }
            }
        }
    }

    /// Look up by canonical name or alias.
    pub fn get(&self, name: &str) -> Option<&Arc<ComponentDescriptor>> {
        self.by_name.get(name)
    }

    /// Whether `name` resolves to a descriptor.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Every registered name (canonical and alias) with its descriptor.
    pub fn all_descriptors(&self) -> &HashMap<String, Arc<ComponentDescriptor>> {
        &self.by_name
    }

    /// Canonical names in registration order.
    pub fn component_names(&self) -> &[&'static str] {
        &self.order
    }

    /// Every descriptor answering to `name`: the canonical kind itself, or
    /// all kinds declaring it as an alias.
    pub fn implementors(&self, name: &str) -> Vec<Arc<ComponentDescriptor>> {
        match self.implementors.get(name) {
            Some(names) => names.iter().filter_map(|n| self.by_name.get(*n)).cloned().collect(),
            None => self.by_name.get(name).into_iter().cloned().collect(),
        }
    }

    /// Construct a fresh instance by capability name.
    pub fn create(&self, name: &str) -> Result<Box<dyn Component>> {
        self.get(name)
            .map(|d| d.create())
            .ok_or_else(|| SceneError::unknown_capability(name))
    }

    /// Whether the component occupying slot `component_name` answers to
    /// `name` through its descriptor.
    pub fn answers_to(&self, component_name: &str, name: &str) -> bool {
        component_name == name
            || self
                .by_name
                .get(component_name)
                .is_some_and(|d| d.component_name() == component_name && d.answers_to(name))
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry").field("components", &self.order).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityId;
    use crate::math::Vec3;
    use serde_json::json;

    #[derive(Default)]
    struct Health {
        entity: Option<EntityId>,
        points: i32,
        regen: f32,
    }

    crate::impl_component!(Health, "Health");

    #[derive(Default)]
    struct Beacon {
        entity: Option<EntityId>,
        color: Vec3,
        label: String,
        target: Option<EntityId>,
    }

    crate::impl_component!(Beacon, "Beacon");

    #[derive(Default)]
    struct Flare {
        entity: Option<EntityId>,
    }

    crate::impl_component!(Flare, "Flare");

    fn register_health(r: &mut Registry) -> Arc<ComponentDescriptor> {
        r.descriptor(Health::default, |d| {
            d.add_aliases(&["Vitals"]);
            d.int("points", 100, |h| h.points, |h, v| h.points = v);
            d.float("regen", 0.5, |h| h.regen, |h, v| h.regen = v).transient();
        })
    }

    #[test]
    fn create_by_name_and_alias() {
        let mut r = Registry::new();
        register_health(&mut r);

        let by_name = r.create("Health").unwrap();
        assert_eq!(by_name.component_name(), "Health");
        assert!(by_name.entity_or_null().is_none());

        let by_alias = r.create("Vitals").unwrap();
        assert_eq!(by_alias.component_name(), "Health");
    }

    #[test]
    fn unknown_name_is_an_error() {
        let r = Registry::new();
        assert!(matches!(
            r.create("Teleporter"),
            Err(SceneError::UnknownCapability { name }) if name == "Teleporter"
        ));
    }

    #[test]
    fn fields_in_declaration_order() {
        let mut r = Registry::new();
        let d = register_health(&mut r);
        let names: Vec<_> = d.fields().iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["points", "regen"]);
        assert!(d.field("regen").unwrap().is_transient());
        assert_eq!(d.field("points").unwrap().default_value(), &FieldValue::Int(100));
    }

    #[test]
    fn getters_and_setters_downcast() {
        let mut r = Registry::new();
        let d = register_health(&mut r);
        let mut c = d.create();
        let points = d.field("points").unwrap();

        points.set(&mut *c, FieldValue::Int(42)).unwrap();
        assert_eq!(points.get(&*c).unwrap(), FieldValue::Int(42));
        assert_eq!(c.downcast_ref::<Health>().unwrap().points, 42);

        // Wrong value kind.
        assert!(matches!(
            points.set(&mut *c, FieldValue::Bool(true)),
            Err(SceneError::FieldTypeMismatch { .. })
        ));

        // Wrong component type.
        let mut flare: Box<dyn Component> = Box::new(Flare::default());
        assert!(points.get(&*flare).is_err());
        assert!(points.set(&mut *flare, FieldValue::Int(1)).is_err());
    }

    #[test]
    fn plain_fields_skip_transient_and_refs() {
        let mut r = Registry::new();
        register_health(&mut r);
        let beacon = r.descriptor(Beacon::default, |d| {
            d.vec3("color", Vec3::ONE, |b| b.color, |b, v| b.color = v);
            d.string("label", "", |b| b.label.clone(), |b, v| b.label = v);
            d.reference("target", "Health", |b| b.target, |b, v| b.target = v);
        });

        let c = Beacon {
            entity: None,
            color: Vec3::new(1.0, 0.5, 0.0),
            label: "north".into(),
            target: None,
        };
        let json = beacon.write_plain_fields(&c).unwrap();
        assert_eq!(
            serde_json::Value::Object(json),
            json!({ "color": [1.0, 0.5, 0.0], "label": "north" })
        );

        let health = r.get("Health").unwrap();
        let h = Health {
            entity: None,
            points: 3,
            regen: 9.0,
        };
        let json = health.write_plain_fields(&h).unwrap();
        assert_eq!(serde_json::Value::Object(json), json!({ "points": 3 }));
    }

    #[test]
    fn copy_and_reset_fields() {
        let mut r = Registry::new();
        let d = register_health(&mut r);
        let source = Health {
            entity: None,
            points: 7,
            regen: 2.0,
        };
        let mut target: Box<dyn Component> = Box::new(Health::default());
        d.copy_fields(&source, &mut *target).unwrap();
        let copied = target.downcast_ref::<Health>().unwrap();
        assert_eq!(copied.points, 7);
        assert_eq!(copied.regen, 2.0);

        d.reset(&mut *target).unwrap();
        let reset = target.downcast_ref::<Health>().unwrap();
        assert_eq!(reset.points, 100);
        assert_eq!(reset.regen, 0.5);
    }

    #[test]
    fn re_registration_replaces() {
        let mut r = Registry::new();
        register_health(&mut r);
        r.descriptor(Health::default, |d| {
            d.add_aliases(&["Vitals"]);
            d.int("points", 1, |h| h.points, |h, v| h.points = v);
        });
        assert_eq!(r.component_names(), &["Health"]);
        assert_eq!(r.get("Health").unwrap().fields().len(), 1);
        assert_eq!(r.get("Vitals").unwrap().fields().len(), 1);
    }

    #[test]
    fn re_registration_forgets_dropped_aliases() {
        let mut r = Registry::new();
        r.descriptor(Flare::default, |d| {
            d.add_aliases(&["Signal"]);
        });
        register_health(&mut r);
        r.descriptor(Health::default, |d| {
            d.add_aliases(&["Signal"]);
        });
        assert_eq!(r.create("Signal").unwrap().component_name(), "Health");

        // Health now declares neither alias.
        r.descriptor(Health::default, |_| {});
        assert!(!r.contains("Vitals"));
        assert!(r.implementors("Vitals").is_empty());
        let names: Vec<_> = r.implementors("Signal").iter().map(|d| d.component_name()).collect();
        assert_eq!(names, vec!["Flare"]);
        assert_eq!(r.create("Signal").unwrap().component_name(), "Flare");
        assert!(!r.answers_to("Health", "Signal"));
    }

    #[test]
    fn shared_alias_lists_every_implementor() {
        let mut r = Registry::new();
        r.descriptor(Flare::default, |d| {
            d.add_aliases(&["Signal"]);
        });
        r.descriptor(Beacon::default, |d| {
            d.add_aliases(&["Signal"]);
        });

        let names: Vec<_> = r.implementors("Signal").iter().map(|d| d.component_name()).collect();
        assert_eq!(names, vec!["Flare", "Beacon"]);
        // Creation by a shared alias uses the last registration.
        assert_eq!(r.create("Signal").unwrap().component_name(), "Beacon");
        assert!(r.answers_to("Flare", "Signal"));
        assert!(!r.answers_to("Flare", "Beacon"));
    }

    #[test]
    fn alias_never_shadows_canonical_name() {
        let mut r = Registry::new();
        register_health(&mut r);
        r.descriptor(Flare::default, |d| {
            d.add_aliases(&["Health"]);
        });
        assert_eq!(r.create("Health").unwrap().component_name(), "Health");
    }

    #[test]
    fn nested_descriptors_are_registered() {
        let mut r = Registry::new();
        let outer = r.descriptor(Beacon::default, |d| {
            d.descriptor(Flare::default, |_| {});
        });
        assert_eq!(outer.nested().len(), 1);
        assert_eq!(outer.nested()[0].component_name(), "Flare");
        assert!(r.contains("Flare"));
        assert_eq!(r.component_names(), &["Flare", "Beacon"]);
    }

    #[test]
    fn global_has_builtins() {
        let registry = global();
        let r = read(&registry);
        assert!(r.contains("TransformNode"));
        assert!(r.contains("Camera"));
    }
}
