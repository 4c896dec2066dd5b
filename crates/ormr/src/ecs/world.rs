//! # World — Entity Tree, Component Slots and Paths
//!
//! The World owns every entity and component. Entities form a forest: each
//! has at most one parent, an ordered list of children with unique names, and
//! at most one component per capability name.
//!
//! ## Ownership
//!
//! ```text
//!   World ─owns─▶ EntityRecord ─owns─▶ Box<dyn Component>
//!                  │  ▲                  │
//!                  │  └── parent (id) ───┘ entity_or_null (id)
//!                  └─owns─▶ children (ids)
//! ```
//!
//! Back-references are plain [`EntityId`]s. Destroying an entity removes its
//! whole branch; stale handles simply stop resolving.
//!
//! ## Lookup
//!
//! Typed lookups (`get_component::<T>()`) compare `T::NAME` against slot
//! names and never take the registry lock. Name-based lookups resolve in
//! order: exact slot, the descriptor's canonical name, then any attached
//! component whose descriptor declares the name as an alias.

use std::collections::HashMap;

use slotmap::SlotMap;

use super::component::{Capability, Component};
use super::entity::{EntityId, EntityRecord, validate_name};
use super::path::{ComponentPath, EntityPath, PropertyPath, Segment};
use crate::config::WorldConfig;
use crate::error::{Result, SceneError};
use crate::registry::{self, FieldValue, Registry, SharedRegistry};

/// Addresses one attached component: the entity and the slot name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentKey {
    /// Owning entity.
    pub entity: EntityId,
    /// Capability slot the component occupies.
    pub name: &'static str,
}

/// Owner of an entity forest and all attached components.
pub struct World {
    pub(crate) entities: SlotMap<EntityId, EntityRecord>,
    pub(crate) registry: SharedRegistry,
    pub(crate) config: WorldConfig,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    // ── Construction ────────────────────────────────────────────────────

    /// An empty world using the process-wide registry.
    pub fn new() -> Self {
        Self::with_registry_and_config(registry::global(), WorldConfig::default())
    }

    /// An empty world using the process-wide registry and custom limits.
    pub fn with_config(config: WorldConfig) -> Self {
        Self::with_registry_and_config(registry::global(), config)
    }

    /// An empty world using its own registry.
    pub fn with_registry(registry: SharedRegistry) -> Self {
        Self::with_registry_and_config(registry, WorldConfig::default())
    }

    /// Full control over registry and limits.
    pub fn with_registry_and_config(registry: SharedRegistry, config: WorldConfig) -> Self {
        log::debug!("creating world with {config:?}");
        Self {
            entities: SlotMap::with_key(),
            registry,
            config,
        }
    }

    /// Active limits and policies.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// The registry this world creates components from.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// Register descriptors into this world's registry.
    pub fn register(&self, f: impl FnOnce(&mut Registry)) {
        f(&mut registry::write(&self.registry));
    }

    pub(crate) fn record(&self, entity: EntityId) -> Result<&EntityRecord> {
        self.entities.get(entity).ok_or(SceneError::NoSuchEntity)
    }

    pub(crate) fn record_mut(&mut self, entity: EntityId) -> Result<&mut EntityRecord> {
        self.entities.get_mut(entity).ok_or(SceneError::NoSuchEntity)
    }

    // ── Entities ────────────────────────────────────────────────────────

    /// Create a new root entity.
    pub fn spawn(&mut self, name: &str) -> EntityId {
        let id = self.entities.insert(EntityRecord::new(name));
        log::trace!("spawned entity `{name}` ({id:?})");
        id
    }

    /// Whether the handle refers to a live entity.
    pub fn contains(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Entity name.
    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.entities.get(entity).map(|r| r.name.as_str())
    }

    /// Rename an entity. Fails if a sibling already uses the name.
    pub fn set_name(&mut self, entity: EntityId, name: &str) -> Result<()> {
        let record = self.record(entity)?;
        if record.name == name {
            return Ok(());
        }
        if let Some(parent) = record.parent {
            validate_name(name)?;
            if self.child_by_name(parent, name).is_some() {
                return Err(SceneError::DuplicateChildName {
                    parent: self.path(parent),
                    name: name.to_string(),
                });
            }
        }
        self.record_mut(entity)?.name = name.to_string();
        Ok(())
    }

    /// Parent entity, `None` for roots.
    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.entities.get(entity)?.parent
    }

    /// Children in insertion order.
    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        self.entities
            .get(entity)
            .map(|r| r.children.as_slice())
            .unwrap_or(&[])
    }

    /// All entities without a parent.
    pub fn roots(&self) -> Vec<EntityId> {
        self.entities
            .iter()
            .filter(|(_, r)| r.parent.is_none())
            .map(|(id, _)| id)
            .collect()
    }

    /// Topmost ancestor (the entity itself if it is a root).
    pub fn root_of(&self, entity: EntityId) -> EntityId {
        let mut current = entity;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether `ancestor` is `entity` or one of its ancestors.
    pub fn is_ancestor_or_self(&self, ancestor: EntityId, entity: EntityId) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Direct child with this name.
    pub fn child_by_name(&self, entity: EntityId, name: &str) -> Option<EntityId> {
        self.children(entity)
            .iter()
            .copied()
            .find(|&c| self.name(c) == Some(name))
    }

    /// Get the child named `name`, creating it if absent.
    pub fn entity(&mut self, parent: EntityId, name: &str) -> Result<EntityId> {
        self.record(parent)?;
        if let Some(child) = self.child_by_name(parent, name) {
            return Ok(child);
        }
        validate_name(name)?;
        let child = self.spawn(name);
        self.link(parent, child)?;
        Ok(child)
    }

    /// Create a child, renaming it with a numeric suffix if the name is taken.
    pub fn spawn_child(&mut self, parent: EntityId, name: &str) -> Result<EntityId> {
        self.record(parent)?;
        validate_name(name)?;
        let name = self.make_child_name(parent, name);
        let child = self.spawn(&name);
        self.link(parent, child)?;
        Ok(child)
    }

    /// Move `child` (and its branch) under `parent`.
    ///
    /// Fails on duplicate sibling names and when `parent` lies inside
    /// `child`'s branch.
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        self.record(parent)?;
        let record = self.record(child)?;
        if record.parent == Some(parent) {
            return Ok(());
        }
        validate_name(&record.name)?;
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::CyclicHierarchy { path: self.path(child) });
        }
        if self.child_by_name(parent, &record.name).is_some() {
            return Err(SceneError::DuplicateChildName {
                parent: self.path(parent),
                name: record.name.clone(),
            });
        }
        let old = self.unlink(child);
        self.link(parent, child)?;
        self.notify_parent_changed(child, old, Some(parent));
        Ok(())
    }

    /// Like [`add_child`](Self::add_child), but renames the child with a
    /// numeric suffix instead of failing on a duplicate name.
    pub fn add_child_with_corrected_name(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        let name = self.record(child)?.name.clone();
        if self.parent(child) != Some(parent) {
            let corrected = self.make_child_name(parent, &name);
            if corrected != name {
                log::debug!("renaming `{name}` to `{corrected}` under `{}`", self.path(parent));
                self.record_mut(child)?.name = corrected;
            }
        }
        self.add_child(parent, child)
    }

    /// A name not yet used by any child of `parent`: `name` itself if free,
    /// otherwise `name_1`, `name_2`, … (incrementing an existing numeric
    /// suffix).
    pub fn make_child_name(&self, parent: EntityId, name: &str) -> String {
        if self.child_by_name(parent, name).is_none() {
            return name.to_string();
        }
        let (prefix, mut n) = match name.rsplit_once('_') {
            Some((prefix, digits))
                if !prefix.is_empty() && !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) =>
            {
                (prefix, digits.parse::<u64>().map_or(1, |d| d.saturating_add(1)))
            }
            _ => (name, 1),
        };
        loop {
            let candidate = format!("{prefix}_{n}");
            if self.child_by_name(parent, &candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Detach `child` from `parent`; it becomes a root.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        if self.parent(child) != Some(parent) {
            return Err(SceneError::NoSuchEntity);
        }
        self.unlink(child);
        self.notify_parent_changed(child, Some(parent), None);
        self.request_transform_update(child, true);
        Ok(())
    }

    /// Destroy an entity and its whole branch. Every component's teardown
    /// hook runs. Returns `false` for a stale handle.
    pub fn destroy(&mut self, entity: EntityId) -> bool {
        if !self.contains(entity) {
            return false;
        }
        self.unlink(entity);
        let branch = self.branch(entity);
        for id in &branch {
            if let Some(mut record) = self.entities.remove(*id) {
                for component in &mut record.components {
                    component.destroy();
                    component.set_entity_or_null(None);
                }
            }
        }
        log::trace!("destroyed {} entities", branch.len());
        true
    }

    /// Remove every entity.
    pub fn clear(&mut self) {
        for root in self.roots() {
            self.destroy(root);
        }
    }

    /// `entity` and all its descendants, parents before children.
    pub fn branch(&self, entity: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        if !self.contains(entity) {
            return out;
        }
        let mut stack = vec![entity];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Visit `entity` and its descendants, parents first.
    pub fn for_each_entity_in_branch(&self, entity: EntityId, mut f: impl FnMut(EntityId)) {
        for id in self.branch(entity) {
            f(id);
        }
    }

    /// First descendant (not `entity` itself) with this name, breadth-first.
    pub fn find_entity_by_name(&self, entity: EntityId, name: &str) -> Option<EntityId> {
        let mut queue: std::collections::VecDeque<EntityId> = self.children(entity).iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if self.name(id) == Some(name) {
                return Some(id);
            }
            queue.extend(self.children(id).iter().copied());
        }
        None
    }

    /// Whether scene serialization writes this entity.
    pub fn is_serialized(&self, entity: EntityId) -> bool {
        self.entities.get(entity).is_some_and(|r| r.serialize)
    }

    /// Exclude (or re-include) an entity and its branch from serialization.
    pub fn set_serialized(&mut self, entity: EntityId, serialize: bool) -> Result<()> {
        self.record_mut(entity)?.serialize = serialize;
        Ok(())
    }

    /// Attach a parentless `child` under `parent` and notify the parent's
    /// and ancestors' components.
    fn link(&mut self, parent: EntityId, child: EntityId) -> Result<()> {
        self.record_mut(parent)?.children.push(child);
        self.record_mut(child)?.parent = Some(parent);
        self.request_transform_update(child, true);
        self.notify_entity_added(child);
        Ok(())
    }

    /// Detach `child` from its parent, returning the former parent.
    fn unlink(&mut self, child: EntityId) -> Option<EntityId> {
        let parent = self.entities.get_mut(child).and_then(|r| r.parent.take())?;
        if let Some(record) = self.entities.get_mut(parent) {
            record.children.retain(|&c| c != child);
        }
        Some(parent)
    }

    // ── Notifications ───────────────────────────────────────────────────

    /// Run `f` over `observer`'s components while they are lifted out of
    /// the record, so `f` can read the rest of the world.
    fn with_components_taken(&mut self, observer: EntityId, f: impl FnOnce(&World, &mut [Box<dyn Component>])) {
        let Some(mut components) = self
            .entities
            .get_mut(observer)
            .map(|r| std::mem::take(&mut r.components))
        else {
            return;
        };
        f(self, &mut components);
        if let Some(record) = self.entities.get_mut(observer) {
            record.components = components;
        }
    }

    fn notify_parent_changed(&mut self, entity: EntityId, old: Option<EntityId>, new: Option<EntityId>) {
        if let Some(record) = self.entities.get_mut(entity) {
            for component in &mut record.components {
                component.parent_changed(old, new);
            }
        }
    }

    /// `child` (with its branch) was just linked under its parent.
    fn notify_entity_added(&mut self, child: EntityId) {
        let Some(parent) = self.parent(child) else {
            return;
        };
        self.with_components_taken(parent, |world, observers| {
            for observer in observers.iter_mut() {
                observer.added_entity(child);
                for component in world.components(child) {
                    observer.added_component_to_child_entity(child, component);
                }
            }
        });

        let branch = self.branch(child);
        let mut current = child;
        while let Some(ancestor) = self.parent(current) {
            self.with_components_taken(ancestor, |world, observers| {
                for observer in observers.iter_mut() {
                    observer.added_entity_to_branch(child);
                    for &id in &branch {
                        for component in world.components(id) {
                            observer.added_component_to_branch(id, component);
                        }
                    }
                }
            });
            current = ancestor;
        }
    }

    /// The component at `index` was just attached to `entity`.
    fn notify_component_added(&mut self, entity: EntityId, index: usize) {
        if let Some(record) = self.entities.get_mut(entity) {
            let (before, rest) = record.components.split_at_mut(index);
            if let Some((added, after)) = rest.split_first_mut() {
                for sibling in before.iter_mut().chain(after.iter_mut()) {
                    sibling.added_sibling_component(&**added);
                    added.added_sibling_component(&**sibling);
                }
            }
        }

        let mut current = entity;
        while let Some(ancestor) = self.parent(current) {
            let direct = current == entity;
            self.with_components_taken(ancestor, |world, observers| {
                let Some(component) = world.entities.get(entity).and_then(|r| r.components.get(index)) else {
                    return;
                };
                for observer in observers.iter_mut() {
                    if direct {
                        observer.added_component_to_child_entity(entity, &**component);
                    }
                    observer.added_component_to_branch(entity, &**component);
                }
            });
            current = ancestor;
        }
    }

    // ── Components ──────────────────────────────────────────────────────

    /// Attach a component under its capability name.
    ///
    /// If the slot is occupied, the previous component is torn down,
    /// detached and returned. Missing required siblings are created from
    /// the registry afterwards.
    pub fn add_component(
        &mut self,
        entity: EntityId,
        component: Box<dyn Component>,
    ) -> Result<Option<Box<dyn Component>>> {
        self.attach(entity, component, 0)
    }

    /// Typed [`add_component`](Self::add_component).
    pub fn insert<T: Component>(&mut self, entity: EntityId, component: T) -> Result<Option<Box<dyn Component>>> {
        self.add_component(entity, Box::new(component))
    }

    fn attach(
        &mut self,
        entity: EntityId,
        mut component: Box<dyn Component>,
        depth: usize,
    ) -> Result<Option<Box<dyn Component>>> {
        let record = self.record_mut(entity)?;
        let name = component.component_name();
        let required = component.required_siblings();

        let (index, replaced) = match record.slot(name) {
            Some(index) => {
                let mut old = std::mem::replace(&mut record.components[index], component);
                old.destroy();
                old.set_entity_or_null(None);
                log::debug!("replaced `{name}` on `{}`", record.name);
                record.components[index].set_entity_or_null(Some(entity));
                (index, Some(old))
            }
            None => {
                component.set_entity_or_null(Some(entity));
                record.components.push(component);
                (record.components.len() - 1, None)
            }
        };
        self.notify_component_added(entity, index);

        for sibling in required {
            self.ensure_component(entity, sibling, depth + 1)?;
        }
        Ok(replaced)
    }

    /// Index of the component answering to `name`, creating it (and its
    /// required siblings) from the registry if absent.
    pub(crate) fn ensure_component(&mut self, entity: EntityId, name: &str, depth: usize) -> Result<usize> {
        if let Some(index) = self.find_slot(entity, name)? {
            return Ok(index);
        }
        if depth > self.config.max_composition_depth {
            return Err(SceneError::CyclicComposition {
                name: name.to_string(),
                depth,
            });
        }
        let created = registry::read(&self.registry).create(name)?;
        let slot = created.component_name();
        log::trace!("creating `{name}` on `{}`", self.path(entity));
        self.attach(entity, created, depth)?;
        self.record(entity)?
            .slot(slot)
            .ok_or_else(|| SceneError::unknown_capability(name))
    }

    fn find_slot(&self, entity: EntityId, name: &str) -> Result<Option<usize>> {
        let record = self.record(entity)?;
        if let Some(index) = record.slot(name) {
            return Ok(Some(index));
        }
        let registry = registry::read(&self.registry);
        if let Some(index) = registry.get(name).and_then(|d| record.slot(d.component_name())) {
            return Ok(Some(index));
        }
        Ok(record
            .components
            .iter()
            .position(|c| registry.answers_to(c.component_name(), name)))
    }

    /// Detach and return the component answering to `name`. Its teardown
    /// hook runs first.
    pub fn remove_component(&mut self, entity: EntityId, name: &str) -> Option<Box<dyn Component>> {
        let index = self.find_slot(entity, name).ok()??;
        let mut component = self.entities.get_mut(entity)?.components.remove(index);
        component.destroy();
        component.set_entity_or_null(None);
        Some(component)
    }

    /// Typed [`remove_component`](Self::remove_component).
    pub fn remove<T: Capability>(&mut self, entity: EntityId) -> Option<Box<dyn Component>> {
        self.remove_component(entity, T::NAME)
    }

    /// The component of type `T`, if attached.
    pub fn get_component<T: Capability>(&self, entity: EntityId) -> Option<&T> {
        let record = self.entities.get(entity)?;
        record.components[record.slot(T::NAME)?].downcast_ref::<T>()
    }

    /// Mutable [`get_component`](Self::get_component).
    pub fn get_component_mut<T: Capability>(&mut self, entity: EntityId) -> Option<&mut T> {
        let record = self.entities.get_mut(entity)?;
        let index = record.slot(T::NAME)?;
        record.components[index].downcast_mut::<T>()
    }

    /// The component of type `T`, created from the registry if absent.
    ///
    /// Fails with [`SceneError::UnknownCapability`] if `T` has no descriptor.
    pub fn component<T: Capability>(&mut self, entity: EntityId) -> Result<&mut T> {
        let index = match self.record(entity)?.slot(T::NAME) {
            Some(index) => index,
            None => self.ensure_component(entity, T::NAME, 0)?,
        };
        self.record_mut(entity)?.components[index]
            .downcast_mut::<T>()
            .ok_or_else(|| SceneError::CapabilityTypeMismatch {
                name: T::NAME.to_string(),
            })
    }

    /// Whether a component of type `T` is attached.
    pub fn has<T: Capability>(&self, entity: EntityId) -> bool {
        self.entities.get(entity).is_some_and(|r| r.slot(T::NAME).is_some())
    }

    /// The component answering to `name` (canonical name or alias).
    pub fn get_component_by_name(&self, entity: EntityId, name: &str) -> Option<&dyn Component> {
        let index = self.find_slot(entity, name).ok()??;
        Some(&*self.entities.get(entity)?.components[index])
    }

    /// Mutable [`get_component_by_name`](Self::get_component_by_name).
    pub fn get_component_by_name_mut(&mut self, entity: EntityId, name: &str) -> Option<&mut dyn Component> {
        let index = self.find_slot(entity, name).ok()??;
        Some(&mut *self.entities.get_mut(entity)?.components[index])
    }

    /// The component answering to `name`, created from the registry if absent.
    pub fn component_by_name(&mut self, entity: EntityId, name: &str) -> Result<&mut dyn Component> {
        let index = self.ensure_component(entity, name, 0)?;
        Ok(&mut *self.record_mut(entity)?.components[index])
    }

    /// Whether a component answering to `name` is attached.
    pub fn has_component(&self, entity: EntityId, name: &str) -> bool {
        matches!(self.find_slot(entity, name), Ok(Some(_)))
    }

    /// Look up by key.
    pub fn get(&self, key: ComponentKey) -> Option<&dyn Component> {
        let record = self.entities.get(key.entity)?;
        Some(&*record.components[record.slot(key.name)?])
    }

    /// Mutable [`get`](Self::get).
    pub fn get_mut(&mut self, key: ComponentKey) -> Option<&mut dyn Component> {
        let record = self.entities.get_mut(key.entity)?;
        let index = record.slot(key.name)?;
        Some(&mut *record.components[index])
    }

    /// Attached components in attachment order.
    pub fn components(&self, entity: EntityId) -> impl Iterator<Item = &dyn Component> + '_ {
        self.entities
            .get(entity)
            .into_iter()
            .flat_map(|r| r.components.iter().map(|c| &**c))
    }

    /// Capability names of the attached components.
    pub fn component_names(&self, entity: EntityId) -> Vec<&'static str> {
        self.components(entity).map(|c| c.component_name()).collect()
    }

    /// Visit every component in `entity`'s branch, parents first.
    pub fn for_each_component_in_branch(&self, entity: EntityId, mut f: impl FnMut(EntityId, &dyn Component)) {
        for id in self.branch(entity) {
            for component in self.components(id) {
                f(id, component);
            }
        }
    }

    /// Copy `source`'s branch into a new root named `name`.
    ///
    /// References pointing inside the copied branch are redirected to the
    /// copies; references pointing outside keep their targets.
    pub fn copy_deep(&mut self, source: EntityId, name: &str) -> Result<EntityId> {
        self.record(source)?;
        let copy = self.spawn(name);
        let mut mapping = HashMap::from([(source, copy)]);
        let mut pending = vec![(source, copy)];
        while let Some((from, to)) = pending.pop() {
            for child in self.children(from).to_vec() {
                let child_name = self.record(child)?.name.clone();
                let child_copy = self.spawn(&child_name);
                self.link(to, child_copy)?;
                self.record_mut(child_copy)?.serialize = self.record(child)?.serialize;
                mapping.insert(child, child_copy);
                pending.push((child, child_copy));
            }
        }

        for (&from, &to) in &mapping {
            for name in self.component_names(from) {
                if !registry::read(&self.registry).contains(name) {
                    log::warn!("copy of `{}` skips unregistered component `{name}`", self.path(from));
                    continue;
                }
                let index = self.ensure_component(to, name, 0)?;
                let values = {
                    let registry = registry::read(&self.registry);
                    let Some(descriptor) = registry.get(name) else {
                        continue;
                    };
                    let source = self.record(from)?;
                    let component = &*source.components[source.slot(name).ok_or(SceneError::NoSuchEntity)?];
                    descriptor
                        .fields()
                        .iter()
                        .enumerate()
                        .map(|(i, field)| {
                            field.get(component).map(|value| match value {
                                FieldValue::Ref(Some(target)) => {
                                    (i, FieldValue::Ref(Some(*mapping.get(&target).unwrap_or(&target))))
                                }
                                other => (i, other),
                            })
                        })
                        .collect::<Result<Vec<_>>>()?
                };
                let registry = registry::read(&self.registry);
                let Some(descriptor) = registry.get(name) else {
                    continue;
                };
                let target = &mut *self
                    .entities
                    .get_mut(to)
                    .ok_or(SceneError::NoSuchEntity)?
                    .components[index];
                for (i, value) in values {
                    descriptor.fields()[i].set(target, value)?;
                }
            }
        }
        self.request_transform_update(copy, true);
        Ok(copy)
    }

    // ── Paths ───────────────────────────────────────────────────────────

    /// Path from the root: child names joined by `/`. Roots have the empty
    /// path.
    pub fn path(&self, entity: EntityId) -> String {
        let mut names = Vec::new();
        let mut current = entity;
        while let Some(record) = self.entities.get(current) {
            let Some(parent) = record.parent else { break };
            names.push(record.name.as_str());
            current = parent;
        }
        names.reverse();
        names.join("/")
    }

    /// `path(entity) + ":" + name`.
    pub fn component_path(&self, entity: EntityId, name: &str) -> String {
        format!("{}:{name}", self.path(entity))
    }

    /// Path of the component behind `key`.
    pub fn key_path(&self, key: ComponentKey) -> String {
        self.component_path(key.entity, key.name)
    }

    /// Resolve an entity path without creating anything.
    pub fn entity_by_path(&self, entity: EntityId, path: &str) -> Option<EntityId> {
        let parsed = EntityPath::parse(path).ok()?;
        self.resolve(entity, &parsed)
    }

    /// Resolve an entity path, creating missing entities along the way.
    pub fn make_path(&mut self, entity: EntityId, path: &str) -> Result<EntityId> {
        let parsed = EntityPath::parse(path)?;
        self.make(entity, &parsed, path)
    }

    /// A path that leads from `from` to `to`, using `..` to climb. `None` if
    /// they are in different trees.
    pub fn relative_path(&self, from: EntityId, to: EntityId) -> Option<String> {
        if !self.contains(from) || !self.contains(to) {
            return None;
        }
        let from_chain = self.ancestors(from);
        let to_chain = self.ancestors(to);
        let up = from_chain.iter().position(|e| to_chain.contains(e))?;
        let common = from_chain[up];
        let down = to_chain.iter().position(|&e| e == common)?;

        let mut parts: Vec<&str> = vec![super::entity::TO_PARENT; up];
        parts.extend(to_chain[..down].iter().rev().filter_map(|&e| self.name(e)));
        if parts.is_empty() {
            Some(super::entity::TO_SELF.to_string())
        } else {
            Some(parts.join("/"))
        }
    }

    /// Resolve `entity/path:Capability`, creating missing entities and the
    /// component.
    pub fn make_path_to_component(&mut self, entity: EntityId, path: &str) -> Result<ComponentKey> {
        let parsed = ComponentPath::parse(path)?;
        let target = self.make(entity, &parsed.entity, path)?;
        let index = self.ensure_component(target, parsed.capability, 0)?;
        let name = self.record(target)?.components[index].component_name();
        Ok(ComponentKey { entity: target, name })
    }

    /// Resolve `entity/path:Capability` without creating anything.
    pub fn component_by_path(&self, entity: EntityId, path: &str) -> Option<&dyn Component> {
        let parsed = ComponentPath::parse(path).ok()?;
        let target = self.resolve(entity, &parsed.entity)?;
        self.get_component_by_name(target, parsed.capability)
    }

    /// Read `entity/path:Capability.field`.
    pub fn property(&self, entity: EntityId, path: &str) -> Result<FieldValue> {
        let parsed = PropertyPath::parse(path)?;
        let target = self
            .resolve(entity, &parsed.component.entity)
            .ok_or(SceneError::NoSuchEntity)?;
        let component = self
            .get_component_by_name(target, parsed.component.capability)
            .ok_or_else(|| SceneError::unknown_capability(parsed.component.capability))?;
        let registry = registry::read(&self.registry);
        let descriptor = registry
            .get(component.component_name())
            .ok_or_else(|| SceneError::unknown_capability(component.component_name()))?;
        let field = descriptor
            .field(parsed.field)
            .ok_or_else(|| SceneError::UnknownField {
                component: component.component_name().to_string(),
                field: parsed.field.to_string(),
            })?;
        field.get(component)
    }

    /// Write `entity/path:Capability.field`, creating the entity path and
    /// component if needed.
    pub fn set_property(&mut self, entity: EntityId, path: &str, value: FieldValue) -> Result<()> {
        let parsed = PropertyPath::parse(path)?;
        let target = self.make(entity, &parsed.component.entity, path)?;
        let index = self.ensure_component(target, parsed.component.capability, 0)?;

        let dirty = {
            let registry = registry::read(&self.registry);
            let component = &mut *self
                .entities
                .get_mut(target)
                .ok_or(SceneError::NoSuchEntity)?
                .components[index];
            let name = component.component_name();
            let descriptor = registry
                .get(name)
                .ok_or_else(|| SceneError::unknown_capability(name))?;
            let field = descriptor.field(parsed.field).ok_or_else(|| SceneError::UnknownField {
                component: name.to_string(),
                field: parsed.field.to_string(),
            })?;
            field.set(component, value)?;
            component
                .as_transform()
                .is_some_and(|node| node.is_transform_update_requested())
        };
        if dirty {
            self.request_transform_update(target, true);
        }
        Ok(())
    }

    /// `entity`, its parent, …, its root.
    fn ancestors(&self, entity: EntityId) -> Vec<EntityId> {
        let mut chain = vec![entity];
        let mut current = entity;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    fn resolve(&self, entity: EntityId, path: &EntityPath<'_>) -> Option<EntityId> {
        let mut current = if path.absolute { self.root_of(entity) } else { entity };
        self.record(current).ok()?;
        for segment in &path.segments {
            current = match *segment {
                Segment::Current => current,
                Segment::Parent => self.parent(current)?,
                Segment::Child(name) => self.child_by_name(current, name)?,
            };
        }
        Some(current)
    }

    fn make(&mut self, entity: EntityId, path: &EntityPath<'_>, full: &str) -> Result<EntityId> {
        self.record(entity)?;
        let mut current = if path.absolute { self.root_of(entity) } else { entity };
        for segment in &path.segments {
            current = match *segment {
                Segment::Current => current,
                Segment::Parent => self
                    .parent(current)
                    .ok_or_else(|| SceneError::malformed(full, "path climbs above the root"))?,
                Segment::Child(name) => self.entity(current, name)?,
            };
        }
        Ok(current)
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Camera, TransformNode};
    use std::sync::{Arc, Mutex};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Health {
        entity: Option<EntityId>,
        points: i32,
    }

    crate::impl_component!(Health, "Health");

    #[derive(Default)]
    struct Armor {
        entity: Option<EntityId>,
    }

    crate::impl_component!(Armor, "Armor", requires = ["Health"]);

    /// Counts teardown calls.
    #[derive(Default)]
    struct Tracked {
        entity: Option<EntityId>,
        torn_down: Arc<AtomicUsize>,
    }

    impl Capability for Tracked {
        const NAME: &'static str = "Tracked";
    }

    impl Component for Tracked {
        fn component_name(&self) -> &'static str {
            "Tracked"
        }
        fn entity_or_null(&self) -> Option<EntityId> {
            self.entity
        }
        fn set_entity_or_null(&mut self, entity: Option<EntityId>) {
            self.entity = entity;
        }
        fn destroy(&mut self) {
            self.torn_down.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Occupies a slot named differently from the capability it is created
    /// under, and requires that capability: creation never settles.
    #[derive(Default)]
    struct Echo {
        entity: Option<EntityId>,
    }

    impl Capability for Echo {
        const NAME: &'static str = "Ping";
    }

    impl Component for Echo {
        fn component_name(&self) -> &'static str {
            "Echo"
        }
        fn entity_or_null(&self) -> Option<EntityId> {
            self.entity
        }
        fn set_entity_or_null(&mut self, entity: Option<EntityId>) {
            self.entity = entity;
        }
        fn required_siblings(&self) -> &'static [&'static str] {
            &["Ping"]
        }
    }

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Parent(Option<EntityId>, Option<EntityId>),
        Sibling(&'static str),
        ChildEntity(EntityId),
        BranchEntity(EntityId),
        ChildComponent(EntityId, &'static str),
        BranchComponent(EntityId, &'static str),
    }

    type Log = Arc<Mutex<Vec<Event>>>;

    /// Writes every notification it receives to a shared log.
    #[derive(Default)]
    struct Recorder {
        entity: Option<EntityId>,
        log: Log,
    }

    impl Recorder {
        fn push(&self, event: Event) {
            self.log.lock().unwrap().push(event);
        }
    }

    impl Capability for Recorder {
        const NAME: &'static str = "Recorder";
    }

    impl Component for Recorder {
        fn component_name(&self) -> &'static str {
            "Recorder"
        }
        fn entity_or_null(&self) -> Option<EntityId> {
            self.entity
        }
        fn set_entity_or_null(&mut self, entity: Option<EntityId>) {
            self.entity = entity;
        }
        fn parent_changed(&mut self, old: Option<EntityId>, new: Option<EntityId>) {
            self.push(Event::Parent(old, new));
        }
        fn added_sibling_component(&mut self, component: &dyn Component) {
            self.push(Event::Sibling(component.component_name()));
        }
        fn added_component_to_child_entity(&mut self, child: EntityId, component: &dyn Component) {
            self.push(Event::ChildComponent(child, component.component_name()));
        }
        fn added_component_to_branch(&mut self, entity: EntityId, component: &dyn Component) {
            self.push(Event::BranchComponent(entity, component.component_name()));
        }
        fn added_entity(&mut self, child: EntityId) {
            self.push(Event::ChildEntity(child));
        }
        fn added_entity_to_branch(&mut self, entity: EntityId) {
            self.push(Event::BranchEntity(entity));
        }
    }

    fn recorder(log: &Log) -> Recorder {
        Recorder {
            entity: None,
            log: Arc::clone(log),
        }
    }

    fn drain(log: &Log) -> Vec<Event> {
        std::mem::take(&mut *log.lock().unwrap())
    }

    fn test_world() -> World {
        let mut registry = Registry::new();
        registry.descriptor(Health::default, |d| {
            d.add_aliases(&["Vitals"]);
            d.int("points", 100, |h| h.points, |h, v| h.points = v);
        });
        registry.descriptor(Armor::default, |_| {});
        registry.descriptor(Echo::default, |_| {});
        World::with_registry(registry.into_shared())
    }

    // ── Tree ──

    #[test]
    fn spawn_and_children() {
        let mut world = test_world();
        let root = world.spawn("root");
        let a = world.entity(root, "a").unwrap();
        let b = world.entity(a, "b").unwrap();

        assert_eq!(world.children(root), &[a]);
        assert_eq!(world.parent(b), Some(a));
        assert_eq!(world.root_of(b), root);
        assert_eq!(world.entity(root, "a").unwrap(), a, "get-or-create reuses");
        assert_eq!(world.entity_count(), 3);
        assert_eq!(world.roots(), vec![root]);
    }

    #[test]
    fn duplicate_child_names_are_rejected() {
        let mut world = test_world();
        let root = world.spawn("root");
        world.entity(root, "a").unwrap();
        let stray = world.spawn("a");
        assert!(matches!(
            world.add_child(root, stray),
            Err(SceneError::DuplicateChildName { .. })
        ));
        // The corrected variant renames instead.
        world.add_child_with_corrected_name(root, stray).unwrap();
        assert_eq!(world.name(stray), Some("a_1"));
    }

    #[test]
    fn make_child_name_increments_suffix() {
        let mut world = test_world();
        let root = world.spawn("root");
        assert_eq!(world.make_child_name(root, "wheel"), "wheel");
        world.entity(root, "wheel").unwrap();
        assert_eq!(world.make_child_name(root, "wheel"), "wheel_1");
        world.entity(root, "wheel_1").unwrap();
        assert_eq!(world.make_child_name(root, "wheel"), "wheel_2");
        assert_eq!(world.make_child_name(root, "wheel_1"), "wheel_2");
        let spawned = world.spawn_child(root, "wheel").unwrap();
        assert_eq!(world.name(spawned), Some("wheel_2"));
    }

    #[test]
    fn reparenting_into_own_branch_fails() {
        let mut world = test_world();
        let root = world.spawn("root");
        let a = world.entity(root, "a").unwrap();
        let b = world.entity(a, "b").unwrap();
        assert!(matches!(
            world.add_child(b, a),
            Err(SceneError::CyclicHierarchy { .. })
        ));
        assert!(matches!(
            world.add_child(a, a),
            Err(SceneError::CyclicHierarchy { .. })
        ));
    }

    #[test]
    fn reparent_moves_branch() {
        let mut world = test_world();
        let root = world.spawn("root");
        let a = world.entity(root, "a").unwrap();
        let b = world.entity(root, "b").unwrap();
        let leaf = world.entity(a, "leaf").unwrap();

        world.add_child(b, leaf).unwrap();
        assert!(world.children(a).is_empty());
        assert_eq!(world.path(leaf), "b/leaf");

        world.remove_child(b, leaf).unwrap();
        assert_eq!(world.parent(leaf), None);
        assert!(world.roots().contains(&leaf));
    }

    #[test]
    fn set_name_checks_siblings() {
        let mut world = test_world();
        let root = world.spawn("root");
        let a = world.entity(root, "a").unwrap();
        world.entity(root, "b").unwrap();
        assert!(world.set_name(a, "b").is_err());
        assert!(matches!(world.set_name(a, "x/y"), Err(SceneError::InvalidName(_))));
        world.set_name(a, "c").unwrap();
        assert_eq!(world.child_by_name(root, "c"), Some(a));
        // Roots are free to take any name.
        world.set_name(root, "").unwrap();
    }

    #[test]
    fn destroy_removes_branch_and_tears_down() {
        let mut world = test_world();
        let root = world.spawn("root");
        let a = world.entity(root, "a").unwrap();
        let b = world.entity(a, "b").unwrap();
        let counter = Arc::new(AtomicUsize::new(0));
        world
            .insert(b, Tracked { entity: None, torn_down: counter.clone() })
            .unwrap();

        assert!(world.destroy(a));
        assert!(!world.contains(a));
        assert!(!world.contains(b));
        assert!(world.children(root).is_empty());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!world.destroy(a), "stale handle");
    }

    #[test]
    fn find_by_name_searches_descendants() {
        let mut world = test_world();
        let root = world.spawn("target");
        let a = world.entity(root, "a").unwrap();
        let deep = world.entity(a, "target").unwrap();
        assert_eq!(world.find_entity_by_name(root, "target"), Some(deep));
        assert_eq!(world.find_entity_by_name(root, "missing"), None);
        assert_eq!(world.branch(root), vec![root, a, deep]);
    }

    // ── Components ──

    #[test]
    fn single_slot_replace_detaches_old() {
        let mut world = test_world();
        let e = world.spawn("e");
        let counter = Arc::new(AtomicUsize::new(0));
        world
            .insert(e, Tracked { entity: None, torn_down: counter.clone() })
            .unwrap();

        let old = world
            .insert(e, Tracked { entity: None, torn_down: counter.clone() })
            .unwrap()
            .expect("old component returned");
        assert!(old.entity_or_null().is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(world.component_names(e), vec!["Tracked"]);
        assert_eq!(world.get_component::<Tracked>(e).unwrap().entity, Some(e));
    }

    #[test]
    fn required_siblings_are_created() {
        let mut world = test_world();
        let e = world.spawn("e");
        world.insert(e, Armor::default()).unwrap();
        assert!(world.has::<Health>(e));
        assert_eq!(world.component_names(e), vec!["Armor", "Health"]);
        assert_eq!(world.get_component::<Health>(e).unwrap().entity, Some(e));
    }

    #[test]
    fn component_get_or_create() {
        let mut world = test_world();
        let e = world.spawn("e");
        world.component::<Health>(e).unwrap().points = 5;
        assert_eq!(world.component::<Health>(e).unwrap().points, 5);
        assert_eq!(world.component_names(e).len(), 1);
    }

    #[test]
    fn unregistered_component_is_unknown() {
        let mut world = test_world();
        let e = world.spawn("e");
        assert!(matches!(
            world.component::<Tracked>(e),
            Err(SceneError::UnknownCapability { name }) if name == "Tracked"
        ));
        assert!(world.get_component::<Tracked>(e).is_none());
        assert!(world.component_by_name(e, "Teleporter").is_err());
        assert!(world.get_component_by_name(e, "Teleporter").is_none());
        assert!(world.component_names(e).is_empty());
    }

    #[test]
    fn lookup_by_alias() {
        let mut world = test_world();
        let e = world.spawn("e");
        world.component_by_name(e, "Vitals").unwrap();
        assert!(world.has::<Health>(e));
        assert!(world.has_component(e, "Vitals"));
        assert_eq!(
            world.get_component_by_name(e, "Vitals").map(|c| c.component_name()),
            Some("Health")
        );
        assert!(world.remove_component(e, "Vitals").is_some());
        assert!(!world.has::<Health>(e));
    }

    #[test]
    fn cyclic_composition_is_bounded() {
        let mut world = test_world();
        let e = world.spawn("e");
        assert!(matches!(
            world.component_by_name(e, "Ping"),
            Err(SceneError::CyclicComposition { .. })
        ));
    }

    #[test]
    fn stale_handles_fail_cleanly() {
        let mut world = test_world();
        let e = world.spawn("e");
        world.destroy(e);
        assert!(matches!(world.insert(e, Health::default()), Err(SceneError::NoSuchEntity)));
        assert!(world.get_component::<Health>(e).is_none());
        assert_eq!(world.path(e), "");
    }

    // ── Paths ──

    #[test]
    fn component_path_round_trip() {
        let mut world = World::new();
        let root = world.spawn("scene");
        let key = world.make_path_to_component(root, "a/b:TransformNode").unwrap();
        assert_eq!(world.key_path(key), "a/b:TransformNode");
        assert!(world.get(key).unwrap().is::<TransformNode>());

        let a = world.child_by_name(root, "a").unwrap();
        assert_eq!(world.path(a), "a");
        assert!(world.get_component::<TransformNode>(a).is_none(), "intermediate entities stay bare");

        // Resolving again finds the same component.
        let again = world.make_path_to_component(root, "a/b:TransformNode").unwrap();
        assert_eq!(again, key);
    }

    #[test]
    fn relative_and_absolute_segments() {
        let mut world = World::new();
        let root = world.spawn("scene");
        let a = world.make_path(root, "a").unwrap();
        let b = world.make_path(root, "b").unwrap();

        let key = world.make_path_to_component(a, "../b:TransformNode").unwrap();
        assert_eq!(key.entity, b);
        let key = world.make_path_to_component(a, "/b/.:Camera").unwrap();
        assert_eq!(key.entity, b);
        let key = world.make_path_to_component(a, ":Camera").unwrap();
        assert_eq!(key.entity, a);
        assert!(world.has::<Camera>(a));
    }

    #[test]
    fn malformed_paths_create_nothing() {
        let mut world = World::new();
        let root = world.spawn("scene");
        for bad in ["a/b", "a/b:", "a//b:TransformNode"] {
            assert!(matches!(
                world.make_path_to_component(root, bad),
                Err(SceneError::MalformedPath { .. })
            ));
        }
        assert!(world.children(root).is_empty());
        assert!(matches!(
            world.make_path_to_component(root, "..:TransformNode"),
            Err(SceneError::MalformedPath { .. })
        ));
    }

    #[test]
    fn relative_path_between_entities() {
        let mut world = test_world();
        let root = world.spawn("root");
        let ab = world.make_path(root, "a/b").unwrap();
        let ac = world.make_path(root, "a/c/d").unwrap();
        let a = world.parent(ab).unwrap();

        assert_eq!(world.relative_path(ab, ac).as_deref(), Some("../c/d"));
        assert_eq!(world.relative_path(a, ab).as_deref(), Some("b"));
        assert_eq!(world.relative_path(ab, ab).as_deref(), Some("."));
        assert_eq!(world.relative_path(ac, root).as_deref(), Some("../../.."));

        let rel = world.relative_path(ab, ac).unwrap();
        assert_eq!(world.entity_by_path(ab, &rel), Some(ac));

        let other = world.spawn("other");
        assert_eq!(world.relative_path(ab, other), None);
    }

    #[test]
    fn entity_by_path_does_not_create() {
        let mut world = test_world();
        let root = world.spawn("root");
        assert_eq!(world.entity_by_path(root, "a/b"), None);
        assert_eq!(world.entity_by_path(root, ""), Some(root));
        assert_eq!(world.entity_by_path(root, ".."), None);
        assert!(world.component_by_path(root, "a:Health").is_none());
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn property_paths() {
        let mut world = test_world();
        let root = world.spawn("root");
        world
            .set_property(root, "npc:Health.points", FieldValue::Int(33))
            .unwrap();
        assert_eq!(
            world.property(root, "npc:Health.points").unwrap(),
            FieldValue::Int(33)
        );
        assert!(matches!(
            world.property(root, "npc:Health.mana"),
            Err(SceneError::UnknownField { .. })
        ));
        assert!(matches!(
            world.set_property(root, "npc:Health.points", FieldValue::Bool(true)),
            Err(SceneError::FieldTypeMismatch { .. })
        ));
        assert!(matches!(
            world.property(root, "ghost:Health.points"),
            Err(SceneError::NoSuchEntity)
        ));
    }

    #[test]
    fn copy_deep_remaps_internal_references() {
        let mut world = World::new();
        let root = world.spawn("scene");
        let rig = world.make_path(root, "rig").unwrap();
        let arm = world.make_path(rig, "arm").unwrap();
        let anchor = world.make_path(root, "anchor").unwrap();
        world.component::<TransformNode>(anchor).unwrap();
        world.component::<TransformNode>(rig).unwrap();
        world
            .component::<TransformNode>(arm)
            .unwrap()
            .set_position(crate::math::Vec3::X);
        world.set_transform_parent(arm, Some(rig)).unwrap();
        world.set_transform_parent(rig, Some(anchor)).unwrap();

        let copy = world.copy_deep(rig, "rig_copy").unwrap();
        let arm_copy = world.child_by_name(copy, "arm").unwrap();
        let node = world.get_component::<TransformNode>(arm_copy).unwrap();
        assert_eq!(node.position(), crate::math::Vec3::X);
        assert_eq!(node.parent(), Some(copy), "internal reference follows the copy");
        let rig_node = world.get_component::<TransformNode>(copy).unwrap();
        assert_eq!(rig_node.parent(), Some(anchor), "external reference is kept");
    }

    // ── Notifications ──

    #[test]
    fn sibling_components_hear_about_each_other() {
        let mut world = test_world();
        let log = Log::default();
        let e = world.spawn("e");
        world.insert(e, Health::default()).unwrap();
        world.insert(e, recorder(&log)).unwrap();
        assert_eq!(drain(&log), vec![Event::Sibling("Health")]);

        world.insert(e, Armor::default()).unwrap();
        assert_eq!(drain(&log), vec![Event::Sibling("Armor")]);

        world.insert(e, Health { entity: None, points: 5 }).unwrap();
        assert_eq!(drain(&log), vec![Event::Sibling("Health")], "a replacement counts as an addition");
    }

    #[test]
    fn linking_a_branch_notifies_parent_and_ancestors() {
        let mut world = test_world();
        let log = Log::default();
        let top = world.spawn("top");
        world.insert(top, recorder(&log)).unwrap();
        let mid = world.entity(top, "mid").unwrap();
        assert_eq!(drain(&log), vec![Event::ChildEntity(mid), Event::BranchEntity(mid)]);

        let a = world.spawn("a");
        world.insert(a, Health::default()).unwrap();
        let b = world.entity(a, "b").unwrap();
        world.insert(b, Health::default()).unwrap();
        assert!(drain(&log).is_empty(), "a detached branch reaches nobody");

        world.add_child(mid, a).unwrap();
        assert_eq!(
            drain(&log),
            vec![
                Event::BranchEntity(a),
                Event::BranchComponent(a, "Health"),
                Event::BranchComponent(b, "Health"),
            ],
            "only the direct parent hears about a child entity"
        );

        world.insert(mid, recorder(&log)).unwrap();
        drain(&log);
        world.insert(b, Armor::default()).unwrap();
        assert_eq!(
            drain(&log),
            vec![
                Event::BranchComponent(b, "Armor"),
                Event::BranchComponent(b, "Armor"),
            ],
            "both ancestors hear about a component deep in the branch"
        );

        world.insert(a, Tracked::default()).unwrap();
        assert_eq!(
            drain(&log),
            vec![
                Event::ChildComponent(a, "Tracked"),
                Event::BranchComponent(a, "Tracked"),
                Event::BranchComponent(a, "Tracked"),
            ]
        );
    }

    #[test]
    fn moving_an_entity_reports_old_and_new_parent() {
        let mut world = test_world();
        let log = Log::default();
        let first = world.spawn("first");
        let second = world.spawn("second");
        let mover = world.spawn("mover");
        world.insert(mover, recorder(&log)).unwrap();

        world.add_child(first, mover).unwrap();
        world.add_child(second, mover).unwrap();
        world.remove_child(second, mover).unwrap();
        assert_eq!(
            drain(&log),
            vec![
                Event::Parent(None, Some(first)),
                Event::Parent(Some(first), Some(second)),
                Event::Parent(Some(second), None),
            ]
        );

        world.add_child(second, mover).unwrap();
        world.add_child(second, mover).unwrap();
        assert_eq!(drain(&log), vec![Event::Parent(None, Some(second))], "a no-op move is silent");
    }

    #[test]
    fn observer_components_are_restored_after_notification() {
        let mut world = test_world();
        let log = Log::default();
        let top = world.spawn("top");
        world.insert(top, recorder(&log)).unwrap();
        world.insert(top, Health::default()).unwrap();
        let child = world.entity(top, "child").unwrap();
        world.insert(child, Health::default()).unwrap();

        assert_eq!(world.component_names(top), vec!["Recorder", "Health"]);
        assert!(world.get_component::<Recorder>(top).is_some());
        assert_eq!(world.get_component::<Recorder>(top).unwrap().entity_or_null(), Some(top));
    }
}
