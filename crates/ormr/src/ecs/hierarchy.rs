//! # Transform Hierarchy — Parent Resolution and World Matrices
//!
//! Every [`TransformNode`] resolves a parent node in one of two ways:
//!
//! 1. **Explicit**: the node's `parent` field names another entity carrying
//!    a transform. This wins whenever it is set and still resolves.
//! 2. **Implicit**: the nearest ancestor in the entity tree that carries a
//!    transform. Entities without one are skipped.
//!
//! ```text
//!   scene (TransformNode)         ◀── implicit parent of `wheel`
//!   └── car (no transform)
//!       └── wheel (TransformNode)
//!   anchor (TransformNode)        ◀── explicit parent, if wheel.parent = anchor
//! ```
//!
//! ## Updating
//!
//! - [`World::update_transform`] recomputes one node from its parent's
//!   *cached* world matrix. It does not update the parent first.
//! - [`World::update_transforms`] sweeps a branch and recomputes every Dirty
//!   node plus every node whose resolved parent was recomputed, so a stale
//!   dependent is caught even if nobody marked it. Each node's parent chain
//!   is settled before the node itself, wherever the chain leads.
//!
//! Explicit parent chains may form cycles; resolution walks them with a
//! bounded step count and reports [`SceneError::CyclicParentResolution`].

use std::collections::HashSet;

use super::entity::EntityId;
use super::world::World;
use crate::components::transform::TransformNode;
use crate::error::{Result, SceneError};
use crate::math::Mat4;

/// Bookkeeping for one update sweep.
#[derive(Default)]
struct Sweep {
    /// Nodes known to be current for the rest of the sweep.
    settled: HashSet<EntityId>,
    /// Nodes recomputed during the sweep.
    updated: HashSet<EntityId>,
}

impl World {
    /// The transform-capable component on `entity`: the `TransformNode` slot
    /// first, then any component exposing a transform.
    pub fn transform(&self, entity: EntityId) -> Option<&TransformNode> {
        let record = self.entities.get(entity)?;
        record
            .slot(<TransformNode as crate::ecs::Capability>::NAME)
            .and_then(|index| record.components[index].as_transform())
            .or_else(|| record.components.iter().find_map(|c| c.as_transform()))
    }

    /// Mutable [`transform`](Self::transform). Changes made through it only
    /// mark the node itself; use [`modify_transform`](Self::modify_transform)
    /// to also mark its branch.
    pub fn transform_mut(&mut self, entity: EntityId) -> Option<&mut TransformNode> {
        let record = self.entities.get_mut(entity)?;
        let index = record
            .slot(<TransformNode as crate::ecs::Capability>::NAME)
            .filter(|&i| record.components[i].as_transform().is_some())
            .or_else(|| record.components.iter().position(|c| c.as_transform().is_some()))?;
        record.components[index].as_transform_mut()
    }

    /// Edit a node. If the edit left it Dirty, every node in the entity's
    /// branch is marked Dirty too.
    pub fn modify_transform<R>(&mut self, entity: EntityId, f: impl FnOnce(&mut TransformNode) -> R) -> Option<R> {
        let node = self.transform_mut(entity)?;
        let result = f(&mut *node);
        if node.is_transform_update_requested() {
            self.request_transform_update(entity, true);
        }
        Some(result)
    }

    /// Mark `entity`'s node Dirty, and with `recursive`, every node below it.
    pub fn request_transform_update(&mut self, entity: EntityId, recursive: bool) {
        if recursive {
            for id in self.branch(entity) {
                if let Some(node) = self.transform_mut(id) {
                    node.request_transform_update();
                }
            }
        } else if let Some(node) = self.transform_mut(entity) {
            node.request_transform_update();
        }
    }

    /// One resolution step: explicit parent if it carries a transform,
    /// otherwise the nearest tree ancestor that does.
    fn transform_parent_step(&self, entity: EntityId) -> Option<EntityId> {
        let node = self.transform(entity)?;
        if let Some(explicit) = node.parent() {
            if self.transform(explicit).is_some() {
                return Some(explicit);
            }
            log::debug!(
                "explicit transform parent of `{}` no longer resolves; using tree ancestors",
                self.path(entity)
            );
        }
        let mut current = self.parent(entity);
        while let Some(ancestor) = current {
            if self.transform(ancestor).is_some() {
                return Some(ancestor);
            }
            current = self.parent(ancestor);
        }
        None
    }

    /// The entity whose node is `entity`'s transform parent.
    ///
    /// Fails if the chain of parents loops back to `entity` or exceeds
    /// [`WorldConfig::max_hierarchy_depth`](crate::WorldConfig::max_hierarchy_depth).
    pub fn resolve_transform_parent(&self, entity: EntityId) -> Result<Option<EntityId>> {
        let Some(first) = self.transform_parent_step(entity) else {
            return Ok(None);
        };
        let has_explicit = self.transform(entity).is_some_and(|n| n.parent().is_some());
        if has_explicit {
            // Tree ancestors alone can't loop; only explicit links need the walk.
            let mut current = first;
            let mut steps = 0;
            loop {
                if current == entity || steps >= self.config.max_hierarchy_depth {
                    return Err(SceneError::CyclicParentResolution {
                        path: self.path(entity),
                    });
                }
                match self.transform_parent_step(current) {
                    Some(next) => current = next,
                    None => break,
                }
                steps += 1;
            }
        }
        Ok(Some(first))
    }

    /// Set `entity`'s explicit transform parent, rejecting cycles.
    pub fn set_transform_parent(&mut self, entity: EntityId, parent: Option<EntityId>) -> Result<()> {
        let node = self.transform_mut(entity).ok_or(SceneError::NoSuchEntity)?;
        let previous = node.parent();
        node.set_parent(parent);
        if let Err(err) = self.resolve_transform_parent(entity) {
            if let Some(node) = self.transform_mut(entity) {
                node.set_parent(previous);
            }
            return Err(err);
        }
        self.request_transform_update(entity, true);
        Ok(())
    }

    /// Recompute `entity`'s world matrix from its parent's cached one.
    ///
    /// Returns `Ok(false)` if the entity has no transform.
    pub fn update_transform(&mut self, entity: EntityId) -> Result<bool> {
        if self.transform(entity).is_none() {
            return Ok(false);
        }
        let parent_world = self
            .resolve_transform_parent(entity)?
            .and_then(|p| self.transform(p))
            .map(|p| p.world_matrix());
        if let Some(node) = self.transform_mut(entity) {
            node.update_transform_with_parent(parent_world.as_ref());
        }
        Ok(true)
    }

    /// Bring every node in `root`'s branch up to date.
    ///
    /// A node is recomputed if it is Dirty or if its resolved parent
    /// (explicit or implicit) was recomputed during this sweep. Returns the
    /// number of recomputed nodes, including explicit parents outside the
    /// branch that had to be refreshed first.
    pub fn update_transforms(&mut self, root: EntityId) -> Result<usize> {
        let mut sweep = Sweep::default();
        self.sweep_branch(root, &mut sweep)?;
        log::trace!("recomputed {} world matrices under `{}`", sweep.updated.len(), self.path(root));
        Ok(sweep.updated.len())
    }

    /// [`update_transforms`](Self::update_transforms) for every root, in one
    /// sweep.
    pub fn update_all_transforms(&mut self) -> Result<usize> {
        let mut sweep = Sweep::default();
        for root in self.roots() {
            self.sweep_branch(root, &mut sweep)?;
        }
        Ok(sweep.updated.len())
    }

    fn sweep_branch(&mut self, root: EntityId, sweep: &mut Sweep) -> Result<()> {
        for entity in self.branch(root) {
            if self.transform(entity).is_some() {
                self.settle(entity, sweep)?;
            }
        }
        Ok(())
    }

    /// Settle `entity` for this sweep, settling its parent chain first.
    /// Explicit parents may live anywhere in the forest, so branch order
    /// alone does not put them ahead of their dependents.
    fn settle(&mut self, entity: EntityId, sweep: &mut Sweep) -> Result<()> {
        if sweep.settled.contains(&entity) {
            return Ok(());
        }
        let mut chain = vec![entity];
        let mut current = entity;
        while let Some(parent) = self.resolve_transform_parent(current)? {
            if sweep.settled.contains(&parent) {
                break;
            }
            if chain.len() > self.config.max_hierarchy_depth {
                return Err(SceneError::CyclicParentResolution {
                    path: self.path(entity),
                });
            }
            chain.push(parent);
            current = parent;
        }

        for id in chain.into_iter().rev() {
            let parent_updated = self
                .resolve_transform_parent(id)?
                .is_some_and(|p| sweep.updated.contains(&p));
            let dirty = self
                .transform(id)
                .is_some_and(|node| node.is_transform_update_requested());
            if dirty || parent_updated {
                self.update_transform(id)?;
                sweep.updated.insert(id);
            }
            sweep.settled.insert(id);
        }
        Ok(())
    }

    /// Reset `entity`'s node to identity and recompute it against its parent.
    pub fn reset_transform(&mut self, entity: EntityId) -> Result<()> {
        let node = self.transform_mut(entity).ok_or(SceneError::NoSuchEntity)?;
        node.reset();
        self.request_transform_update(entity, true);
        self.update_transform(entity)?;
        Ok(())
    }

    /// The cached world matrix. In debug builds a read while the node is
    /// Dirty logs a warning (see
    /// [`WorldConfig::warn_on_stale_read`](crate::WorldConfig::warn_on_stale_read)).
    pub fn world_matrix(&self, entity: EntityId) -> Option<Mat4> {
        let node = self.transform(entity)?;
        if cfg!(debug_assertions) && self.config.warn_on_stale_read && node.is_transform_update_requested() {
            log::warn!("world matrix of `{}` read while an update is pending", self.path(entity));
        }
        Some(node.world_matrix())
    }

    /// The world matrix, or [`SceneError::StaleTransform`] while Dirty.
    pub fn world_matrix_checked(&self, entity: EntityId) -> Result<Mat4> {
        let node = self.transform(entity).ok_or(SceneError::NoSuchEntity)?;
        node.world_matrix_checked().ok_or_else(|| SceneError::StaleTransform {
            path: self.path(entity),
        })
    }
}
