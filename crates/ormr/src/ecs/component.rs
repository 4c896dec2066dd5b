//! # Component — The Capability Contract
//!
//! A component is a unit of typed state attached to exactly one entity under
//! one capability name. The set of component kinds is open: anything that
//! implements [`Component`] can be attached, and anything that also has a
//! descriptor in the [`Registry`](crate::registry::Registry) can be created by
//! name, reflected over and serialized.
//!
//! Components are stored as `Box<dyn Component>`. Typed access goes through a
//! runtime downcast (`downcast_ref`/`downcast_mut` on `dyn Component`), the
//! same zero-unsafe approach the ECS storage columns use.
//!
//! ## Writing a component
//!
//! ```ignore
//! #[derive(Default)]
//! struct Health {
//!     entity: Option<EntityId>,
//!     points: i32,
//! }
//!
//! ormr::impl_component!(Health, "Health");
//! ```

use std::any::Any;

use super::entity::EntityId;
use crate::components::transform::TransformNode;

/// Behaviour shared by every component kind.
///
/// Components know their own capability name and the entity they are
/// attached to, but nothing about the registry.
pub trait Component: Any + Send + Sync {
    /// The capability name this component occupies on its entity.
    fn component_name(&self) -> &'static str;

    /// The owning entity, or `None` while detached.
    fn entity_or_null(&self) -> Option<EntityId>;

    /// Set exclusively by the [`World`](super::world::World) on attach/detach.
    fn set_entity_or_null(&mut self, entity: Option<EntityId>);

    /// Sibling capabilities that must exist on the same entity. The world
    /// creates any that are missing right after attaching this component.
    fn required_siblings(&self) -> &'static [&'static str] {
        &[]
    }

    /// Teardown hook, run when the component is replaced, removed, or its
    /// entity is destroyed. Runs before the back-reference is cleared.
    fn destroy(&mut self) {}

    /// Called after all fields were read from a serialized document.
    fn after_read(&mut self) {}

    // ── Notifications ───────────────────────────────────────────────────
    //
    // Sent by the world after the structural change is complete. A hook
    // sees the other component read-only and has no access to the world.

    /// The owning entity moved from `old` to `new` in the tree.
    fn parent_changed(&mut self, _old: Option<EntityId>, _new: Option<EntityId>) {}

    /// `component` was attached to the same entity. A newly attached
    /// component is also told about each sibling already present.
    fn added_sibling_component(&mut self, _component: &dyn Component) {}

    /// `component` was attached to `child`, a direct child of the owner.
    fn added_component_to_child_entity(&mut self, _child: EntityId, _component: &dyn Component) {}

    /// `component` was attached to `entity`, somewhere below the owner.
    fn added_component_to_branch(&mut self, _entity: EntityId, _component: &dyn Component) {}

    /// `child` was linked under the owner.
    fn added_entity(&mut self, _child: EntityId) {}

    /// `entity` was linked somewhere below the owner.
    fn added_entity_to_branch(&mut self, _entity: EntityId) {}

    /// Spatial components expose their transform node here so the hierarchy
    /// can resolve parents without knowing every concrete kind.
    fn as_transform(&self) -> Option<&TransformNode> {
        None
    }

    /// Mutable twin of [`as_transform`](Component::as_transform).
    fn as_transform_mut(&mut self) -> Option<&mut TransformNode> {
        None
    }
}

/// A component type with a statically known capability name.
///
/// Typed lookups (`World::get_component::<T>()`) use `T::NAME` directly, so
/// the per-frame path never goes through the registry.
pub trait Capability: Component + Sized {
    /// The capability name. Must match [`Component::component_name`].
    const NAME: &'static str;
}

impl dyn Component {
    /// Returns `true` if the concrete type is `T`.
    pub fn is<T: Component>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<T>()
    }

    /// Borrow as the concrete type, if it is `T`.
    pub fn downcast_ref<T: Component>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    /// Mutably borrow as the concrete type, if it is `T`.
    pub fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut::<T>()
    }
}

/// Implement [`Component`] and [`Capability`] for a struct that stores its
/// back-reference in a field named `entity: Option<EntityId>`.
///
/// ```ignore
/// impl_component!(Camera, "Camera", requires = ["TransformNode"]);
/// ```
#[macro_export]
macro_rules! impl_component {
    ($ty:ty, $name:literal) => {
        $crate::impl_component!($ty, $name, requires = []);
    };
    ($ty:ty, $name:literal, requires = [$($req:literal),* $(,)?]) => {
        impl $crate::ecs::Capability for $ty {
            const NAME: &'static str = $name;
        }

        impl $crate::ecs::Component for $ty {
            fn component_name(&self) -> &'static str {
                $name
            }

            fn entity_or_null(&self) -> Option<$crate::ecs::EntityId> {
                self.entity
            }

            fn set_entity_or_null(&mut self, entity: Option<$crate::ecs::EntityId>) {
                self.entity = entity;
            }

            fn required_siblings(&self) -> &'static [&'static str] {
                &[$($req),*]
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn macro_wires_name_and_requirements() {
        let health = Health::default();
        assert_eq!(health.component_name(), "Health");
        assert_eq!(<Health as Capability>::NAME, "Health");
        assert!(health.required_siblings().is_empty());
        assert!(health.entity_or_null().is_none());

        let armor = Armor::default();
        assert_eq!(armor.required_siblings(), &["Health"]);
    }

    #[test]
    fn downcast_through_trait_object() {
        let mut boxed: Box<dyn Component> = Box::new(Health {
            entity: None,
            points: 7,
        });
        assert!(boxed.is::<Health>());
        assert!(!boxed.is::<Armor>());
        assert_eq!(boxed.downcast_ref::<Health>().map(|h| h.points), Some(7));

        boxed.downcast_mut::<Health>().unwrap().points = 9;
        assert_eq!(boxed.downcast_ref::<Health>().unwrap().points, 9);
        assert!(boxed.downcast_ref::<Armor>().is_none());
    }

    #[test]
    fn non_spatial_components_have_no_transform() {
        let health = Health::default();
        assert!(health.as_transform().is_none());
    }

    #[test]
    fn notification_hooks_default_to_nothing() {
        let mut health = Health {
            entity: None,
            points: 3,
        };
        let armor = Armor::default();
        health.added_sibling_component(&armor);
        health.parent_changed(None, None);
        assert_eq!(health.points, 3);
        assert!(health.entity_or_null().is_none());
    }
}
