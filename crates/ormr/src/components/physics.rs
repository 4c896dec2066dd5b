//! Rigid bodies and collision shapes.
//!
//! Every shape kind declares the alias `Shape`, so code that only needs
//! "whatever shape this entity has" can ask for it by that name:
//!
//! ```ignore
//! let shape = world.get_component_by_name(entity, "Shape");
//! ```
//!
//! Only one shape fits per entity under each concrete name; an entity with
//! several shapes should hold them on child entities.

use crate::ecs::EntityId;
use crate::math::Vec3;
use crate::registry::DescriptorBuilder;

/// Alias shared by every collision shape.
pub const SHAPE_ALIAS: &str = "Shape";

/// Dynamic or static body simulated at its entity's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    entity: Option<EntityId>,
    pub mass: f32,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
    pub linear_damping: f32,
    pub angular_damping: f32,
    pub gravity: bool,
    pub is_static: bool,
}

impl Default for RigidBody {
    fn default() -> Self {
        Self {
            entity: None,
            mass: 1.0,
            linear_velocity: Vec3::ZERO,
            angular_velocity: Vec3::ZERO,
            linear_damping: 0.0,
            angular_damping: 0.0,
            gravity: true,
            is_static: false,
        }
    }
}

crate::impl_component!(RigidBody, "RigidBody", requires = ["TransformNode"]);

impl RigidBody {
    /// Inverse mass; zero for static or massless bodies.
    pub fn inverse_mass(&self) -> f32 {
        if self.is_static || self.mass <= 0.0 {
            0.0
        } else {
            1.0 / self.mass
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxShape {
    entity: Option<EntityId>,
    /// Full edge lengths.
    pub size: Vec3,
}

impl Default for BoxShape {
    fn default() -> Self {
        Self {
            entity: None,
            size: Vec3::ONE,
        }
    }
}

crate::impl_component!(BoxShape, "BoxShape");

#[derive(Debug, Clone, PartialEq)]
pub struct SphereShape {
    entity: Option<EntityId>,
    pub radius: f32,
}

impl Default for SphereShape {
    fn default() -> Self {
        Self {
            entity: None,
            radius: 1.0,
        }
    }
}

crate::impl_component!(SphereShape, "SphereShape");

/// Cylinder with hemispherical caps, along the local Y axis.
#[derive(Debug, Clone, PartialEq)]
pub struct CapsuleShape {
    entity: Option<EntityId>,
    pub radius: f32,
    /// Length of the cylindrical part.
    pub length: f32,
}

impl Default for CapsuleShape {
    fn default() -> Self {
        Self {
            entity: None,
            radius: 0.5,
            length: 1.0,
        }
    }
}

crate::impl_component!(CapsuleShape, "CapsuleShape");

#[derive(Debug, Clone, PartialEq)]
pub struct CylinderShape {
    entity: Option<EntityId>,
    pub radius: f32,
    pub length: f32,
}

impl Default for CylinderShape {
    fn default() -> Self {
        Self {
            entity: None,
            radius: 0.5,
            length: 1.0,
        }
    }
}

crate::impl_component!(CylinderShape, "CylinderShape");

/// Infinite plane `normal · p = depth`.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaneShape {
    entity: Option<EntityId>,
    pub normal: Vec3,
    pub depth: f32,
}

impl Default for PlaneShape {
    fn default() -> Self {
        Self {
            entity: None,
            normal: Vec3::Y,
            depth: 0.0,
        }
    }
}

crate::impl_component!(PlaneShape, "PlaneShape");

/// Ray along the node's forward axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RayShape {
    entity: Option<EntityId>,
    pub length: f32,
}

impl Default for RayShape {
    fn default() -> Self {
        Self {
            entity: None,
            length: 1.0,
        }
    }
}

crate::impl_component!(RayShape, "RayShape");

/// Collision geometry taken from a [`Mesh`](super::Mesh).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TriMeshShape {
    entity: Option<EntityId>,
    pub mesh: Option<EntityId>,
}

crate::impl_component!(TriMeshShape, "TriMeshShape");

/// Regular grid of heights.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightFieldShape {
    entity: Option<EntityId>,
    pub width: i32,
    pub depth: i32,
    pub min_height: f32,
    pub max_height: f32,
}

impl Default for HeightFieldShape {
    fn default() -> Self {
        Self {
            entity: None,
            width: 1,
            depth: 1,
            min_height: 0.0,
            max_height: 1.0,
        }
    }
}

crate::impl_component!(HeightFieldShape, "HeightFieldShape");

pub(crate) fn rigid_body_fields(d: &mut DescriptorBuilder<'_, RigidBody>) {
    d.float("mass", 1.0, |b| b.mass, |b, v| b.mass = v);
    d.vec3("linearVelocity", Vec3::ZERO, |b| b.linear_velocity, |b, v| b.linear_velocity = v);
    d.vec3("angularVelocity", Vec3::ZERO, |b| b.angular_velocity, |b, v| b.angular_velocity = v);
    d.float("linearDamping", 0.0, |b| b.linear_damping, |b, v| b.linear_damping = v);
    d.float("angularDamping", 0.0, |b| b.angular_damping, |b, v| b.angular_damping = v);
    d.bool("gravity", true, |b| b.gravity, |b, v| b.gravity = v);
    d.bool("isStatic", false, |b| b.is_static, |b, v| b.is_static = v);
}

pub(crate) fn box_fields(d: &mut DescriptorBuilder<'_, BoxShape>) {
    d.add_aliases(&[SHAPE_ALIAS]);
    d.vec3("size", Vec3::ONE, |s| s.size, |s, v| s.size = v);
}

pub(crate) fn sphere_fields(d: &mut DescriptorBuilder<'_, SphereShape>) {
    d.add_aliases(&[SHAPE_ALIAS]);
    d.float("radius", 1.0, |s| s.radius, |s, v| s.radius = v);
}

pub(crate) fn capsule_fields(d: &mut DescriptorBuilder<'_, CapsuleShape>) {
    d.add_aliases(&[SHAPE_ALIAS]);
    d.float("radius", 0.5, |s| s.radius, |s, v| s.radius = v);
    d.float("length", 1.0, |s| s.length, |s, v| s.length = v);
}

pub(crate) fn cylinder_fields(d: &mut DescriptorBuilder<'_, CylinderShape>) {
    d.add_aliases(&[SHAPE_ALIAS]);
    d.float("radius", 0.5, |s| s.radius, |s, v| s.radius = v);
    d.float("length", 1.0, |s| s.length, |s, v| s.length = v);
}

pub(crate) fn plane_fields(d: &mut DescriptorBuilder<'_, PlaneShape>) {
    d.add_aliases(&[SHAPE_ALIAS]);
    d.vec3("normal", Vec3::Y, |s| s.normal, |s, v| s.normal = v);
    d.float("depth", 0.0, |s| s.depth, |s, v| s.depth = v);
}

pub(crate) fn ray_fields(d: &mut DescriptorBuilder<'_, RayShape>) {
    d.add_aliases(&[SHAPE_ALIAS]);
    d.float("length", 1.0, |s| s.length, |s, v| s.length = v);
}

pub(crate) fn trimesh_fields(d: &mut DescriptorBuilder<'_, TriMeshShape>) {
    d.add_aliases(&[SHAPE_ALIAS]);
    d.reference("mesh", "Mesh", |s| s.mesh, |s, v| s.mesh = v);
}

pub(crate) fn heightfield_fields(d: &mut DescriptorBuilder<'_, HeightFieldShape>) {
    d.add_aliases(&[SHAPE_ALIAS]);
    d.int("width", 1, |s| s.width, |s, v| s.width = v);
    d.int("depth", 1, |s| s.depth, |s, v| s.depth = v);
    d.float("minHeight", 0.0, |s| s.min_height, |s, v| s.min_height = v);
    d.float("maxHeight", 1.0, |s| s.max_height, |s, v| s.max_height = v);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::World;
    use crate::registry;

    #[test]
    fn static_bodies_have_no_inverse_mass() {
        let mut body = RigidBody {
            mass: 4.0,
            ..RigidBody::default()
        };
        assert_eq!(body.inverse_mass(), 0.25);
        body.is_static = true;
        assert_eq!(body.inverse_mass(), 0.0);
    }

    #[test]
    fn every_shape_answers_to_shape_alias() {
        let registry = registry::global();
        let r = registry::read(&registry);
        let names: Vec<_> = r
            .implementors(SHAPE_ALIAS)
            .iter()
            .map(|d| d.component_name())
            .collect();
        for shape in [
            "BoxShape",
            "SphereShape",
            "CapsuleShape",
            "CylinderShape",
            "PlaneShape",
            "RayShape",
            "TriMeshShape",
            "HeightFieldShape",
        ] {
            assert!(names.contains(&shape), "{shape} missing from {names:?}");
        }
    }

    #[test]
    fn lookup_by_shape_alias() {
        let mut world = World::new();
        let e = world.spawn("ball");
        world.insert(e, SphereShape::default()).unwrap();
        let shape = world.get_component_by_name(e, SHAPE_ALIAS).unwrap();
        assert_eq!(shape.component_name(), "SphereShape");
        assert!(world.get_component_by_name(e, "BoxShape").is_none());
    }
}
