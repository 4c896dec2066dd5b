//! Built-in component kinds.
//!
//! [`register_defaults`] installs their descriptors. Spatial kinds are
//! declared as nested descriptors of `TransformNode`, since each of them
//! pulls one in as a required sibling.

pub mod audio;
pub mod camera;
pub mod light;
pub mod mesh;
pub mod physics;
pub mod script;
pub mod transform;

pub use audio::Sound3D;
pub use camera::Camera;
pub use light::{DirectionalLight, PointLight};
pub use mesh::{Mesh, Object3D, PrimitiveType};
pub use physics::{
    BoxShape, CapsuleShape, CylinderShape, HeightFieldShape, PlaneShape, RayShape, RigidBody, SHAPE_ALIAS,
    SphereShape, TriMeshShape,
};
pub use script::Script;
pub use transform::{ListenerId, TransformNode};

use crate::registry::Registry;

/// Register every built-in component kind.
pub fn register_defaults(registry: &mut Registry) {
    registry.descriptor(TransformNode::new, |d| {
        transform::fields(d);
        d.descriptor(Camera::default, camera::fields);
        d.descriptor(DirectionalLight::default, light::directional_fields);
        d.descriptor(PointLight::default, light::point_fields);
        d.descriptor(Object3D::default, mesh::object_fields);
        d.descriptor(RigidBody::default, physics::rigid_body_fields);
        d.descriptor(Sound3D::default, audio::fields);
    });

    registry.descriptor(Mesh::default, mesh::mesh_fields);
    registry.descriptor(BoxShape::default, physics::box_fields);
    registry.descriptor(SphereShape::default, physics::sphere_fields);
    registry.descriptor(CapsuleShape::default, physics::capsule_fields);
    registry.descriptor(CylinderShape::default, physics::cylinder_fields);
    registry.descriptor(PlaneShape::default, physics::plane_fields);
    registry.descriptor(RayShape::default, physics::ray_fields);
    registry.descriptor(TriMeshShape::default, physics::trimesh_fields);
    registry.descriptor(HeightFieldShape::default, physics::heightfield_fields);
    registry.descriptor(Script::default, script::fields);
}
