//! Common imports.

pub use crate::components::{
    BoxShape, Camera, CapsuleShape, CylinderShape, DirectionalLight, HeightFieldShape, Mesh, Object3D, PlaneShape,
    PointLight, RayShape, RigidBody, Script, Sound3D, SphereShape, TransformNode, TriMeshShape,
};
pub use crate::config::WorldConfig;
pub use crate::ecs::{Capability, Component, ComponentKey, EntityId, World};
pub use crate::error::{Result, SceneError};
pub use crate::impl_component;
pub use crate::math::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use crate::registry::{FieldKind, FieldValue, Registry};
