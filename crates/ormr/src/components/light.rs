//! Light components. Both require a sibling transform.

use crate::ecs::EntityId;
use crate::math::{Mat4, Vec3};
use crate::registry::DescriptorBuilder;

/// Parallel light shining along the node's world -Z axis.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    entity: Option<EntityId>,
    pub color: Vec3,
    pub intensity: f32,
    pub enabled: bool,
    pub cast_shadows: bool,
}

impl Default for DirectionalLight {
    fn default() -> Self {
        Self {
            entity: None,
            color: Vec3::ONE,
            intensity: 1.0,
            enabled: true,
            cast_shadows: false,
        }
    }
}

crate::impl_component!(DirectionalLight, "DirectionalLight", requires = ["TransformNode"]);

impl DirectionalLight {
    /// World-space direction the light travels in.
    pub fn direction(&self, world_matrix: &Mat4) -> Vec3 {
        (-world_matrix.z_axis.truncate()).normalize_or_zero()
    }
}

/// Omnidirectional light with a finite range.
#[derive(Debug, Clone, PartialEq)]
pub struct PointLight {
    entity: Option<EntityId>,
    pub color: Vec3,
    pub intensity: f32,
    pub range: f32,
    pub enabled: bool,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            entity: None,
            color: Vec3::ONE,
            intensity: 1.0,
            range: 10.0,
            enabled: true,
        }
    }
}

crate::impl_component!(PointLight, "PointLight", requires = ["TransformNode"]);

impl PointLight {
    /// Linear falloff to zero at `range`.
    pub fn attenuation(&self, distance: f32) -> f32 {
        if self.range <= 0.0 {
            return 0.0;
        }
        (1.0 - distance / self.range).clamp(0.0, 1.0)
    }
}

pub(crate) fn directional_fields(d: &mut DescriptorBuilder<'_, DirectionalLight>) {
    d.add_aliases(&["Light"]);
    d.vec3("color", Vec3::ONE, |l| l.color, |l, v| l.color = v);
    d.float("intensity", 1.0, |l| l.intensity, |l, v| l.intensity = v);
    d.bool("enabled", true, |l| l.enabled, |l, v| l.enabled = v);
    d.bool("shadows", false, |l| l.cast_shadows, |l, v| l.cast_shadows = v);
}

pub(crate) fn point_fields(d: &mut DescriptorBuilder<'_, PointLight>) {
    d.add_aliases(&["Light"]);
    d.vec3("color", Vec3::ONE, |l| l.color, |l, v| l.color = v);
    d.float("intensity", 1.0, |l| l.intensity, |l, v| l.intensity = v);
    d.float("range", 10.0, |l| l.range, |l, v| l.range = v);
    d.bool("enabled", true, |l| l.enabled, |l, v| l.enabled = v);
}
