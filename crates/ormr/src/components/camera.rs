//! Camera component.
//!
//! A camera only stores projection parameters. Its pose comes from the
//! sibling [`TransformNode`](super::TransformNode), which it requires.

use crate::ecs::EntityId;
use crate::math::Mat4;
use crate::registry::DescriptorBuilder;

/// Perspective or orthographic projection parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    entity: Option<EntityId>,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Orthographic zoom; also scales the orthographic view volume.
    pub zoom: f32,
    pub orthographic: bool,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            entity: None,
            fov: 60.0,
            near: 0.1,
            far: 100.0,
            zoom: 1.0,
            orthographic: false,
            viewport_width: 1280.0,
            viewport_height: 720.0,
        }
    }
}

crate::impl_component!(Camera, "Camera", requires = ["TransformNode"]);

impl Camera {
    /// Width over height. A degenerate viewport yields `1.0`.
    pub fn aspect_ratio(&self) -> f32 {
        if self.viewport_height > 0.0 {
            self.viewport_width / self.viewport_height
        } else {
            1.0
        }
    }

    /// Right-handed projection matrix for the current parameters.
    pub fn projection_matrix(&self) -> Mat4 {
        let aspect = self.aspect_ratio();
        if self.orthographic {
            let half_h = 0.5 * self.viewport_height / self.zoom.max(f32::EPSILON);
            let half_w = half_h * aspect;
            Mat4::orthographic_rh(-half_w, half_w, -half_h, half_h, self.near, self.far)
        } else {
            Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
        }
    }

    /// View matrix for a camera whose node has the given world matrix.
    pub fn view_matrix(&self, world_matrix: &Mat4) -> Mat4 {
        world_matrix.inverse()
    }

    /// `projection * view`.
    pub fn view_projection(&self, world_matrix: &Mat4) -> Mat4 {
        self.projection_matrix() * self.view_matrix(world_matrix)
    }
}

pub(crate) fn fields(d: &mut DescriptorBuilder<'_, Camera>) {
    d.float("fov", 60.0, |c| c.fov, |c, v| c.fov = v);
    d.float("near", 0.1, |c| c.near, |c, v| c.near = v);
    d.float("far", 100.0, |c| c.far, |c, v| c.far = v);
    d.float("zoom", 1.0, |c| c.zoom, |c, v| c.zoom = v);
    d.bool("isOrthographic", false, |c| c.orthographic, |c, v| c.orthographic = v);
    d.float("viewportWidth", 1280.0, |c| c.viewport_width, |c, v| c.viewport_width = v);
    d.float("viewportHeight", 720.0, |c| c.viewport_height, |c, v| c.viewport_height = v);
}
