//! # TransformNode — Local TRS and Cached World Matrix
//!
//! A node stores its local position, rotation (an `(x, y, z, w)` quaternion)
//! and scale, plus a cached world matrix and an update flag.
//!
//! ```text
//!   set_position / set_rotation / set_scale / set_parent
//!            │
//!            ▼
//!       ┌─────────┐  update_transform_with_parent  ┌───────┐
//!       │  Dirty  │ ─────────────────────────────▶ │ Clean │
//!       └─────────┘ ◀───────────────────────────── └───────┘
//!                         any local change
//! ```
//!
//! A node's own setters only mark the node itself. Marking descendants
//! happens at the world level (`World::modify_transform`,
//! `World::request_transform_update`), since a node cannot see the tree.
//!
//! Composition uses glam's column-vector convention: `world = parent * local`.
//!
//! Callbacks registered with [`TransformNode::on_world_matrix_changed`] run
//! after every recompute, whether driven by the world's sweep or by
//! [`TransformNode::reset`].

use std::fmt;
use std::sync::Arc;

use crate::ecs::{Capability, Component, EntityId};
use crate::math::{self, IDENTITY_ROTATION, Mat4, Quat, Vec3, Vec4};
use crate::registry::DescriptorBuilder;

/// Handle returned by [`TransformNode::on_world_matrix_changed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type WorldMatrixListener = Arc<dyn Fn(&TransformNode) + Send + Sync>;

/// World-matrix callbacks. Not part of a node's value: they never compare
/// and are not serialized.
#[derive(Clone, Default)]
struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, WorldMatrixListener)>,
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").field("count", &self.entries.len()).finish()
    }
}

impl PartialEq for Listeners {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

/// Spatial state of an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformNode {
    entity: Option<EntityId>,
    position: Vec3,
    rotation: Vec4,
    scale: Vec3,
    /// Explicit parent node. Takes precedence over tree ancestors.
    parent: Option<EntityId>,
    world_matrix: Mat4,
    previous_world_matrix: Option<Mat4>,
    update_requested: bool,
    listeners: Listeners,
}

impl Default for TransformNode {
    fn default() -> Self {
        Self {
            entity: None,
            position: Vec3::ZERO,
            rotation: IDENTITY_ROTATION,
            scale: Vec3::ONE,
            parent: None,
            world_matrix: Mat4::IDENTITY,
            previous_world_matrix: None,
            update_requested: true,
            listeners: Listeners::default(),
        }
    }
}

impl TransformNode {
    /// Identity transform, Dirty until first updated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity rotation and scale at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Builder-style rotation.
    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.set_rotation_quat(rotation);
        self
    }

    /// Builder-style scale.
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.set_scale(scale);
        self
    }

    // ── Local state ─────────────────────────────────────────────────────

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.request_transform_update();
    }

    pub fn translate(&mut self, offset: Vec3) {
        self.set_position(self.position + offset);
    }

    /// Rotation as stored, `(x, y, z, w)`.
    pub fn rotation(&self) -> Vec4 {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Vec4) {
        self.rotation = rotation;
        self.request_transform_update();
    }

    /// Rotation as a normalized quaternion.
    pub fn rotation_quat(&self) -> Quat {
        math::quat_from_vec4(self.rotation)
    }

    pub fn set_rotation_quat(&mut self, rotation: Quat) {
        self.set_rotation(math::vec4_from_quat(rotation));
    }

    /// Rotate about an axis in the node's local frame.
    pub fn rotate_around_axis(&mut self, axis: Vec3, radians: f32) {
        let Some(axis) = axis.try_normalize() else {
            return;
        };
        self.set_rotation_quat(self.rotation_quat() * Quat::from_axis_angle(axis, radians));
    }

    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.request_transform_update();
    }

    /// Multiply the current scale component-wise.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.set_scale(self.scale * factor);
    }

    /// The explicit parent node's entity, if any.
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Set the explicit parent without cycle checking. Prefer
    /// `World::set_transform_parent`, which rejects cycles eagerly.
    pub fn set_parent(&mut self, parent: Option<EntityId>) {
        self.parent = parent;
        self.request_transform_update();
    }

    /// Local matrix composed from position, rotation and scale.
    pub fn local_matrix(&self) -> Mat4 {
        math::compose(self.position, self.rotation, self.scale)
    }

    /// Back to origin, identity rotation and unit scale, updated immediately
    /// as if the node had no parent.
    pub fn reset(&mut self) {
        self.position = Vec3::ZERO;
        self.rotation = IDENTITY_ROTATION;
        self.scale = Vec3::ONE;
        self.update_transform_with_parent(None);
    }

    // ── World matrix ────────────────────────────────────────────────────

    /// The cached world matrix, as of the last update. May be stale while
    /// [`is_transform_update_requested`](Self::is_transform_update_requested)
    /// is `true`; `World::world_matrix` checks.
    pub fn world_matrix(&self) -> Mat4 {
        self.world_matrix
    }

    /// The world matrix, or `None` while an update is pending.
    pub fn world_matrix_checked(&self) -> Option<Mat4> {
        (!self.update_requested).then_some(self.world_matrix)
    }

    /// Overwrite the cached world matrix. The node stays Clean; the next
    /// local change recomputes it.
    pub fn set_world_matrix(&mut self, world_matrix: Mat4) {
        self.world_matrix = world_matrix;
    }

    /// Translation part of the world matrix.
    pub fn world_position(&self) -> Vec3 {
        self.world_matrix.w_axis.truncate()
    }

    /// World-space +Z axis.
    pub fn forward(&self) -> Vec3 {
        self.world_matrix.z_axis.truncate().normalize_or_zero()
    }

    /// World-space +Y axis.
    pub fn up(&self) -> Vec3 {
        self.world_matrix.y_axis.truncate().normalize_or_zero()
    }

    pub fn is_transform_update_requested(&self) -> bool {
        self.update_requested
    }

    /// Mark this node Dirty.
    pub fn request_transform_update(&mut self) {
        self.update_requested = true;
    }

    /// Recompute `world = parent_world * local` (or `local` without a parent)
    /// and mark the node Clean.
    pub fn update_transform_with_parent(&mut self, parent_world: Option<&Mat4>) {
        let local = self.local_matrix();
        self.world_matrix = match parent_world {
            Some(parent) => *parent * local,
            None => local,
        };
        self.update_requested = false;

        let this: &Self = self;
        for (_, listener) in &this.listeners.entries {
            listener(this);
        }
    }

    // ── Listeners ───────────────────────────────────────────────────────

    /// Run `listener` with the node after each world matrix recompute.
    pub fn on_world_matrix_changed(&mut self, listener: impl Fn(&TransformNode) + Send + Sync + 'static) -> ListenerId {
        let id = ListenerId(self.listeners.next_id);
        self.listeners.next_id += 1;
        self.listeners.entries.push((id, Arc::new(listener)));
        id
    }

    /// Returns `false` if the listener was not registered here.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.entries.len();
        self.listeners.entries.retain(|(entry, _)| *entry != id);
        self.listeners.entries.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.entries.len()
    }

    // ── Previous frame ──────────────────────────────────────────────────

    /// Start or stop keeping the previous world matrix (for motion vectors).
    pub fn enable_previous_matrix(&mut self, enabled: bool) {
        self.previous_world_matrix = enabled.then_some(self.world_matrix);
    }

    pub fn previous_world_matrix(&self) -> Option<Mat4> {
        self.previous_world_matrix
    }

    /// Snapshot the current world matrix as the previous one, if enabled.
    pub fn update_previous_matrix(&mut self) {
        if let Some(previous) = &mut self.previous_world_matrix {
            *previous = self.world_matrix;
        }
    }
}

impl Capability for TransformNode {
    const NAME: &'static str = "TransformNode";
}

impl Component for TransformNode {
    fn component_name(&self) -> &'static str {
        Self::NAME
    }

    fn entity_or_null(&self) -> Option<EntityId> {
        self.entity
    }

    fn set_entity_or_null(&mut self, entity: Option<EntityId>) {
        self.entity = entity;
        self.request_transform_update();
    }

    fn after_read(&mut self) {
        self.request_transform_update();
    }

    fn as_transform(&self) -> Option<&TransformNode> {
        Some(self)
    }

    fn as_transform_mut(&mut self) -> Option<&mut TransformNode> {
        Some(self)
    }
}

pub(crate) fn fields(d: &mut DescriptorBuilder<'_, TransformNode>) {
    d.add_aliases(&["Spatial"]);
    d.vec3("position", Vec3::ZERO, |n| n.position, |n, v| n.set_position(v));
    d.vec4("rotation", IDENTITY_ROTATION, |n| n.rotation, |n, v| n.set_rotation(v));
    d.vec3("scale", Vec3::ONE, |n| n.scale, |n, v| n.set_scale(v));
    d.mat4("worldMatrix", Mat4::IDENTITY, |n| n.world_matrix, |n, m| n.set_world_matrix(m))
        .transient();
    d.reference("parent", TransformNode::NAME, |n| n.parent, |n, p| n.set_parent(p));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn new_node_is_dirty_identity() {
        let node = TransformNode::new();
        assert!(node.is_transform_update_requested());
        assert_eq!(node.local_matrix(), Mat4::IDENTITY);
        assert!(node.world_matrix_checked().is_none());
    }

    #[test]
    fn update_without_parent_is_local() {
        let mut node = TransformNode::from_position(Vec3::new(1.0, 2.0, 3.0));
        node.update_transform_with_parent(None);
        assert!(!node.is_transform_update_requested());
        assert_eq!(node.world_matrix(), node.local_matrix());
        assert!(approx(node.world_position(), Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn update_composes_parent_first() {
        let parent = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0));
        let mut node = TransformNode::from_position(Vec3::new(0.0, 1.0, 0.0)).with_scale(Vec3::splat(2.0));
        node.update_transform_with_parent(Some(&parent));
        assert_eq!(node.world_matrix(), parent * node.local_matrix());
        assert!(approx(node.world_position(), Vec3::new(10.0, 1.0, 0.0)));
    }

    #[test]
    fn setters_mark_dirty() {
        let mut node = TransformNode::new();
        node.update_transform_with_parent(None);

        node.set_position(Vec3::X);
        assert!(node.is_transform_update_requested());
        node.update_transform_with_parent(None);

        node.set_scale(Vec3::splat(3.0));
        assert!(node.is_transform_update_requested());
        node.update_transform_with_parent(None);

        node.rotate_around_axis(Vec3::Y, FRAC_PI_2);
        assert!(node.is_transform_update_requested());
    }

    #[test]
    fn rotate_around_zero_axis_is_ignored() {
        let mut node = TransformNode::new();
        node.update_transform_with_parent(None);
        node.rotate_around_axis(Vec3::ZERO, 1.0);
        assert!(!node.is_transform_update_requested());
    }

    #[test]
    fn quarter_turn_moves_forward() {
        let mut node = TransformNode::new().with_rotation(Quat::from_rotation_y(FRAC_PI_2));
        node.update_transform_with_parent(None);
        assert!(approx(node.forward(), Vec3::X));
        assert!(approx(node.up(), Vec3::Y));
    }

    #[test]
    fn reset_updates_immediately() {
        let mut node = TransformNode::from_position(Vec3::splat(5.0)).with_scale(Vec3::splat(2.0));
        node.reset();
        assert!(!node.is_transform_update_requested());
        assert_eq!(node.world_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn previous_matrix_tracking() {
        let mut node = TransformNode::from_position(Vec3::X);
        node.update_transform_with_parent(None);
        assert!(node.previous_world_matrix().is_none());

        node.enable_previous_matrix(true);
        let first = node.world_matrix();
        node.set_position(Vec3::Y);
        node.update_transform_with_parent(None);
        assert_eq!(node.previous_world_matrix(), Some(first));

        node.update_previous_matrix();
        assert_eq!(node.previous_world_matrix(), Some(node.world_matrix()));
    }

    #[test]
    fn attach_and_read_mark_dirty() {
        let mut node = TransformNode::new();
        node.update_transform_with_parent(None);
        node.set_entity_or_null(None);
        assert!(node.is_transform_update_requested());

        node.update_transform_with_parent(None);
        node.after_read();
        assert!(node.is_transform_update_requested());
        assert!(node.as_transform().is_some());
    }

    #[test]
    fn listeners_see_each_recompute() {
        use std::sync::Mutex;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut node = TransformNode::from_position(Vec3::X);
        let sink = Arc::clone(&seen);
        let id = node.on_world_matrix_changed(move |n| sink.lock().unwrap().push(n.world_position()));
        assert_eq!(node.listener_count(), 1);

        node.update_transform_with_parent(None);
        let parent = Mat4::from_translation(Vec3::Y);
        node.update_transform_with_parent(Some(&parent));
        assert_eq!(*seen.lock().unwrap(), vec![Vec3::X, Vec3::new(1.0, 1.0, 0.0)]);

        node.set_position(Vec3::Z);
        assert_eq!(seen.lock().unwrap().len(), 2, "marking dirty alone does not notify");

        assert!(node.remove_listener(id));
        assert!(!node.remove_listener(id));
        node.update_transform_with_parent(None);
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn listeners_do_not_affect_equality() {
        let mut node = TransformNode::new();
        let plain = node.clone();
        node.on_world_matrix_changed(|_| {});
        assert_eq!(node, plain);
        assert!(format!("{node:?}").contains("count: 1"));
    }
}
