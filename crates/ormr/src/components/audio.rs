//! Positional sound source.

use crate::ecs::EntityId;
use crate::registry::DescriptorBuilder;

/// A sound emitted from its entity's world position.
#[derive(Debug, Clone, PartialEq)]
pub struct Sound3D {
    entity: Option<EntityId>,
    /// Sound resource path.
    pub file: String,
    pub volume: f32,
    pub pitch: f32,
    pub looped: bool,
    /// Start playing as soon as the scene is loaded.
    pub autoplay: bool,
}

impl Default for Sound3D {
    fn default() -> Self {
        Self {
            entity: None,
            file: String::new(),
            volume: 1.0,
            pitch: 1.0,
            looped: false,
            autoplay: false,
        }
    }
}

crate::impl_component!(Sound3D, "Sound3D", requires = ["TransformNode"]);

pub(crate) fn fields(d: &mut DescriptorBuilder<'_, Sound3D>) {
    d.string("file", "", |s| s.file.clone(), |s, v| s.file = v);
    d.float("volume", 1.0, |s| s.volume, |s, v| s.volume = v.clamp(0.0, 1.0));
    d.float("pitch", 1.0, |s| s.pitch, |s, v| s.pitch = v);
    d.bool("looped", false, |s| s.looped, |s, v| s.looped = v);
    d.bool("autoplay", false, |s| s.autoplay, |s, v| s.autoplay = v);
}
