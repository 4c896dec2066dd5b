//! Script binding.
//!
//! The object model does not run scripts. It only records which script an
//! entity is bound to, so a host runtime can find and drive it.

use crate::ecs::EntityId;
use crate::registry::DescriptorBuilder;

#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    entity: Option<EntityId>,
    /// Script resource path.
    pub file: String,
    /// Entry point the host calls.
    pub function_name: String,
    pub enabled: bool,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            entity: None,
            file: String::new(),
            function_name: String::new(),
            enabled: true,
        }
    }
}

crate::impl_component!(Script, "Script");

pub(crate) fn fields(d: &mut DescriptorBuilder<'_, Script>) {
    d.string("file", "", |s| s.file.clone(), |s, v| s.file = v);
    d.string("functionName", "", |s| s.function_name.clone(), |s, v| s.function_name = v);
    d.bool("enabled", true, |s| s.enabled, |s, v| s.enabled = v);
}
