//! Renderable geometry and the objects that place it in the scene.
//!
//! A [`Mesh`] describes geometry by counts and a primitive type; the actual
//! buffers belong to whatever renderer consumes the tree. An [`Object3D`]
//! instances a mesh (by reference, possibly on another entity) at its own
//! transform, and binds to the sibling [`TransformNode`] as soon as both
//! share an entity.
//!
//! [`TransformNode`]: super::TransformNode

use crate::ecs::{Capability, Component, ComponentKey, EntityId};
use crate::registry::DescriptorBuilder;

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveType {
    Points,
    Lines,
    #[default]
    Triangles,
    TriangleStrip,
}

impl PrimitiveType {
    pub fn as_str(self) -> &'static str {
        match self {
            PrimitiveType::Points => "Points",
            PrimitiveType::Lines => "Lines",
            PrimitiveType::Triangles => "Triangles",
            PrimitiveType::TriangleStrip => "TriangleStrip",
        }
    }

    /// Unknown names fall back to triangles.
    pub fn parse(name: &str) -> Self {
        match name {
            "Points" => PrimitiveType::Points,
            "Lines" => PrimitiveType::Lines,
            "TriangleStrip" => PrimitiveType::TriangleStrip,
            _ => PrimitiveType::Triangles,
        }
    }
}

/// Geometry description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mesh {
    entity: Option<EntityId>,
    pub vertex_count: i32,
    pub index_count: i32,
    pub primitive: PrimitiveType,
    /// Material resource path.
    pub material: String,
}

crate::impl_component!(Mesh, "Mesh");

impl Mesh {
    /// Number of whole primitives the mesh draws.
    pub fn primitive_count(&self) -> i32 {
        let elements = if self.index_count > 0 {
            self.index_count
        } else {
            self.vertex_count
        };
        match self.primitive {
            PrimitiveType::Points => elements,
            PrimitiveType::Lines => elements / 2,
            PrimitiveType::Triangles => elements / 3,
            PrimitiveType::TriangleStrip => (elements - 2).max(0),
        }
    }
}

/// An instance of a mesh at this entity's transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Object3D {
    entity: Option<EntityId>,
    /// Entity carrying the [`Mesh`] to draw.
    pub mesh: Option<EntityId>,
    pub visible: bool,
    pub cast_shadows: bool,
    node: Option<ComponentKey>,
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            entity: None,
            mesh: None,
            visible: true,
            cast_shadows: true,
            node: None,
        }
    }
}

impl Object3D {
    /// The transform node placing this object, once bound.
    pub fn node(&self) -> Option<ComponentKey> {
        self.node
    }
}

impl Capability for Object3D {
    const NAME: &'static str = "Object3D";
}

impl Component for Object3D {
    fn component_name(&self) -> &'static str {
        Self::NAME
    }

    fn entity_or_null(&self) -> Option<EntityId> {
        self.entity
    }

    fn set_entity_or_null(&mut self, entity: Option<EntityId>) {
        self.entity = entity;
        if entity.is_none() {
            self.node = None;
        }
    }

    fn required_siblings(&self) -> &'static [&'static str] {
        &["TransformNode"]
    }

    fn added_sibling_component(&mut self, component: &dyn Component) {
        if component.as_transform().is_none() {
            return;
        }
        self.node = component.entity_or_null().map(|entity| ComponentKey {
            entity,
            name: component.component_name(),
        });
    }
}

pub(crate) fn mesh_fields(d: &mut DescriptorBuilder<'_, Mesh>) {
    d.int("vertexCount", 0, |m| m.vertex_count, |m, v| m.vertex_count = v);
    d.int("indexCount", 0, |m| m.index_count, |m, v| m.index_count = v);
    d.string(
        "primitiveType",
        PrimitiveType::Triangles.as_str(),
        |m| m.primitive.as_str().to_string(),
        |m, v| m.primitive = PrimitiveType::parse(&v),
    );
    d.string("material", "", |m| m.material.clone(), |m, v| m.material = v);
}

pub(crate) fn object_fields(d: &mut DescriptorBuilder<'_, Object3D>) {
    d.reference("mesh", "Mesh", |o| o.mesh, |o, v| o.mesh = v);
    d.bool("visible", true, |o| o.visible, |o, v| o.visible = v);
    d.bool("castShadows", true, |o| o.cast_shadows, |o, v| o.cast_shadows = v);
}
