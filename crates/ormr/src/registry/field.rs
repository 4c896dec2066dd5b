//! Field reflection.
//!
//! A [`FieldDescriptor`] names one piece of a component's state, declares its
//! kind and default, and carries a type-erased getter/setter pair. Setters go
//! through the component's own methods, so side effects such as marking a
//! transform Dirty happen no matter who writes the field.
//!
//! ## Serialized forms
//!
//! | Kind      | JSON                                   |
//! |-----------|----------------------------------------|
//! | bool      | `true`                                 |
//! | int       | `42`                                   |
//! | float     | `1.5`                                  |
//! | string    | `"text"`                               |
//! | vec2..4   | `[x, y]`, `[x, y, z]`, `[x, y, z, w]`  |
//! | mat4      | 16 numbers, row-major                  |
//! | reference | `"path/to/entity:Capability"`          |

use serde_json::Value;

use crate::ecs::{Component, EntityId};
use crate::error::{Result, SceneError};
use crate::math::{Mat4, Vec2, Vec3, Vec4, mat4_from_row_major, mat4_to_row_major};

/// The declared shape of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    /// `bool`
    Bool,
    /// `i32`
    Int,
    /// `f32`
    Float,
    /// `String`
    String,
    /// [`Vec2`]
    Vec2,
    /// [`Vec3`]
    Vec3,
    /// [`Vec4`]
    Vec4,
    /// [`Mat4`]
    Mat4,
    /// Reference to another entity's component of the named capability.
    Ref {
        /// Capability the referenced entity must carry.
        capability: String,
    },
}

impl FieldKind {
    /// Human-readable name used in error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Bool => "a bool",
            FieldKind::Int => "an integer",
            FieldKind::Float => "a number",
            FieldKind::String => "a string",
            FieldKind::Vec2 => "a 2-element array",
            FieldKind::Vec3 => "a 3-element array",
            FieldKind::Vec4 => "a 4-element array",
            FieldKind::Mat4 => "a 16-element array",
            FieldKind::Ref { .. } => "a component path",
        }
    }
}

/// A field value, independent of the component it came from.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    String(String),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
    /// Entity carrying the referenced component.
    Ref(Option<EntityId>),
}

impl FieldValue {
    /// Whether this value fits a field of `kind`.
    pub fn matches(&self, kind: &FieldKind) -> bool {
        matches!(
            (self, kind),
            (FieldValue::Bool(_), FieldKind::Bool)
                | (FieldValue::Int(_), FieldKind::Int)
                | (FieldValue::Float(_), FieldKind::Float)
                | (FieldValue::String(_), FieldKind::String)
                | (FieldValue::Vec2(_), FieldKind::Vec2)
                | (FieldValue::Vec3(_), FieldKind::Vec3)
                | (FieldValue::Vec4(_), FieldKind::Vec4)
                | (FieldValue::Mat4(_), FieldKind::Mat4)
                | (FieldValue::Ref(_), FieldKind::Ref { .. })
        )
    }

    /// Serialize a plain value. References need a world to become paths, so
    /// they yield `None` here.
    pub fn to_json(&self) -> Option<Value> {
        Some(match self {
            FieldValue::Bool(v) => Value::Bool(*v),
            FieldValue::Int(v) => Value::from(*v),
            FieldValue::Float(v) => float(*v),
            FieldValue::String(v) => Value::String(v.clone()),
            FieldValue::Vec2(v) => floats(&v.to_array()),
            FieldValue::Vec3(v) => floats(&v.to_array()),
            FieldValue::Vec4(v) => floats(&v.to_array()),
            FieldValue::Mat4(m) => floats(&mat4_to_row_major(m)),
            FieldValue::Ref(_) => return None,
        })
    }

    /// Parse a plain value of `kind`. Array elements that are missing or not
    /// numbers take the matching element of `default`.
    ///
    /// Returns `None` when the JSON has the wrong shape, and always for
    /// references.
    pub fn from_json(kind: &FieldKind, json: &Value, default: &FieldValue) -> Option<FieldValue> {
        Some(match kind {
            FieldKind::Bool => FieldValue::Bool(json.as_bool()?),
            FieldKind::Int => FieldValue::Int(i32::try_from(json.as_i64()?).ok()?),
            FieldKind::Float => FieldValue::Float(json.as_f64()? as f32),
            FieldKind::String => FieldValue::String(json.as_str()?.to_string()),
            FieldKind::Vec2 => {
                let fallback = match default {
                    FieldValue::Vec2(v) => v.to_array(),
                    _ => [0.0; 2],
                };
                FieldValue::Vec2(Vec2::from_array(read_floats(json, fallback)?))
            }
            FieldKind::Vec3 => {
                let fallback = match default {
                    FieldValue::Vec3(v) => v.to_array(),
                    _ => [0.0; 3],
                };
                FieldValue::Vec3(Vec3::from_array(read_floats(json, fallback)?))
            }
            FieldKind::Vec4 => {
                let fallback = match default {
                    FieldValue::Vec4(v) => v.to_array(),
                    _ => [0.0; 4],
                };
                FieldValue::Vec4(Vec4::from_array(read_floats(json, fallback)?))
            }
            FieldKind::Mat4 => {
                let fallback = match default {
                    FieldValue::Mat4(m) => mat4_to_row_major(m),
                    _ => mat4_to_row_major(&Mat4::IDENTITY),
                };
                FieldValue::Mat4(mat4_from_row_major(&read_floats(json, fallback)?))
            }
            FieldKind::Ref { .. } => return None,
        })
    }
}

fn float(v: f32) -> Value {
    // Non-finite floats have no JSON form; serde_json maps them to null.
    Value::from(v as f64)
}

fn floats(values: &[f32]) -> Value {
    Value::Array(values.iter().map(|v| float(*v)).collect())
}

fn read_floats<const N: usize>(json: &Value, mut out: [f32; N]) -> Option<[f32; N]> {
    let array = json.as_array()?;
    for (slot, value) in out.iter_mut().zip(array) {
        if let Some(v) = value.as_f64() {
            *slot = v as f32;
        }
    }
    Some(out)
}

type Getter = Box<dyn Fn(&dyn Component) -> Option<FieldValue> + Send + Sync>;
type Setter = Box<dyn Fn(&mut dyn Component, FieldValue) -> bool + Send + Sync>;

/// Reflection record for one component field.
pub struct FieldDescriptor {
    pub(crate) owner: &'static str,
    pub(crate) name: String,
    pub(crate) kind: FieldKind,
    pub(crate) default: FieldValue,
    pub(crate) transient: bool,
    pub(crate) get: Getter,
    pub(crate) set: Setter,
}

impl FieldDescriptor {
    /// Field name as it appears in JSON and property paths.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared kind.
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Value used when a document omits the field.
    pub fn default_value(&self) -> &FieldValue {
        &self.default
    }

    /// Transient fields are reflected but never serialized.
    pub fn is_transient(&self) -> bool {
        self.transient
    }

    /// Exclude this field from serialization.
    pub fn transient(&mut self) -> &mut Self {
        self.transient = true;
        self
    }

    /// Read the field from a component of the owning type.
    pub fn get(&self, component: &dyn Component) -> Result<FieldValue> {
        (self.get)(component).ok_or_else(|| self.mismatch("the owning component type"))
    }

    /// Write the field. Fails if the value has the wrong kind or the
    /// component is not of the owning type.
    pub fn set(&self, component: &mut dyn Component, value: FieldValue) -> Result<()> {
        if !value.matches(&self.kind) {
            return Err(self.mismatch(self.kind.describe()));
        }
        if (self.set)(component, value) {
            Ok(())
        } else {
            Err(self.mismatch("the owning component type"))
        }
    }

    /// Reset the field to its declared default.
    pub fn reset(&self, component: &mut dyn Component) -> Result<()> {
        self.set(component, self.default.clone())
    }

    pub(crate) fn mismatch(&self, expected: &'static str) -> SceneError {
        SceneError::FieldTypeMismatch {
            component: self.owner.to_string(),
            field: self.name.clone(),
            expected,
        }
    }
}

impl std::fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("default", &self.default)
            .field("transient", &self.transient)
            .finish()
    }
}
