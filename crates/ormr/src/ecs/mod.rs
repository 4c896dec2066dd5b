//! # Entity/Component Core
//!
//! The object model is a tree of named entities, each carrying at most one
//! component per capability name.
//!
//! ```text
//!   World
//!   ├── SlotMap<EntityId, EntityRecord>   (arena; handles are versioned)
//!   │     EntityRecord { name, parent, children, components }
//!   └── Arc<RwLock<Registry>>            (name → factory + fields)
//! ```
//!
//! - [`entity`]: handles and the per-entity record.
//! - [`component`]: the [`Component`] contract and typed [`Capability`] names.
//! - [`path`]: parsing of `entity/path:Capability.field` strings.
//! - [`world`]: tree mutation, component attach/lookup and path resolution.
//! - [`hierarchy`]: transform parent resolution and world-matrix updates.

pub mod component;
pub mod entity;
pub mod hierarchy;
pub mod path;
pub mod world;

pub use component::{Capability, Component};
pub use entity::EntityId;
pub use path::{ComponentPath, EntityPath, PropertyPath, Segment};
pub use world::{ComponentKey, World};
