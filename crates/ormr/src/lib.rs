//! # Ormr — Entity/Component Object Model
//!
//! A tree of named entities carrying typed components, addressed by
//! filesystem-like paths, reflected through a name-keyed registry and
//! serialized as JSON. Spatial components form a transform hierarchy with
//! lazily recomputed world matrices.
//!
//! ```text
//!   World ── owns ──▶ entity tree ── each entity ──▶ { capability → component }
//!     │                                                   │
//!     └── Registry (name → factory, fields, aliases) ◀────┘ create / reflect
//! ```
//!
//! Start with `use ormr::prelude::*`:
//!
//! ```ignore
//! let mut world = World::new();
//! let scene = world.spawn("scene");
//! let key = world.make_path_to_component(scene, "car/wheel:TransformNode")?;
//! world.update_transforms(scene)?;
//! ```

pub mod components;
pub mod config;
pub mod ecs;
pub mod error;
pub mod math;
pub mod prelude;
pub mod registry;
pub mod scene;

pub use config::WorldConfig;
pub use error::{Result, SceneError};
