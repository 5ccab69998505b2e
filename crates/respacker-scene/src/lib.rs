//! respacker scene host
//!
//! The exporter talks to the authoring application only through the
//! [`SceneHost`] trait. This crate defines that trait together with the scene
//! model it exchanges (objects, mesh data, materials, resources), an OBJ/MTL
//! writer, and [`MemoryScene`], a host implementation over JSON scene documents.
//!
//! # Example
//! ```no_run
//! use respacker_scene::{MemoryScene, SceneHost};
//!
//! let scene = MemoryScene::load("level1/scene.json").unwrap();
//! for id in scene.selected_objects() {
//!     if let Some(object) = scene.object(id) {
//!         println!("{} ({})", object.name, object.object_type);
//!     }
//! }
//! ```

pub mod document;
pub mod host;
pub mod mesh;
pub mod obj;
pub mod object;
pub mod resource;

pub use document::{MemoryScene, SceneDocument};
pub use host::{ObjExportOptions, ObjExportStats, PathMode, SceneHost};
pub use mesh::{Face, Material, MeshData};
pub use obj::{ObjInstance, ObjWriter};
pub use object::{LightData, LightKind, ObjectData, ObjectId, ObjectType, PropertyValue, SceneObject};
pub use resource::{PackReport, Resource, UnpackMethod};
