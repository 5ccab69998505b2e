//! respacker export pipeline
//!
//! Converts the selected objects of a scene into a `dungeon-map` bundle: one
//! plaintext descriptor per object, one OBJ per distinct mesh data, and the
//! textures those meshes reference. All vectors are converted from the
//! authoring tool's Z-up convention to the engine's Y-up convention.
//!
//! # Example
//! ```no_run
//! use respacker_export::{Converter, ExportConfig};
//! use respacker_scene::MemoryScene;
//!
//! let mut scene = MemoryScene::load("level1/scene.json").unwrap();
//! let report = Converter::new(ExportConfig::default()).run(&mut scene).unwrap();
//! println!("wrote {} descriptors", report.descriptors.len());
//! ```

pub mod classify;
pub mod config;
pub mod converter;
pub mod dedup;
pub mod descriptor;
pub mod materialize;
pub mod naming;
pub mod report;
pub mod textures;
pub mod workspace;

pub use classify::{Classification, Classifier, LightType, ObjectClass, SkipReason, SpawnerType};
pub use config::{CollisionPolicy, ExportConfig, SpawnerRule, CONFIG_FILE_NAME};
pub use converter::{Converter, Plan, PlanEntry};
pub use dedup::{MeshDeduplicator, MeshFile};
pub use descriptor::Descriptor;
pub use naming::clean_name;
pub use report::{ExportReport, SkippedObject, Warning};
pub use textures::StagedTexture;
pub use workspace::Workspace;
