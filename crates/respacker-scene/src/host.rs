//! Scene host interface
//!
//! The export pipeline never touches a scene graph directly. Everything it
//! needs from the authoring application goes through [`SceneHost`]: document
//! location, the selection model, per-object data, the OBJ export operator and
//! resource packing. [`MemoryScene`](crate::MemoryScene) implements it over a
//! JSON scene document.

use std::path::{Path, PathBuf};

use respacker_core::{Result, Transform};

use crate::mesh::MeshData;
use crate::object::{ObjectId, SceneObject};
use crate::resource::{PackReport, UnpackMethod};

/// How texture paths are written into exported material libraries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathMode {
    /// Bare file names only
    #[default]
    Strip,
    /// Fully resolved paths
    Absolute,
}

/// OBJ export operator options
#[derive(Debug, Clone, PartialEq)]
pub struct ObjExportOptions {
    /// Export only selected objects (otherwise every mesh object in the scene)
    pub selected_only: bool,
    pub path_mode: PathMode,
    /// Convert geometry from Z-up to Y-up on the way out
    pub y_up: bool,
    /// Write a `.mtl` library next to the `.obj` when materials are referenced
    pub write_materials: bool,
}

impl Default for ObjExportOptions {
    fn default() -> Self {
        Self {
            selected_only: true,
            path_mode: PathMode::Strip,
            y_up: true,
            write_materials: true,
        }
    }
}

/// What an OBJ export wrote
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjExportStats {
    pub obj_path: PathBuf,
    pub mtl_path: Option<PathBuf>,
    pub objects: usize,
    pub vertices: usize,
    pub faces: usize,
}

/// Host application services used by the exporter
pub trait SceneHost {
    /// Path of the saved scene document, `None` when it was never saved
    fn document_path(&self) -> Option<&Path>;

    /// All objects in the scene, in document order
    fn objects(&self) -> Vec<ObjectId>;

    fn object(&self, id: ObjectId) -> Option<&SceneObject>;

    /// Look up an object by its unique name
    fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects()
            .into_iter()
            .find(|&id| self.object(id).is_some_and(|o| o.name == name))
    }

    fn mesh(&self, name: &str) -> Option<&MeshData>;

    /// Currently selected objects, in selection order
    fn selected_objects(&self) -> Vec<ObjectId>;

    fn active_object(&self) -> Option<ObjectId>;

    fn set_active_object(&mut self, id: Option<ObjectId>);

    fn select(&mut self, id: ObjectId, selected: bool);

    fn deselect_all(&mut self);

    /// World-space transform of an object
    fn world_transform(&self, id: ObjectId) -> Result<Transform>;

    fn set_world_transform(&mut self, id: ObjectId, transform: Transform) -> Result<()>;

    /// Export geometry to an OBJ file
    fn export_obj(&mut self, path: &Path, options: &ObjExportOptions) -> Result<ObjExportStats>;

    /// Embed every external resource into the document
    fn pack_all(&mut self) -> Result<PackReport>;

    /// Write every embedded resource out to local files
    fn unpack_all(&mut self, method: UnpackMethod) -> Result<PackReport>;
}
