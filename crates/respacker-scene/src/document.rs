//! JSON scene documents and the in-memory scene host

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use respacker_core::{Error, Result, ResultExt, Transform};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::host::{ObjExportOptions, ObjExportStats, SceneHost};
use crate::mesh::{Material, MeshData};
use crate::obj::{ObjInstance, ObjWriter};
use crate::object::{ObjectId, SceneObject};
use crate::resource::{self, PackReport, Resource, UnpackMethod};

/// On-disk scene document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    #[serde(default)]
    pub objects: Vec<SceneObject>,
    #[serde(default)]
    pub meshes: Vec<MeshData>,
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    /// Selected object names, in selection order
    #[serde(default)]
    pub selection: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<String>,
}

impl SceneDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::invalid_scene(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::invalid_scene(e.to_string()))
    }
}

/// Scene host backed by an in-memory scene graph
#[derive(Debug, Clone)]
pub struct MemoryScene {
    path: Option<PathBuf>,
    objects: Vec<SceneObject>,
    meshes: BTreeMap<String, MeshData>,
    materials: BTreeMap<String, Material>,
    resources: Vec<Resource>,
    selection: Vec<ObjectId>,
    active: Option<ObjectId>,
}

impl MemoryScene {
    /// Load and validate a JSON scene document
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }

        let json = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let document = SceneDocument::from_json(&json)
            .with_context(|| format!("parsing {}", path.display()))?;

        // Resolve relative resources against an absolute document directory
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        let scene = Self::from_document(document, Some(path))?;

        info!(
            path = %scene.path.as_deref().unwrap_or(Path::new("")).display(),
            objects = scene.objects.len(),
            meshes = scene.meshes.len(),
            selected = scene.selection.len(),
            "Loaded scene"
        );

        Ok(scene)
    }

    /// Build a scene from a decoded document; `path` is `None` for unsaved scenes
    pub fn from_document(document: SceneDocument, path: Option<PathBuf>) -> Result<Self> {
        let mut names = HashSet::new();
        for object in &document.objects {
            if !names.insert(object.name.as_str()) {
                return Err(Error::invalid_scene(format!("duplicate object name '{}'", object.name)));
            }
        }

        let mut meshes = BTreeMap::new();
        for mesh in document.meshes {
            mesh.validate()?;
            let name = mesh.name.clone();
            if meshes.insert(name.clone(), mesh).is_some() {
                return Err(Error::invalid_scene(format!("duplicate mesh name '{name}'")));
            }
        }

        for object in &document.objects {
            if let Some(mesh) = object.mesh_name() {
                if !meshes.contains_key(mesh) {
                    return Err(Error::MeshNotFound { name: mesh.to_string() })
                        .context(format!("object '{}'", object.name));
                }
            }
        }

        let materials = document
            .materials
            .into_iter()
            .map(|m| (m.name.clone(), m))
            .collect();

        let lookup = |name: &str| {
            document
                .objects
                .iter()
                .position(|o| o.name == name)
                .map(ObjectId)
                .ok_or_else(|| Error::ObjectNotFound { name: name.to_string() })
        };

        let mut selection = Vec::new();
        for name in &document.selection {
            let id = lookup(name)?;
            if !selection.contains(&id) {
                selection.push(id);
            }
        }
        let active = document.active.as_deref().map(lookup).transpose()?;

        Ok(Self {
            path,
            objects: document.objects,
            meshes,
            materials,
            resources: document.resources,
            selection,
            active,
        })
    }

    /// Snapshot the current state as a document
    pub fn to_document(&self) -> SceneDocument {
        let name_of = |id: ObjectId| self.objects[id.0].name.clone();
        SceneDocument {
            objects: self.objects.clone(),
            meshes: self.meshes.values().cloned().collect(),
            materials: self.materials.values().cloned().collect(),
            resources: self.resources.clone(),
            selection: self.selection.iter().copied().map(name_of).collect(),
            active: self.active.map(name_of),
        }
    }

    /// Directory containing the document
    pub fn document_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    /// Replace the selection with every object in the scene
    pub fn select_all(&mut self) {
        self.selection = (0..self.objects.len()).map(ObjectId).collect();
    }

    /// Replace the selection with the named objects, in the given order
    pub fn select_names<S: AsRef<str>>(&mut self, names: &[S]) -> Result<()> {
        let mut selection = Vec::with_capacity(names.len());
        for name in names {
            let name = name.as_ref();
            let id = self
                .find_object(name)
                .ok_or_else(|| Error::ObjectNotFound { name: name.to_string() })?;
            if !selection.contains(&id) {
                selection.push(id);
            }
        }
        self.selection = selection;
        Ok(())
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    fn object_mut(&mut self, id: ObjectId) -> Result<&mut SceneObject> {
        self.objects
            .get_mut(id.0)
            .ok_or_else(|| Error::ObjectNotFound { name: id.to_string() })
    }
}

impl SceneHost for MemoryScene {
    fn document_path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn objects(&self) -> Vec<ObjectId> {
        (0..self.objects.len()).map(ObjectId).collect()
    }

    fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.0)
    }

    fn find_object(&self, name: &str) -> Option<ObjectId> {
        self.objects.iter().position(|o| o.name == name).map(ObjectId)
    }

    fn mesh(&self, name: &str) -> Option<&MeshData> {
        self.meshes.get(name)
    }

    fn selected_objects(&self) -> Vec<ObjectId> {
        self.selection.clone()
    }

    fn active_object(&self) -> Option<ObjectId> {
        self.active
    }

    fn set_active_object(&mut self, id: Option<ObjectId>) {
        self.active = id;
    }

    fn select(&mut self, id: ObjectId, selected: bool) {
        if selected {
            if !self.selection.contains(&id) {
                self.selection.push(id);
            }
        } else {
            self.selection.retain(|&s| s != id);
        }
    }

    fn deselect_all(&mut self) {
        self.selection.clear();
    }

    fn world_transform(&self, id: ObjectId) -> Result<Transform> {
        self.object(id)
            .map(|o| o.transform)
            .ok_or_else(|| Error::ObjectNotFound { name: id.to_string() })
    }

    fn set_world_transform(&mut self, id: ObjectId, transform: Transform) -> Result<()> {
        self.object_mut(id)?.transform = transform;
        Ok(())
    }

    fn export_obj(&mut self, path: &Path, options: &ObjExportOptions) -> Result<ObjExportStats> {
        let candidates = if options.selected_only {
            self.selection.clone()
        } else {
            self.objects()
        };

        let mut instances = Vec::new();
        for id in candidates {
            let Some(object) = self.objects.get(id.0) else { continue };
            let Some(mesh) = object.mesh_name().and_then(|name| self.meshes.get(name)) else {
                debug!(object = %object.name, "No mesh data, not exported");
                continue;
            };
            instances.push(ObjInstance {
                name: &object.name,
                mesh,
                world: object.transform.to_matrix(),
            });
        }

        let document_dir = self.path.as_deref().and_then(Path::parent);
        ObjWriter::new(options, &self.materials, &self.resources, document_dir).write(path, &instances)
    }

    fn pack_all(&mut self) -> Result<PackReport> {
        let document_dir = self.path.as_deref().and_then(Path::parent);
        Ok(resource::pack_all(&mut self.resources, document_dir))
    }

    fn unpack_all(&mut self, method: UnpackMethod) -> Result<PackReport> {
        let document_dir = self
            .path
            .as_deref()
            .and_then(Path::parent)
            .ok_or(Error::UnsavedDocument)?
            .to_path_buf();
        resource::unpack_all(&mut self.resources, &document_dir, method)
    }
}
