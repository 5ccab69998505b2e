//! One OBJ per distinct mesh data

use std::collections::HashMap;
use std::path::PathBuf;

use respacker_core::{Result, ResultExt, Transform};
use respacker_scene::{ObjExportOptions, ObjectId, PathMode, SceneHost};
use tracing::{debug, info};

use crate::config::CollisionPolicy;
use crate::naming::{Claim, NameRegistry};
use crate::workspace::Workspace;

/// Mesh file referenced by a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshFile {
    /// `<base>.obj`, as written into descriptors
    pub file_name: String,
    /// Set when this call wrote a file nobody had claimed before
    pub written: Option<PathBuf>,
}

/// Exports each mesh data once and remembers the file it went to
#[derive(Debug)]
pub struct MeshDeduplicator {
    exported: HashMap<String, String>,
    files: NameRegistry,
    policy: CollisionPolicy,
}

impl MeshDeduplicator {
    pub fn new(policy: CollisionPolicy) -> Self {
        Self {
            exported: HashMap::new(),
            files: NameRegistry::new(),
            policy,
        }
    }

    /// Number of distinct mesh datas exported so far
    pub fn len(&self) -> usize {
        self.exported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exported.is_empty()
    }

    /// Mesh file for `mesh_name`, exporting it through `object` on first use
    ///
    /// The object is exported at the identity transform and is selected and
    /// active while the host exporter runs. Its transform is restored even
    /// when the export fails.
    pub fn export<H: SceneHost + ?Sized>(
        &mut self,
        host: &mut H,
        object: ObjectId,
        mesh_name: &str,
        workspace: &Workspace,
    ) -> Result<MeshFile> {
        if let Some(base) = self.exported.get(mesh_name) {
            debug!(mesh = %mesh_name, file = %base, "Reusing exported mesh");
            return Ok(MeshFile {
                file_name: format!("{base}.obj"),
                written: None,
            });
        }

        let (base, path) = workspace.mesh_path(mesh_name);
        let claim = self.files.claim(mesh_name, &path, self.policy)?;

        let saved = host.world_transform(object)?;
        host.set_world_transform(object, Transform::IDENTITY)?;
        host.set_active_object(Some(object));

        let options = ObjExportOptions {
            path_mode: PathMode::Strip,
            ..Default::default()
        };
        let exported = host
            .export_obj(&path, &options)
            .with_context(|| format!("exporting mesh '{mesh_name}'"));
        let restored = host.set_world_transform(object, saved);

        let stats = exported?;
        restored?;

        info!(
            mesh = %mesh_name,
            path = %path.display(),
            vertices = stats.vertices,
            faces = stats.faces,
            "Exported mesh"
        );

        let file_name = format!("{base}.obj");
        self.exported.insert(mesh_name.to_string(), base);
        Ok(MeshFile {
            file_name,
            written: (claim == Claim::New).then_some(path),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportConfig;
    use respacker_core::{Error, Vec3};
    use respacker_scene::{MemoryScene, SceneDocument};

    fn scene(dir: &std::path::Path) -> MemoryScene {
        let json = r#"{
            "meshes": [
                { "name": "Crate.001", "positions": [[0,0,0],[1,0,0],[1,1,0]], "faces": [[0,1,2]] },
                { "name": "Crate 001", "positions": [[0,0,0],[1,0,0],[1,1,0]], "faces": [[0,1,2]] }
            ],
            "objects": [
                { "name": "A", "type": "mesh", "location": [5, 0, 0], "data": { "mesh": "Crate.001" } },
                { "name": "B", "type": "mesh", "data": { "mesh": "Crate.001" } },
                { "name": "C", "type": "mesh", "data": { "mesh": "Crate 001" } }
            ]
        }"#;
        let document = SceneDocument::from_json(json).unwrap();
        MemoryScene::from_document(document, Some(dir.join("level.json"))).unwrap()
    }

    fn setup() -> (tempfile::TempDir, MemoryScene, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let scene = scene(dir.path());
        let workspace = Workspace::locate(scene.document_path(), &ExportConfig::default()).unwrap();
        workspace.prepare().unwrap();
        (dir, scene, workspace)
    }

    #[test]
    fn test_exports_each_mesh_once() {
        let (_dir, mut scene, workspace) = setup();
        let a = scene.find_object("A").unwrap();
        let b = scene.find_object("B").unwrap();
        let mut dedup = MeshDeduplicator::new(CollisionPolicy::Error);

        scene.select(a, true);
        let first = dedup.export(&mut scene, a, "Crate.001", &workspace).unwrap();
        scene.select(a, false);
        scene.select(b, true);
        let second = dedup.export(&mut scene, b, "Crate.001", &workspace).unwrap();

        assert_eq!(first.file_name, "Crate_001.obj");
        assert_eq!(first.written, Some(workspace.mesh_dir().join("Crate_001.obj")));
        assert_eq!(second.file_name, "Crate_001.obj");
        assert_eq!(second.written, None);
        assert_eq!(dedup.len(), 1);

        // Transform restored, geometry written at the origin
        assert_eq!(scene.world_transform(a).unwrap().location, Vec3::new(5.0, 0.0, 0.0));
        let obj = std::fs::read_to_string(workspace.mesh_dir().join("Crate_001.obj")).unwrap();
        assert!(obj.contains("v 1.000000 0.000000 -1.000000\n"));
        assert_eq!(scene.active_object(), Some(a));
    }

    #[test]
    fn test_file_name_collision() {
        let (_dir, mut scene, workspace) = setup();
        let a = scene.find_object("A").unwrap();
        let c = scene.find_object("C").unwrap();
        let mut dedup = MeshDeduplicator::new(CollisionPolicy::Error);

        scene.select(a, true);
        dedup.export(&mut scene, a, "Crate.001", &workspace).unwrap();
        scene.select(a, false);

        scene.select(c, true);
        let err = dedup.export(&mut scene, c, "Crate 001", &workspace).unwrap_err();
        assert!(matches!(err, Error::NameCollision { .. }));

        let mut lenient = MeshDeduplicator::new(CollisionPolicy::Overwrite);
        lenient.export(&mut scene, c, "Crate.001", &workspace).unwrap();
        let second = lenient.export(&mut scene, c, "Crate 001", &workspace).unwrap();
        assert_eq!(second.file_name, "Crate_001.obj");
        assert_eq!(second.written, None);
    }
}
