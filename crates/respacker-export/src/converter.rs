//! Export run orchestration
//!
//! A [`Converter`] drives one scene through the whole pipeline:
//!
//! 1. capture the selection and active object
//! 2. locate and empty the output directory
//! 3. materialize resources and stage textures next to the meshes
//! 4. walk the captured selection, classifying each object once and writing
//!    its descriptor (and mesh, on first use of the mesh data)
//! 5. restore selection and active object, re-pack resources and remove the
//!    staging directory
//!
//! Step 5 runs whether or not the walk succeeded.

use std::fs;

use respacker_core::{Result, ResultExt};
use respacker_scene::{ObjectId, SceneHost, SceneObject};
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::classify::{Classification, Classifier, ObjectClass};
use crate::config::ExportConfig;
use crate::dedup::MeshDeduplicator;
use crate::descriptor::Descriptor;
use crate::materialize;
use crate::naming::{clean_name, NameRegistry};
use crate::report::{ExportReport, SkippedObject, Warning};
use crate::textures::stage_textures;
use crate::workspace::Workspace;

/// What a run would do with one selected object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanEntry {
    pub object: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ObjectClass>,
    /// Descriptor file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor: Option<String>,
    /// Mesh file name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mesh: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_reason: Option<String>,
}

/// Classification of the current selection, without touching the filesystem
#[derive(Debug, Clone, Default, Serialize)]
pub struct Plan {
    pub entries: Vec<PlanEntry>,
    pub warnings: Vec<Warning>,
}

/// Scene to dungeon-map converter
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ExportConfig,
}

impl Converter {
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Classify the selection the way [`Converter::run`] would
    pub fn plan<H: SceneHost + ?Sized>(&self, host: &H) -> Plan {
        let classifier = Classifier::new(&self.config);
        let mut plan = Plan::default();

        for id in host.selected_objects() {
            let Some(object) = host.object(id) else {
                continue;
            };

            let entry = match classifier.classify(object, &mut plan.warnings) {
                Classification::Export(class) => PlanEntry {
                    object: object.name.clone(),
                    class: Some(class),
                    descriptor: Some(format!("{}.txt", clean_name(&object.name))),
                    mesh: class
                        .has_mesh()
                        .then(|| object.mesh_name())
                        .flatten()
                        .map(|mesh| format!("{}.obj", clean_name(mesh))),
                    skip_reason: None,
                },
                Classification::Skip(reason) => PlanEntry {
                    object: object.name.clone(),
                    class: None,
                    descriptor: None,
                    mesh: None,
                    skip_reason: Some(reason.to_string()),
                },
            };
            plan.entries.push(entry);
        }

        plan
    }

    /// Run the export
    ///
    /// Fails before touching anything when the document was never saved.
    /// Once the walk has started, selection, packing and staging are restored
    /// before any walk error is returned.
    pub fn run<H: SceneHost + ?Sized>(&self, host: &mut H) -> Result<ExportReport> {
        let selection = host.selected_objects();
        let active = host.active_object();

        let workspace = Workspace::locate(host.document_path(), &self.config)?;
        let mut report = ExportReport {
            output_dir: workspace.output_dir().to_path_buf(),
            ..Default::default()
        };
        report.warnings.extend(workspace.prepare()?);

        info!(
            objects = selection.len(),
            output = %workspace.output_dir().display(),
            "Starting export"
        );

        host.deselect_all();
        let walked = self.walk(host, &workspace, &selection, &mut report);
        let cleaned = self.cleanup(host, &workspace, &selection, active, &mut report);

        match (walked, cleaned) {
            (Err(e), Err(cleanup)) => {
                error!(error = %cleanup, "Cleanup failed after export error");
                Err(e)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => {
                info!(
                    descriptors = report.descriptors.len(),
                    meshes = report.meshes.len(),
                    textures = report.textures.len(),
                    skipped = report.skipped.len(),
                    warnings = report.warnings.len(),
                    "Export completed"
                );
                Ok(report)
            }
        }
    }

    fn walk<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        workspace: &Workspace,
        selection: &[ObjectId],
        report: &mut ExportReport,
    ) -> Result<()> {
        materialize::materialize(host, report)?;
        report.textures = stage_textures(workspace.staging_dir(), workspace.mesh_dir(), &mut report.warnings)?;

        let classifier = Classifier::new(&self.config);
        let mut meshes = MeshDeduplicator::new(self.config.collision_policy);
        let mut descriptors = NameRegistry::new();

        for &id in selection {
            let Some(object) = host.object(id).cloned() else {
                warn!(object = %id, "Selected object vanished");
                continue;
            };

            host.select(id, true);
            let exported = self.export_object(
                host,
                id,
                &object,
                &classifier,
                &mut meshes,
                &mut descriptors,
                workspace,
                report,
            );
            host.select(id, false);
            exported?;
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn export_object<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        id: ObjectId,
        object: &SceneObject,
        classifier: &Classifier<'_>,
        meshes: &mut MeshDeduplicator,
        descriptors: &mut NameRegistry,
        workspace: &Workspace,
        report: &mut ExportReport,
    ) -> Result<()> {
        let class = match classifier.classify(object, &mut report.warnings) {
            Classification::Export(class) => class,
            Classification::Skip(reason) => {
                debug!(object = %object.name, %reason, "Skipped");
                report.skipped.push(SkippedObject {
                    name: object.name.clone(),
                    reason: reason.to_string(),
                });
                return Ok(());
            }
        };

        let path = workspace.descriptor_path(&object.name);
        descriptors.claim(&object.name, &path, self.config.collision_policy)?;

        let descriptor = match class {
            ObjectClass::Spawner { spawner_type } => Descriptor::spawner(object, spawner_type, &mut report.warnings),
            ObjectClass::Light { light_type } => match Descriptor::light(object, light_type) {
                Some(descriptor) => descriptor,
                None => return Ok(()),
            },
            ObjectClass::QuestItem | ObjectClass::Mesh => {
                let Some(mesh_name) = object.mesh_name() else {
                    return Ok(());
                };
                let mesh = meshes.export(host, id, mesh_name, workspace)?;
                if let Some(written) = mesh.written {
                    report.meshes.push(written);
                }
                if class == ObjectClass::QuestItem {
                    Descriptor::quest_item(object, mesh.file_name, &mut report.warnings)
                } else {
                    Descriptor::mesh(object, mesh.file_name)
                }
            }
        };

        fs::write(&path, descriptor.render()).with_context(|| format!("writing {}", path.display()))?;
        info!(object = %object.name, kind = descriptor.kind(), path = %path.display(), "Exported descriptor");
        report.descriptors.push(path);
        Ok(())
    }

    fn cleanup<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        workspace: &Workspace,
        selection: &[ObjectId],
        active: Option<ObjectId>,
        report: &mut ExportReport,
    ) -> Result<()> {
        host.deselect_all();
        for &id in selection {
            host.select(id, true);
        }
        host.set_active_object(active);

        materialize::restore(host, workspace, self.config.remove_staging, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use respacker_core::Error;
    use respacker_scene::{MemoryScene, SceneDocument};

    const SCENE: &str = r#"{
        "meshes": [
            { "name": "Cube", "positions": [[0,0,0],[1,0,0],[1,1,0]], "faces": [[0,1,2]] }
        ],
        "objects": [
            { "name": "Crate.001", "type": "mesh", "location": [1, 2, 3], "data": { "mesh": "Cube" } },
            { "name": "Spawner_Goblin", "type": "empty", "data": { "other": "marker" } },
            { "name": "Spawner_Player", "type": "mesh", "data": { "mesh": "Cube" } },
            { "name": "QUESTITEM_Key", "type": "mesh", "data": { "mesh": "Cube" } },
            { "name": "Lamp", "type": "light", "data": { "light": { "kind": "spot", "energy": 5 } } }
        ],
        "selection": ["Crate.001", "Spawner_Goblin", "Spawner_Player", "QUESTITEM_Key", "Lamp"]
    }"#;

    fn scene() -> MemoryScene {
        MemoryScene::from_document(SceneDocument::from_json(SCENE).unwrap(), None).unwrap()
    }

    #[test]
    fn test_plan() {
        let plan = Converter::default().plan(&scene());
        let summary: Vec<_> = plan
            .entries
            .iter()
            .map(|e| (e.object.as_str(), e.class.map(|c| c.to_string()), e.mesh.as_deref()))
            .collect();

        assert_eq!(
            summary,
            vec![
                ("Crate.001", Some("mesh".to_string()), Some("Cube.obj")),
                ("Spawner_Goblin", None, None),
                ("Spawner_Player", Some("spawner (PLAYER)".to_string()), None),
                ("QUESTITEM_Key", Some("quest item".to_string()), Some("Cube.obj")),
                ("Lamp", None, None),
            ]
        );
        assert_eq!(plan.entries[1].skip_reason.as_deref(), Some("empty object"));
        assert_eq!(plan.entries[0].descriptor.as_deref(), Some("Crate_001.txt"));
    }

    #[test]
    fn test_unsaved_document_is_fatal() {
        let mut scene = scene();
        let err = Converter::default().run(&mut scene).unwrap_err();
        assert!(matches!(err, Error::UnsavedDocument));
        assert_eq!(scene.selected_objects().len(), 5);
    }
}
