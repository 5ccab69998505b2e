//! Wavefront OBJ / MTL writer
//!
//! Backs the [`SceneHost::export_obj`](crate::SceneHost::export_obj) operator of
//! [`MemoryScene`](crate::MemoryScene). Output is deterministic: the same
//! instances and options always produce byte-identical files.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use respacker_core::{Mat4x4, Result, ResultExt, Vec3};
use tracing::{info, warn};

use crate::host::{ObjExportOptions, ObjExportStats, PathMode};
use crate::mesh::{Material, MeshData};
use crate::resource::Resource;

/// `usemtl` name for faces without a material slot
const NO_MATERIAL: &str = "(null)";

/// One object to write: its name, geometry and world matrix
#[derive(Debug, Clone, Copy)]
pub struct ObjInstance<'a> {
    pub name: &'a str,
    pub mesh: &'a MeshData,
    pub world: Mat4x4,
}

/// OBJ writer bound to a scene's materials and resources
pub struct ObjWriter<'a> {
    options: &'a ObjExportOptions,
    materials: &'a BTreeMap<String, Material>,
    resources: &'a [Resource],
    document_dir: Option<&'a Path>,
}

impl<'a> ObjWriter<'a> {
    pub fn new(
        options: &'a ObjExportOptions,
        materials: &'a BTreeMap<String, Material>,
        resources: &'a [Resource],
        document_dir: Option<&'a Path>,
    ) -> Self {
        Self {
            options,
            materials,
            resources,
            document_dir,
        }
    }

    /// Write `instances` to `path`, plus a sibling `.mtl` when materials are used
    pub fn write(&self, path: &Path, instances: &[ObjInstance<'_>]) -> Result<ObjExportStats> {
        let used_materials = self.used_materials(instances);
        let mtl_path = (self.options.write_materials && !used_materials.is_empty())
            .then(|| path.with_extension("mtl"));

        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut out = BufWriter::new(file);

        writeln!(out, "# respacker OBJ export")?;
        if let Some(mtl) = mtl_path.as_ref().and_then(|p| p.file_name()) {
            writeln!(out, "mtllib {}", mtl.to_string_lossy())?;
        }

        let mut stats = ObjExportStats {
            obj_path: path.to_path_buf(),
            mtl_path: mtl_path.clone(),
            ..Default::default()
        };

        // OBJ indices are global and 1-based
        let mut base = 1usize;
        for instance in instances {
            self.write_instance(&mut out, instance, base)?;
            base += instance.mesh.positions.len();
            stats.objects += 1;
            stats.vertices += instance.mesh.positions.len();
            stats.faces += instance.mesh.faces.len();
        }
        out.flush()?;

        if let Some(mtl_path) = &mtl_path {
            self.write_mtl(mtl_path, &used_materials)?;
        }

        info!(
            path = %path.display(),
            objects = stats.objects,
            vertices = stats.vertices,
            faces = stats.faces,
            "Wrote OBJ"
        );

        Ok(stats)
    }

    fn convert_point(&self, world: &Mat4x4, p: Vec3) -> Vec3 {
        let p = world.transform_point(p);
        if self.options.y_up { p.to_y_up() } else { p }
    }

    fn convert_normal(&self, world: &Mat4x4, n: Vec3) -> Vec3 {
        let n = world.transform_normal(n).normalize();
        if self.options.y_up { n.to_y_up() } else { n }
    }

    fn write_instance<W: Write>(&self, out: &mut W, instance: &ObjInstance<'_>, base: usize) -> Result<()> {
        let mesh = instance.mesh;
        writeln!(out, "o {}", instance.name)?;

        for &p in &mesh.positions {
            let p = self.convert_point(&instance.world, p);
            writeln!(out, "v {:.6} {:.6} {:.6}", p.x, p.y, p.z)?;
        }
        if let Some(uvs) = &mesh.uvs {
            for uv in uvs {
                writeln!(out, "vt {:.6} {:.6}", uv[0], uv[1])?;
            }
        }
        if let Some(normals) = &mesh.normals {
            for &n in normals {
                let n = self.convert_normal(&instance.world, n);
                writeln!(out, "vn {:.4} {:.4} {:.4}", n.x, n.y, n.z)?;
            }
        }

        let has_uv = mesh.uvs.is_some();
        let has_normal = mesh.normals.is_some();
        let mut current_material: Option<&str> = None;

        for face in &mesh.faces {
            let material = face.material.and_then(|slot| mesh.materials.get(slot)).map(String::as_str);
            if self.options.write_materials && material != current_material {
                writeln!(out, "usemtl {}", material.unwrap_or(NO_MATERIAL))?;
                current_material = material;
            }

            write!(out, "f")?;
            for &idx in &face.indices {
                let i = base + idx as usize;
                match (has_uv, has_normal) {
                    (false, false) => write!(out, " {i}")?,
                    (true, false) => write!(out, " {i}/{i}")?,
                    (false, true) => write!(out, " {i}//{i}")?,
                    (true, true) => write!(out, " {i}/{i}/{i}")?,
                }
            }
            writeln!(out)?;
        }

        Ok(())
    }

    /// Material names referenced by the instances, in first-use order
    fn used_materials(&self, instances: &[ObjInstance<'_>]) -> Vec<String> {
        let mut used: Vec<String> = Vec::new();
        for instance in instances {
            for face in &instance.mesh.faces {
                if let Some(name) = face.material.and_then(|slot| instance.mesh.materials.get(slot)) {
                    if !used.contains(name) {
                        used.push(name.clone());
                    }
                }
            }
        }
        used
    }

    fn texture_path(&self, resource_name: &str) -> Option<String> {
        let resource = self.resources.iter().find(|r| r.name == resource_name)?;
        Some(match self.options.path_mode {
            PathMode::Strip => resource.file_name(),
            PathMode::Absolute => {
                let resolved: PathBuf = resource.resolve(self.document_dir);
                resolved.display().to_string()
            }
        })
    }

    fn write_mtl(&self, path: &Path, names: &[String]) -> Result<()> {
        let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
        let mut out = BufWriter::new(file);

        writeln!(out, "# respacker MTL export")?;
        for name in names {
            writeln!(out)?;
            writeln!(out, "newmtl {name}")?;

            let Some(material) = self.materials.get(name) else {
                warn!(material = %name, "Material not defined in scene, writing defaults");
                writeln!(out, "Kd 0.800000 0.800000 0.800000")?;
                continue;
            };

            let [r, g, b] = material.diffuse;
            writeln!(out, "Kd {r:.6} {g:.6} {b:.6}")?;

            if let Some(texture) = &material.texture {
                match self.texture_path(texture) {
                    Some(map) => writeln!(out, "map_Kd {map}")?,
                    None => warn!(material = %name, texture = %texture, "Texture resource not found"),
                }
            }
        }
        out.flush()?;

        Ok(())
    }
}
