//! Output directory layout next to the scene document

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use respacker_core::{Error, Result, ResultExt};
use respacker_scene::resource::LOCAL_UNPACK_DIR;
use tracing::{debug, info, warn};

use crate::config::ExportConfig;
use crate::naming::clean_name;
use crate::report::Warning;

/// Paths of one export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    scene_dir: PathBuf,
    output_dir: PathBuf,
    mesh_dir: PathBuf,
    staging_dir: PathBuf,
}

impl Workspace {
    /// Compute the layout for a saved document
    ///
    /// Fails with [`Error::UnsavedDocument`] when the document has no path, and
    /// with [`Error::InvalidConfig`] when the output directory would be the
    /// texture staging directory.
    pub fn locate(document_path: Option<&Path>, config: &ExportConfig) -> Result<Self> {
        let document_path = document_path.ok_or(Error::UnsavedDocument)?;
        let scene_dir = document_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        let output_dir = scene_dir.join(&config.output_folder);
        let mesh_dir = output_dir.join(&config.mesh_folder);
        let staging_dir = scene_dir.join(LOCAL_UNPACK_DIR);
        if output_dir == staging_dir {
            return Err(Error::invalid_config(format!(
                "output directory {} is the texture staging directory",
                output_dir.display()
            )));
        }

        Ok(Self {
            scene_dir,
            output_dir,
            mesh_dir,
            staging_dir,
        })
    }

    pub fn scene_dir(&self) -> &Path {
        &self.scene_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn mesh_dir(&self) -> &Path {
        &self.mesh_dir
    }

    /// Directory the host unpacks resources into
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// `<output>/<clean object name>.txt`
    pub fn descriptor_path(&self, object_name: &str) -> PathBuf {
        self.output_dir.join(format!("{}.txt", clean_name(object_name)))
    }

    /// Clean base name and full OBJ path for a mesh data name
    pub fn mesh_path(&self, mesh_name: &str) -> (String, PathBuf) {
        let base = clean_name(mesh_name);
        let path = self.mesh_dir.join(format!("{base}.obj"));
        (base, path)
    }

    /// Empty the output directory (or create it) and ensure the mesh directory exists
    ///
    /// Entries that cannot be removed are reported, not fatal.
    pub fn prepare(&self) -> Result<Vec<Warning>> {
        self.prepare_with(remove_entry)
    }

    fn prepare_with(&self, remove: impl Fn(&Path) -> io::Result<()>) -> Result<Vec<Warning>> {
        let mut warnings = Vec::new();

        if self.output_dir.is_dir() {
            let entries = fs::read_dir(&self.output_dir)
                .with_context(|| format!("reading {}", self.output_dir.display()))?;

            for entry in entries {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(dir = %self.output_dir.display(), error = %e, "Failed to read entry");
                        warnings.push(Warning::new(format!(
                            "failed to read entry in {}: {e}",
                            self.output_dir.display()
                        )));
                        continue;
                    }
                };

                let path = entry.path();
                if let Err(e) = remove(&path) {
                    warn!(path = %path.display(), error = %e, "Failed to delete");
                    warnings.push(Warning::new(format!("failed to delete {}: {e}", path.display())));
                } else {
                    debug!(path = %path.display(), "Deleted");
                }
            }
        } else {
            fs::create_dir_all(&self.output_dir)
                .with_context(|| format!("creating {}", self.output_dir.display()))?;
        }

        fs::create_dir_all(&self.mesh_dir).with_context(|| format!("creating {}", self.mesh_dir.display()))?;
        info!(output = %self.output_dir.display(), "Prepared output directory");

        Ok(warnings)
    }

    /// Delete the texture staging directory if present
    pub fn remove_staging(&self) -> Result<bool> {
        if !self.staging_dir.exists() {
            return Ok(false);
        }
        fs::remove_dir_all(&self.staging_dir)
            .with_context(|| format!("removing {}", self.staging_dir.display()))?;
        info!(dir = %self.staging_dir.display(), "Removed texture staging directory");
        Ok(true)
    }
}

/// Remove a file, symlink or whole directory
fn remove_entry(path: &Path) -> io::Result<()> {
    // symlink_metadata so a link to a directory is unlinked, not followed
    let metadata = fs::symlink_metadata(path)?;
    if metadata.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workspace(dir: &Path) -> Workspace {
        Workspace::locate(Some(&dir.join("level.json")), &ExportConfig::default()).unwrap()
    }

    #[test]
    fn test_locate_requires_path() {
        let err = Workspace::locate(None, &ExportConfig::default()).unwrap_err();
        assert!(matches!(err, Error::UnsavedDocument));
    }

    #[test]
    fn test_locate_rejects_staging_output() {
        let config = ExportConfig {
            output_folder: LOCAL_UNPACK_DIR.to_string(),
            ..Default::default()
        };
        let err = Workspace::locate(Some(Path::new("/maps/crypt/level.json")), &config).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_layout() {
        let ws = workspace(Path::new("/maps/crypt"));
        assert_eq!(ws.output_dir(), Path::new("/maps/crypt/dungeon-map"));
        assert_eq!(ws.mesh_dir(), Path::new("/maps/crypt/dungeon-map/mesh"));
        assert_eq!(ws.staging_dir(), Path::new("/maps/crypt/textures"));
        assert_eq!(
            ws.descriptor_path("Crate.001"),
            Path::new("/maps/crypt/dungeon-map/Crate_001.txt")
        );
        assert_eq!(
            ws.mesh_path("Crate Mesh"),
            ("Crate_Mesh".to_string(), PathBuf::from("/maps/crypt/dungeon-map/mesh/Crate_Mesh.obj"))
        );
    }

    #[test]
    fn test_prepare_creates_tree() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());

        let warnings = ws.prepare().unwrap();
        assert!(warnings.is_empty());
        assert!(ws.mesh_dir().is_dir());
    }

    #[test]
    fn test_prepare_clears_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        fs::create_dir_all(ws.mesh_dir().join("nested")).unwrap();
        fs::write(ws.output_dir().join("Old.txt"), "type: mesh\n").unwrap();
        fs::write(ws.mesh_dir().join("Old.obj"), "o Old\n").unwrap();

        ws.prepare().unwrap();

        assert_eq!(fs::read_dir(ws.output_dir()).unwrap().count(), 1);
        assert_eq!(fs::read_dir(ws.mesh_dir()).unwrap().count(), 0);
    }

    #[cfg(unix)]
    #[test]
    fn test_prepare_unlinks_symlinks_without_following() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        let outside = dir.path().join("shared");
        fs::create_dir_all(&outside).unwrap();
        fs::write(outside.join("keep.png"), b"png").unwrap();
        fs::create_dir_all(ws.output_dir()).unwrap();
        std::os::unix::fs::symlink(&outside, ws.output_dir().join("linked")).unwrap();

        let warnings = ws.prepare().unwrap();

        assert!(warnings.is_empty());
        assert!(fs::symlink_metadata(ws.output_dir().join("linked")).is_err());
        assert!(outside.join("keep.png").is_file());
    }

    #[test]
    fn test_prepare_keeps_going_after_failed_delete() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        fs::create_dir_all(ws.output_dir()).unwrap();
        fs::write(ws.output_dir().join("Locked.txt"), "type: mesh\n").unwrap();
        fs::write(ws.output_dir().join("Old.txt"), "type: mesh\n").unwrap();

        let warnings = ws
            .prepare_with(|path| {
                if path.ends_with("Locked.txt") {
                    Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
                } else {
                    remove_entry(path)
                }
            })
            .unwrap();

        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("Locked.txt"));
        assert!(warnings[0].message.contains("locked"));
        assert!(ws.output_dir().join("Locked.txt").is_file());
        assert!(!ws.output_dir().join("Old.txt").exists());
        assert!(ws.mesh_dir().is_dir());
    }

    #[test]
    fn test_remove_staging() {
        let dir = tempfile::tempdir().unwrap();
        let ws = workspace(dir.path());
        assert!(!ws.remove_staging().unwrap());

        fs::create_dir_all(ws.staging_dir()).unwrap();
        fs::write(ws.staging_dir().join("wood.png"), b"png").unwrap();
        assert!(ws.remove_staging().unwrap());
        assert!(!ws.staging_dir().exists());
    }
}
