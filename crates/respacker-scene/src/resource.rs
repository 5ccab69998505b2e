//! Image resources and their packed / external storage

use std::fs;
use std::path::{Path, PathBuf};

use respacker_core::{Result, ResultExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Prefix marking a path relative to the scene document's directory
pub const DOCUMENT_RELATIVE_PREFIX: &str = "//";

/// Directory, next to the document, that local unpacking writes into
pub const LOCAL_UNPACK_DIR: &str = "textures";

/// How packed resources are written back to disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnpackMethod {
    /// Write to `<document dir>/textures/<file name>`, overwriting existing files
    WriteLocal,
    /// Write to `<document dir>/textures/<file name>` unless a file is already there
    UseLocal,
}

/// File-backed image used by materials
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub name: String,
    /// Absolute, cwd-relative, or `//`-prefixed document-relative path
    pub filepath: String,
    /// Bytes embedded in the document, when packed
    #[serde(skip)]
    pub packed: Option<Vec<u8>>,
}

impl Resource {
    pub fn new(name: impl Into<String>, filepath: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            filepath: filepath.into(),
            packed: None,
        }
    }

    pub fn is_packed(&self) -> bool {
        self.packed.is_some()
    }

    /// Bare file name of the resource, falling back to its name
    pub fn file_name(&self) -> String {
        let trimmed = self.filepath.trim_start_matches(DOCUMENT_RELATIVE_PREFIX);
        Path::new(trimmed)
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.name.clone())
    }

    /// Resolve the file path against the document directory
    pub fn resolve(&self, document_dir: Option<&Path>) -> PathBuf {
        match (self.filepath.strip_prefix(DOCUMENT_RELATIVE_PREFIX), document_dir) {
            (Some(rel), Some(dir)) => dir.join(rel),
            (Some(rel), None) => PathBuf::from(rel),
            (None, Some(dir)) if Path::new(&self.filepath).is_relative() => dir.join(&self.filepath),
            (None, _) => PathBuf::from(&self.filepath),
        }
    }
}

/// Outcome of a pack or unpack pass
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackReport {
    /// Resources whose storage changed
    pub processed: Vec<String>,
    /// Resources left untouched, with the reason
    pub skipped: Vec<(String, String)>,
}

/// Embed every external resource. Already packed resources are left alone.
pub fn pack_all(resources: &mut [Resource], document_dir: Option<&Path>) -> PackReport {
    let mut report = PackReport::default();

    for resource in resources.iter_mut().filter(|r| !r.is_packed()) {
        let path = resource.resolve(document_dir);
        match fs::read(&path) {
            Ok(bytes) => {
                debug!(resource = %resource.name, path = %path.display(), size = bytes.len(), "Packed resource");
                resource.packed = Some(bytes);
                report.processed.push(resource.name.clone());
            }
            Err(e) => {
                warn!(resource = %resource.name, path = %path.display(), error = %e, "Cannot pack resource");
                report.skipped.push((resource.name.clone(), e.to_string()));
            }
        }
    }

    report
}

/// Write every packed resource to the local unpack directory and re-point it there
pub fn unpack_all(
    resources: &mut [Resource],
    document_dir: &Path,
    method: UnpackMethod,
) -> Result<PackReport> {
    let mut report = PackReport::default();
    let target_dir = document_dir.join(LOCAL_UNPACK_DIR);

    for resource in resources.iter_mut() {
        let Some(bytes) = resource.packed.take() else {
            report.skipped.push((resource.name.clone(), "not packed".to_string()));
            continue;
        };

        let file_name = resource.file_name();
        let target = target_dir.join(&file_name);

        if !(method == UnpackMethod::UseLocal && target.is_file()) {
            fs::create_dir_all(&target_dir)
                .with_context(|| format!("creating {}", target_dir.display()))?;
            fs::write(&target, &bytes).with_context(|| format!("unpacking {}", resource.name))?;
        }

        debug!(resource = %resource.name, path = %target.display(), "Unpacked resource");
        resource.filepath = format!("{DOCUMENT_RELATIVE_PREFIX}{LOCAL_UNPACK_DIR}/{file_name}");
        report.processed.push(resource.name.clone());
    }

    Ok(report)
}
