//! Texture staging into the mesh directory

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use respacker_core::{Result, ResultExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::report::Warning;

/// A texture copied next to the exported meshes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedTexture {
    pub file_name: String,
    pub path: PathBuf,
    pub size: u64,
    /// Width and height, when the file is a readable image
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<(u32, u32)>,
}

/// Copy every regular file of `source` into `dest`
///
/// Names, permissions and modification times are kept. Anything that is not a
/// regular file is skipped with a warning. A missing `source` is a no-op.
pub fn stage_textures(source: &Path, dest: &Path, warnings: &mut Vec<Warning>) -> Result<Vec<StagedTexture>> {
    if !source.is_dir() {
        debug!(dir = %source.display(), "No texture staging directory");
        return Ok(Vec::new());
    }

    let mut entries = fs::read_dir(source)
        .with_context(|| format!("reading {}", source.display()))?
        .collect::<std::io::Result<Vec<_>>>()
        .with_context(|| format!("reading {}", source.display()))?;
    entries.sort_by_key(|entry| entry.file_name());

    let mut staged = Vec::with_capacity(entries.len());
    for entry in entries {
        let src = entry.path();
        let file_type = entry.file_type().with_context(|| format!("inspecting {}", src.display()))?;
        if !file_type.is_file() {
            warn!(path = %src.display(), "Skipping non-file texture entry");
            warnings.push(Warning::new(format!("skipped non-file entry {}", src.display())));
            continue;
        }

        let file_name = entry.file_name().to_string_lossy().into_owned();
        let dst = dest.join(&file_name);
        let size = fs::copy(&src, &dst)
            .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
        preserve_mtime(&src, &dst);

        let dimensions = image::image_dimensions(&dst).ok();
        match dimensions {
            Some((width, height)) => debug!(texture = %file_name, width, height, "Staged texture"),
            None => debug!(texture = %file_name, "Staged non-image file"),
        }

        staged.push(StagedTexture {
            file_name,
            path: dst,
            size,
            dimensions,
        });
    }

    if !staged.is_empty() {
        info!(count = staged.len(), dest = %dest.display(), "Copied textures to mesh directory");
    }
    Ok(staged)
}

fn preserve_mtime(src: &Path, dst: &Path) {
    let result = fs::metadata(src)
        .and_then(|meta| meta.modified())
        .and_then(|modified| File::options().write(true).open(dst)?.set_modified(modified));

    if let Err(e) = result {
        debug!(path = %dst.display(), error = %e, "Could not preserve modification time");
    }
}
