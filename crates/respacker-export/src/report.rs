//! Run report returned by the converter

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use crate::textures::StagedTexture;

/// A recoverable problem that did not stop the run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Object the warning concerns, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    pub message: String,
}

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            object: None,
            message: message.into(),
        }
    }

    pub fn for_object(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            object: Some(object.into()),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.object {
            Some(object) => write!(f, "{}: {}", object, self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Selected object that produced no output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedObject {
    pub name: String,
    pub reason: String,
}

/// Everything a run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportReport {
    pub output_dir: PathBuf,
    /// Descriptor files, in write order
    pub descriptors: Vec<PathBuf>,
    /// OBJ files, one per unique mesh data
    pub meshes: Vec<PathBuf>,
    pub textures: Vec<StagedTexture>,
    pub skipped: Vec<SkippedObject>,
    pub resources_packed: usize,
    pub resources_unpacked: usize,
    pub warnings: Vec<Warning>,
}

impl ExportReport {
    pub fn warn(&mut self, warning: Warning) {
        self.warnings.push(warning);
    }
}
