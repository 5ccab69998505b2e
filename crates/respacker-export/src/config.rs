//! Export configuration
//!
//! Every field has a default, so an empty file (or no file at all) reproduces
//! the stock `dungeon-map` layout and naming conventions.

use std::fs;
use std::path::{Path, PathBuf};

use respacker_core::{Error, Result};
use respacker_scene::resource::LOCAL_UNPACK_DIR;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::SpawnerType;

/// File name looked up next to the scene document
pub const CONFIG_FILE_NAME: &str = "respacker.yaml";

/// What to do when two sources sanitize to the same output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Abort the run
    #[default]
    Error,
    /// Let the later source win, with a warning
    Overwrite,
}

/// Spawner type assigned when the object name contains `contains`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnerRule {
    pub contains: String,
    #[serde(rename = "type")]
    pub spawner_type: SpawnerType,
}

impl SpawnerRule {
    pub fn new(contains: impl Into<String>, spawner_type: SpawnerType) -> Self {
        Self {
            contains: contains.into(),
            spawner_type,
        }
    }
}

/// Export options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Output directory created next to the scene document
    pub output_folder: String,
    /// Mesh subdirectory of the output directory
    pub mesh_folder: String,
    /// Name substring marking spawners
    pub spawner_marker: String,
    /// Name substring marking quest items
    pub quest_item_marker: String,
    /// Custom property that names the export kind explicitly
    pub kind_property: String,
    /// Spawner type rules, first match wins
    pub spawner_types: Vec<SpawnerRule>,
    pub collision_policy: CollisionPolicy,
    /// Delete the texture staging directory after the run
    pub remove_staging: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_folder: "dungeon-map".to_string(),
            mesh_folder: "mesh".to_string(),
            spawner_marker: "Spawner".to_string(),
            quest_item_marker: "QUESTITEM".to_string(),
            kind_property: "export_kind".to_string(),
            spawner_types: vec![
                SpawnerRule::new("Enemy", SpawnerType::Enemy),
                SpawnerRule::new("Goblin", SpawnerType::Goblin),
                SpawnerRule::new("Player", SpawnerType::Player),
                SpawnerRule::new("NPC", SpawnerType::Npc),
            ],
            collision_policy: CollisionPolicy::Error,
            remove_staging: true,
        }
    }
}

impl ExportConfig {
    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| Error::invalid_config(e.to_string()))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let yaml = fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml).map_err(|e| e.with_context(format!("config {}", path.display())))
    }

    /// Load `respacker.yaml` from `scene_dir` if present, defaults otherwise
    pub fn discover(scene_dir: &Path) -> Result<Self> {
        let candidate: PathBuf = scene_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Using discovered config");
            Self::load(candidate)
        } else {
            Ok(Self::default())
        }
    }

    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| Error::invalid_config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("output_folder", &self.output_folder),
            ("mesh_folder", &self.mesh_folder),
        ] {
            if value.is_empty() || value == "." || value == ".." || value.contains(|c: char| c == '/' || c == '\\') {
                return Err(Error::invalid_config(format!(
                    "{field} must be a plain directory name, got '{value}'"
                )));
            }
        }

        // The staging directory is deleted after every run
        if self.output_folder.eq_ignore_ascii_case(LOCAL_UNPACK_DIR) {
            return Err(Error::invalid_config(format!(
                "output_folder '{}' is the texture staging directory",
                self.output_folder
            )));
        }

        for (field, value) in [
            ("spawner_marker", &self.spawner_marker),
            ("quest_item_marker", &self.quest_item_marker),
            ("kind_property", &self.kind_property),
        ] {
            if value.is_empty() {
                return Err(Error::invalid_config(format!("{field} must not be empty")));
            }
        }

        if let Some(rule) = self.spawner_types.iter().find(|r| r.contains.is_empty()) {
            return Err(Error::invalid_config(format!(
                "spawner rule for {} has an empty pattern",
                rule.spawner_type
            )));
        }

        Ok(())
    }
}
