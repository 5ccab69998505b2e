//! Object classification
//!
//! Each selected object is classified exactly once into an [`ObjectClass`]
//! (or a [`SkipReason`]) before anything is written. An explicit export-kind
//! custom property wins; otherwise the naming conventions apply in fixed
//! precedence: spawner marker, quest item marker, light type, mesh.

use std::fmt;
use std::str::FromStr;

use respacker_scene::{LightKind, ObjectType, SceneObject};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::ExportConfig;
use crate::report::Warning;

/// Gameplay spawner category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SpawnerType {
    Enemy,
    /// Legacy name for enemy spawners
    Goblin,
    Player,
    Npc,
    Unknown,
}

impl SpawnerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnerType::Enemy => "ENEMY",
            SpawnerType::Goblin => "GOBLIN",
            SpawnerType::Player => "PLAYER",
            SpawnerType::Npc => "NPC",
            SpawnerType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SpawnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpawnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENEMY" => Ok(SpawnerType::Enemy),
            "GOBLIN" => Ok(SpawnerType::Goblin),
            "PLAYER" => Ok(SpawnerType::Player),
            "NPC" => Ok(SpawnerType::Npc),
            "UNKNOWN" => Ok(SpawnerType::Unknown),
            _ => Err(format!("Unknown spawner type: {s}")),
        }
    }
}

/// Light sub-types that have a descriptor form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LightType {
    Point,
    Sun,
}

impl LightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LightType::Point => "point",
            LightType::Sun => "sun",
        }
    }
}

impl fmt::Display for LightType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LightType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(LightType::Point),
            "sun" => Ok(LightType::Sun),
            _ => Err(format!("Unknown light type: {s}")),
        }
    }
}

/// Export kind named by the explicit custom property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Spawner,
    QuestItem,
    Light,
    Mesh,
}

impl FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spawner" => Ok(ExportKind::Spawner),
            "quest_item" | "questitem" => Ok(ExportKind::QuestItem),
            "light" => Ok(ExportKind::Light),
            "mesh" => Ok(ExportKind::Mesh),
            other => Err(format!("unknown export kind '{other}'")),
        }
    }
}

/// What an object exports as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObjectClass {
    Spawner { spawner_type: SpawnerType },
    QuestItem,
    Light { light_type: LightType },
    Mesh,
}

impl ObjectClass {
    /// Whether this class carries exported geometry
    pub fn has_mesh(&self) -> bool {
        matches!(self, ObjectClass::QuestItem | ObjectClass::Mesh)
    }
}

impl fmt::Display for ObjectClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectClass::Spawner { spawner_type } => write!(f, "spawner ({spawner_type})"),
            ObjectClass::QuestItem => f.write_str("quest item"),
            ObjectClass::Light { light_type } => write!(f, "light ({light_type})"),
            ObjectClass::Mesh => f.write_str("mesh"),
        }
    }
}

/// Why an object produces no output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No data payload at all
    NoData,
    /// Empty object (transform only)
    EmptyObject,
    /// Light sub-type without a descriptor form
    UnsupportedLight(String),
    /// Classified as mesh or quest item without mesh data
    MissingMesh,
    /// Classified as light without light data
    MissingLight,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NoData => f.write_str("no data"),
            SkipReason::EmptyObject => f.write_str("empty object"),
            SkipReason::UnsupportedLight(kind) => write!(f, "unsupported light type '{kind}'"),
            SkipReason::MissingMesh => f.write_str("no mesh data"),
            SkipReason::MissingLight => f.write_str("no light data"),
        }
    }
}

/// Classification result
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Export(ObjectClass),
    Skip(SkipReason),
}

/// Classifies objects using the configured naming conventions
pub struct Classifier<'a> {
    config: &'a ExportConfig,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a ExportConfig) -> Self {
        Self { config }
    }

    /// Spawner type from the first matching name rule
    pub fn spawner_type(&self, name: &str) -> SpawnerType {
        self.config
            .spawner_types
            .iter()
            .find(|rule| name.contains(rule.contains.as_str()))
            .map(|rule| rule.spawner_type)
            .unwrap_or(SpawnerType::Unknown)
    }

    pub fn classify(&self, object: &SceneObject, warnings: &mut Vec<Warning>) -> Classification {
        if object.data.is_none() {
            return Classification::Skip(SkipReason::NoData);
        }
        if object.object_type == ObjectType::Empty {
            return Classification::Skip(SkipReason::EmptyObject);
        }

        let kind = self
            .explicit_kind(object, warnings)
            .unwrap_or_else(|| self.kind_from_name(object));

        let classification = match kind {
            ExportKind::Spawner => Classification::Export(ObjectClass::Spawner {
                spawner_type: self.spawner_type(&object.name),
            }),
            ExportKind::QuestItem | ExportKind::Mesh if object.mesh_name().is_none() => {
                warn!(object = %object.name, "Classified as mesh but has no mesh data");
                warnings.push(Warning::for_object(&object.name, "classified as mesh but has no mesh data, skipped"));
                Classification::Skip(SkipReason::MissingMesh)
            }
            ExportKind::QuestItem => Classification::Export(ObjectClass::QuestItem),
            ExportKind::Mesh => Classification::Export(ObjectClass::Mesh),
            ExportKind::Light => match object.light().map(|l| &l.kind) {
                Some(LightKind::Point) => Classification::Export(ObjectClass::Light {
                    light_type: LightType::Point,
                }),
                Some(LightKind::Sun) => Classification::Export(ObjectClass::Light {
                    light_type: LightType::Sun,
                }),
                Some(other) => Classification::Skip(SkipReason::UnsupportedLight(other.to_string())),
                None => {
                    warn!(object = %object.name, "Classified as light but has no light data");
                    warnings.push(Warning::for_object(&object.name, "classified as light but has no light data, skipped"));
                    Classification::Skip(SkipReason::MissingLight)
                }
            },
        };

        debug!(object = %object.name, ?classification, "Classified");
        classification
    }

    fn kind_from_name(&self, object: &SceneObject) -> ExportKind {
        if object.name.contains(self.config.spawner_marker.as_str()) {
            ExportKind::Spawner
        } else if object.name.contains(self.config.quest_item_marker.as_str()) {
            ExportKind::QuestItem
        } else if object.object_type == ObjectType::Light {
            ExportKind::Light
        } else {
            ExportKind::Mesh
        }
    }

    fn explicit_kind(&self, object: &SceneObject, warnings: &mut Vec<Warning>) -> Option<ExportKind> {
        let key = self.config.kind_property.as_str();
        if !object.properties.contains_key(key) {
            return None;
        }

        let parsed = object
            .property_text(key)
            .map_err(|e| e.to_string())
            .and_then(|text| text.parse::<ExportKind>());

        match parsed {
            Ok(kind) => Some(kind),
            Err(message) => {
                warn!(object = %object.name, property = key, error = %message, "Ignoring export kind property");
                warnings.push(Warning::for_object(
                    &object.name,
                    format!("ignoring '{key}' property: {message}"),
                ));
                None
            }
        }
    }
}
