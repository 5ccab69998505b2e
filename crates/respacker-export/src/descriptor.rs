//! Instance descriptors
//!
//! One plaintext record per exported object, line-oriented `key: value` with
//! no escaping. Vectors are stored already converted to Y-up and written as
//! three space-separated floats with six decimals.

use std::fmt::Write as _;
use std::str::FromStr;

use respacker_core::{Color, Error, Result, Vec3};
use respacker_scene::SceneObject;
use serde::Serialize;
use tracing::warn;

use crate::classify::{LightType, SpawnerType};
use crate::report::Warning;

/// Spawner name written when the property is absent or malformed
pub const SPAWNER_NAME_NOT_FOUND: &str = "NOT_FOUND";
/// Quest field value written when the property is absent or malformed
pub const QUEST_FIELD_ERROR: &str = "ERROR";

pub const SPAWNER_NAME_PROPERTY: &str = "spawner_name";
pub const QUEST_ID_PROPERTY: &str = "quest_id";
pub const QUEST_ITEM_NAME_PROPERTY: &str = "quest_item_name";

/// A parsed or to-be-written descriptor record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Descriptor {
    Spawner {
        name: String,
        location: Vec3,
        rotation: Vec3,
        spawner_type: SpawnerType,
        spawner_name: String,
    },
    Light {
        light_type: LightType,
        name: String,
        location: Vec3,
        color: Color,
        strength: i64,
    },
    QuestItem {
        name: String,
        mesh: String,
        location: Vec3,
        rotation: Vec3,
        scale: Vec3,
        quest_id: String,
        quest_item_name: String,
    },
    Mesh {
        name: String,
        mesh: String,
        location: Vec3,
        rotation: Vec3,
        scale: Vec3,
    },
}

impl Descriptor {
    /// Spawner record; player spawners are always named `PLAYER`
    pub fn spawner(object: &SceneObject, spawner_type: SpawnerType, warnings: &mut Vec<Warning>) -> Self {
        let spawner_name = if spawner_type == SpawnerType::Player {
            SpawnerType::Player.to_string()
        } else {
            property_or(object, SPAWNER_NAME_PROPERTY, SPAWNER_NAME_NOT_FOUND, warnings)
        };

        Descriptor::Spawner {
            name: object.name.clone(),
            location: object.transform.location.to_y_up(),
            rotation: object.transform.rotation.to_y_up(),
            spawner_type,
            spawner_name,
        }
    }

    /// Light record, `None` when the object carries no light data
    pub fn light(object: &SceneObject, light_type: LightType) -> Option<Self> {
        let light = object.light()?;
        Some(Descriptor::Light {
            light_type,
            name: object.name.clone(),
            location: object.transform.location.to_y_up(),
            color: Color::from_normalized(light.color),
            strength: light.energy as i64,
        })
    }

    pub fn quest_item(object: &SceneObject, mesh: impl Into<String>, warnings: &mut Vec<Warning>) -> Self {
        let quest_id = property_or(object, QUEST_ID_PROPERTY, QUEST_FIELD_ERROR, warnings);
        let quest_item_name = property_or(object, QUEST_ITEM_NAME_PROPERTY, QUEST_FIELD_ERROR, warnings);

        Descriptor::QuestItem {
            name: object.name.clone(),
            mesh: mesh.into(),
            location: object.transform.location.to_y_up(),
            rotation: object.transform.rotation.to_y_up(),
            scale: object.transform.scale.scale_to_y_up(),
            quest_id,
            quest_item_name,
        }
    }

    pub fn mesh(object: &SceneObject, mesh: impl Into<String>) -> Self {
        Descriptor::Mesh {
            name: object.name.clone(),
            mesh: mesh.into(),
            location: object.transform.location.to_y_up(),
            rotation: object.transform.rotation.to_y_up(),
            scale: object.transform.scale.scale_to_y_up(),
        }
    }

    /// Value of the `type` field
    pub fn kind(&self) -> &'static str {
        match self {
            Descriptor::Spawner { .. } => "spawner",
            Descriptor::Light { .. } => "light",
            Descriptor::QuestItem { .. } => "quest_item",
            Descriptor::Mesh { .. } => "mesh",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Descriptor::Spawner { name, .. }
            | Descriptor::Light { name, .. }
            | Descriptor::QuestItem { name, .. }
            | Descriptor::Mesh { name, .. } => name,
        }
    }

    /// Referenced mesh file, for mesh-bearing records
    pub fn mesh_file(&self) -> Option<&str> {
        match self {
            Descriptor::QuestItem { mesh, .. } | Descriptor::Mesh { mesh, .. } => Some(mesh),
            _ => None,
        }
    }

    /// Render the record, fields in their fixed order
    pub fn render(&self) -> String {
        let mut out = String::new();
        let mut field = |key: &str, value: &dyn std::fmt::Display| {
            // Writing into a String cannot fail
            let _ = writeln!(out, "{key}: {value}");
        };

        field("type", &self.kind());
        match self {
            Descriptor::Spawner {
                name,
                location,
                rotation,
                spawner_type,
                spawner_name,
            } => {
                field("name", name);
                field("location", &format_vec3(location));
                field("rotation", &format_vec3(rotation));
                field("spawner_type", spawner_type);
                field("spawner_name", spawner_name);
            }
            Descriptor::Light {
                light_type,
                name,
                location,
                color,
                strength,
            } => {
                field("light_type", light_type);
                field("name", name);
                field("location", &format_vec3(location));
                field("color", &format!("{} {} {}", color.r, color.g, color.b));
                field("strength", strength);
            }
            Descriptor::QuestItem {
                name,
                mesh,
                location,
                rotation,
                scale,
                quest_id,
                quest_item_name,
            } => {
                field("name", name);
                field("mesh", mesh);
                field("location", &format_vec3(location));
                field("rotation", &format_vec3(rotation));
                field("scale", &format_vec3(scale));
                field("quest_id", quest_id);
                field("quest_item_name", quest_item_name);
            }
            Descriptor::Mesh {
                name,
                mesh,
                location,
                rotation,
                scale,
            } => {
                field("name", name);
                field("mesh", mesh);
                field("location", &format_vec3(location));
                field("rotation", &format_vec3(rotation));
                field("scale", &format_vec3(scale));
            }
        }
        out
    }

    /// Parse a descriptor file back into a record
    pub fn parse(text: &str) -> Result<Self> {
        let mut fields = Fields::parse(text)?;

        let (line, kind) = fields.take("type")?;
        let descriptor = match kind {
            "spawner" => Descriptor::Spawner {
                name: fields.text("name")?,
                location: fields.vec3("location")?,
                rotation: fields.vec3("rotation")?,
                spawner_type: fields.value("spawner_type")?,
                spawner_name: fields.text("spawner_name")?,
            },
            "light" => Descriptor::Light {
                light_type: fields.value("light_type")?,
                name: fields.text("name")?,
                location: fields.vec3("location")?,
                color: fields.color("color")?,
                strength: fields.value("strength")?,
            },
            "quest_item" => Descriptor::QuestItem {
                name: fields.text("name")?,
                mesh: fields.text("mesh")?,
                location: fields.vec3("location")?,
                rotation: fields.vec3("rotation")?,
                scale: fields.vec3("scale")?,
                quest_id: fields.text("quest_id")?,
                quest_item_name: fields.text("quest_item_name")?,
            },
            "mesh" => Descriptor::Mesh {
                name: fields.text("name")?,
                mesh: fields.text("mesh")?,
                location: fields.vec3("location")?,
                rotation: fields.vec3("rotation")?,
                scale: fields.vec3("scale")?,
            },
            other => {
                return Err(Error::InvalidDescriptor {
                    line,
                    message: format!("unknown type '{other}'"),
                })
            }
        };

        fields.finish()?;
        Ok(descriptor)
    }
}

impl FromStr for Descriptor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// `x y z` with six decimals each
pub fn format_vec3(v: &Vec3) -> String {
    format!("{:.6} {:.6} {:.6}", v.x, v.y, v.z)
}

fn property_or(object: &SceneObject, key: &str, sentinel: &str, warnings: &mut Vec<Warning>) -> String {
    match object.property_text(key) {
        Ok(text) => text,
        Err(e) => {
            warn!(object = %object.name, property = key, error = %e, "Using {}", sentinel);
            warnings.push(Warning::for_object(&object.name, format!("{e}, wrote {sentinel}")));
            sentinel.to_string()
        }
    }
}

/// `key: value` lines with their 1-based line numbers, consumed in order
struct Fields<'a> {
    entries: Vec<(usize, &'a str, &'a str)>,
    next: usize,
    last_line: usize,
}

impl<'a> Fields<'a> {
    fn parse(text: &'a str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut last_line = 0;

        for (index, raw) in text.lines().enumerate() {
            let line = index + 1;
            last_line = line;
            if raw.trim().is_empty() {
                continue;
            }
            let (key, value) = raw.split_once(':').ok_or_else(|| Error::InvalidDescriptor {
                line,
                message: format!("expected 'key: value', found '{raw}'"),
            })?;
            entries.push((line, key.trim(), value.strip_prefix(' ').unwrap_or(value)));
        }

        Ok(Self {
            entries,
            next: 0,
            last_line,
        })
    }

    fn take(&mut self, key: &str) -> Result<(usize, &'a str)> {
        match self.entries.get(self.next) {
            Some(&(line, found, value)) if found == key => {
                self.next += 1;
                Ok((line, value))
            }
            Some(&(line, found, _)) => Err(Error::InvalidDescriptor {
                line,
                message: format!("expected field '{key}', found '{found}'"),
            }),
            None => Err(Error::InvalidDescriptor {
                line: self.last_line + 1,
                message: format!("missing field '{key}'"),
            }),
        }
    }

    fn text(&mut self, key: &str) -> Result<String> {
        self.take(key).map(|(_, value)| value.to_string())
    }

    fn value<T>(&mut self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        let (line, value) = self.take(key)?;
        value.trim().parse().map_err(|e: T::Err| Error::InvalidDescriptor {
            line,
            message: format!("bad {key}: {e}"),
        })
    }

    fn numbers<T>(&mut self, key: &str) -> Result<[T; 3]>
    where
        T: FromStr + Copy + Default,
    {
        let (line, value) = self.take(key)?;
        let bad = || Error::InvalidDescriptor {
            line,
            message: format!("bad {key}: expected three numbers, found '{value}'"),
        };

        let mut out = [T::default(); 3];
        let mut parts = value.split_whitespace();
        for slot in out.iter_mut() {
            *slot = parts.next().and_then(|p| p.parse().ok()).ok_or_else(bad)?;
        }
        if parts.next().is_some() {
            return Err(bad());
        }
        Ok(out)
    }

    fn vec3(&mut self, key: &str) -> Result<Vec3> {
        self.numbers::<f32>(key).map(Vec3::from)
    }

    fn color(&mut self, key: &str) -> Result<Color> {
        let [r, g, b] = self.numbers::<u8>(key)?;
        Ok(Color::rgb(r, g, b))
    }

    fn finish(self) -> Result<()> {
        match self.entries.get(self.next) {
            Some(&(line, key, _)) => Err(Error::InvalidDescriptor {
                line,
                message: format!("unexpected field '{key}'"),
            }),
            None => Ok(()),
        }
    }
}
