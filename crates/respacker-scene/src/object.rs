//! Scene objects, their custom properties and data payloads

use std::collections::BTreeMap;
use std::fmt;

use respacker_core::{Error, Result, Transform};
use serde::{Deserialize, Serialize};

/// Index of an object inside its scene
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub usize);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Object type tag as reported by the authoring tool
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ObjectType {
    Mesh,
    Light,
    Empty,
    /// Any other tag (curve, camera, armature, ...)
    Other(String),
}

impl From<String> for ObjectType {
    fn from(tag: String) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "mesh" => ObjectType::Mesh,
            "light" => ObjectType::Light,
            "empty" | "none" => ObjectType::Empty,
            _ => ObjectType::Other(tag),
        }
    }
}

impl From<ObjectType> for String {
    fn from(tag: ObjectType) -> Self {
        tag.to_string()
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectType::Mesh => f.write_str("mesh"),
            ObjectType::Light => f.write_str("light"),
            ObjectType::Empty => f.write_str("empty"),
            ObjectType::Other(tag) => f.write_str(tag),
        }
    }
}

/// Custom property value attached by scene authors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<PropertyValue>),
}

impl PropertyValue {
    /// Render a scalar property as descriptor text
    ///
    /// Booleans are written `True`/`False`, the spelling existing map
    /// descriptors already carry. Lists have no single-line text form and are
    /// rejected.
    pub fn as_text(&self) -> std::result::Result<String, String> {
        match self {
            PropertyValue::Bool(true) => Ok("True".to_string()),
            PropertyValue::Bool(false) => Ok("False".to_string()),
            PropertyValue::Int(i) => Ok(i.to_string()),
            PropertyValue::Float(v) if v.is_finite() && v.fract() == 0.0 => Ok(format!("{v:.1}")),
            PropertyValue::Float(v) => Ok(v.to_string()),
            PropertyValue::Str(s) if s.contains('\n') => {
                Err("value spans multiple lines".to_string())
            }
            PropertyValue::Str(s) => Ok(s.clone()),
            PropertyValue::List(items) => Err(format!("expected a scalar, found a list of {}", items.len())),
        }
    }
}

/// Light sub-type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LightKind {
    Point,
    Sun,
    Spot,
    Area,
    Other(String),
}

impl From<String> for LightKind {
    fn from(tag: String) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "point" => LightKind::Point,
            "sun" => LightKind::Sun,
            "spot" => LightKind::Spot,
            "area" => LightKind::Area,
            _ => LightKind::Other(tag),
        }
    }
}

impl From<LightKind> for String {
    fn from(kind: LightKind) -> Self {
        kind.to_string()
    }
}

impl fmt::Display for LightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LightKind::Point => f.write_str("point"),
            LightKind::Sun => f.write_str("sun"),
            LightKind::Spot => f.write_str("spot"),
            LightKind::Area => f.write_str("area"),
            LightKind::Other(tag) => f.write_str(tag),
        }
    }
}

/// Light payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LightData {
    pub kind: LightKind,
    /// Linear RGB, 0.0-1.0
    #[serde(default = "default_light_color")]
    pub color: [f32; 3],
    /// Watts for point lights, irradiance for suns
    #[serde(default)]
    pub energy: f32,
}

fn default_light_color() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}

/// Data payload of an object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectData {
    /// Reference to shared mesh data by name
    Mesh(String),
    Light(LightData),
    /// Payload the exporter has no use for (curve, camera, ...), named
    Other(String),
}

/// Scene object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    pub name: String,
    #[serde(rename = "type")]
    pub object_type: ObjectType,
    #[serde(flatten)]
    pub transform: Transform,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ObjectData>,
}

impl SceneObject {
    pub fn new(name: impl Into<String>, object_type: ObjectType) -> Self {
        Self {
            name: name.into(),
            object_type,
            transform: Transform::IDENTITY,
            properties: BTreeMap::new(),
            data: None,
        }
    }

    pub fn with_data(mut self, data: ObjectData) -> Self {
        self.data = Some(data);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: PropertyValue) -> Self {
        self.properties.insert(key.into(), value);
        self
    }

    /// Name of the referenced mesh data, if any
    pub fn mesh_name(&self) -> Option<&str> {
        match &self.data {
            Some(ObjectData::Mesh(name)) => Some(name),
            _ => None,
        }
    }

    pub fn light(&self) -> Option<&LightData> {
        match &self.data {
            Some(ObjectData::Light(light)) => Some(light),
            _ => None,
        }
    }

    /// Read a custom property as descriptor text
    pub fn property_text(&self, key: &str) -> Result<String> {
        let value = self.properties.get(key).ok_or_else(|| Error::MissingProperty {
            object: self.name.clone(),
            key: key.to_string(),
        })?;

        value.as_text().map_err(|message| Error::MalformedProperty {
            object: self.name.clone(),
            key: key.to_string(),
            message,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_type_tags() {
        assert_eq!(ObjectType::from("MESH".to_string()), ObjectType::Mesh);
        assert_eq!(ObjectType::from("none".to_string()), ObjectType::Empty);
        assert_eq!(
            ObjectType::from("curve".to_string()),
            ObjectType::Other("curve".to_string())
        );
        assert_eq!(ObjectType::Other("curve".into()).to_string(), "curve");
    }

    #[test]
    fn test_property_text() {
        assert_eq!(PropertyValue::Int(7).as_text().unwrap(), "7");
        assert_eq!(PropertyValue::Float(3.0).as_text().unwrap(), "3.0");
        assert_eq!(PropertyValue::Float(0.25).as_text().unwrap(), "0.25");
        assert_eq!(PropertyValue::Str("Gate Key".into()).as_text().unwrap(), "Gate Key");
        assert_eq!(PropertyValue::Bool(true).as_text().unwrap(), "True");
        assert_eq!(PropertyValue::Bool(false).as_text().unwrap(), "False");
        assert!(PropertyValue::List(vec![]).as_text().is_err());
        assert!(PropertyValue::Str("a\nb".into()).as_text().is_err());
    }

    #[test]
    fn test_property_lookup_errors() {
        let obj = SceneObject::new("Spawner_Goblin", ObjectType::Mesh)
            .with_property("spawner_name", PropertyValue::List(vec![PropertyValue::Int(1)]));

        assert!(matches!(
            obj.property_text("spawner_name"),
            Err(Error::MalformedProperty { .. })
        ));
        assert!(matches!(
            obj.property_text("quest_id"),
            Err(Error::MissingProperty { .. })
        ));
    }

    #[test]
    fn test_object_json() {
        let json = r#"{
            "name": "Torch",
            "type": "light",
            "location": [1, 2, 3],
            "data": { "light": { "kind": "POINT", "color": [1.0, 0.5, 0.0], "energy": 100 } }
        }"#;
        let obj: SceneObject = serde_json::from_str(json).unwrap();

        assert_eq!(obj.object_type, ObjectType::Light);
        assert_eq!(obj.transform.location.z, 3.0);
        assert_eq!(obj.transform.scale, respacker_core::Vec3::ONE);
        assert_eq!(obj.light().map(|l| &l.kind), Some(&LightKind::Point));
    }
}
