//! Shared mesh data and materials

use respacker_core::{Error, Result, Vec3};
use serde::{Deserialize, Serialize};

/// Polygon face
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "FaceRepr", into = "FaceRepr")]
pub struct Face {
    /// Vertex indices, counter-clockwise, at least three
    pub indices: Vec<u32>,
    /// Index into the owning mesh's material slots
    pub material: Option<usize>,
}

// Faces are usually written as bare index arrays; the object form carries a material slot.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FaceRepr {
    Indices(Vec<u32>),
    Full {
        indices: Vec<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        material: Option<usize>,
    },
}

impl From<FaceRepr> for Face {
    fn from(repr: FaceRepr) -> Self {
        match repr {
            FaceRepr::Indices(indices) => Face { indices, material: None },
            FaceRepr::Full { indices, material } => Face { indices, material },
        }
    }
}

impl From<Face> for FaceRepr {
    fn from(face: Face) -> Self {
        match face.material {
            None => FaceRepr::Indices(face.indices),
            material => FaceRepr::Full {
                indices: face.indices,
                material,
            },
        }
    }
}

/// Geometry shared by one or more objects
///
/// Normals and UVs, when present, are per vertex and parallel to `positions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<Vec3>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normals: Option<Vec<Vec3>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uvs: Option<Vec<[f32; 2]>>,
    pub faces: Vec<Face>,
    /// Material slot names
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub materials: Vec<String>,
}

impl MeshData {
    /// Check attribute lengths, face arity and index ranges
    pub fn validate(&self) -> Result<()> {
        let count = self.positions.len();
        let invalid = |message: String| Error::invalid_scene(format!("mesh '{}': {}", self.name, message));

        if let Some(normals) = &self.normals {
            if normals.len() != count {
                return Err(invalid(format!("{} normals for {} vertices", normals.len(), count)));
            }
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != count {
                return Err(invalid(format!("{} uvs for {} vertices", uvs.len(), count)));
            }
        }

        for (i, face) in self.faces.iter().enumerate() {
            if face.indices.len() < 3 {
                return Err(invalid(format!("face {} has {} vertices", i, face.indices.len())));
            }
            if let Some(&bad) = face.indices.iter().find(|&&idx| idx as usize >= count) {
                return Err(invalid(format!("face {} references vertex {}", i, bad)));
            }
            if let Some(slot) = face.material {
                if slot >= self.materials.len() {
                    return Err(invalid(format!("face {} uses material slot {}", i, slot)));
                }
            }
        }

        Ok(())
    }
}

/// Surface material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default = "default_diffuse")]
    pub diffuse: [f32; 3],
    /// Name of the image resource used as diffuse texture
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<String>,
}

fn default_diffuse() -> [f32; 3] {
    [0.8, 0.8, 0.8]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> MeshData {
        MeshData {
            name: "Floor".into(),
            positions: vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            normals: None,
            uvs: None,
            faces: vec![Face { indices: vec![0, 1, 2, 3], material: None }],
            materials: vec![],
        }
    }

    #[test]
    fn test_valid_mesh() {
        assert!(quad().validate().is_ok());
    }

    #[test]
    fn test_out_of_range_index() {
        let mut mesh = quad();
        mesh.faces[0].indices[3] = 9;
        let err = mesh.validate().unwrap_err();
        assert!(err.to_string().contains("vertex 9"));
    }

    #[test]
    fn test_bad_material_slot() {
        let mut mesh = quad();
        mesh.faces[0].material = Some(0);
        assert!(mesh.validate().is_err());
    }

    #[test]
    fn test_face_json_forms() {
        let faces: Vec<Face> =
            serde_json::from_str(r#"[[0, 1, 2], {"indices": [2, 3, 0], "material": 1}]"#).unwrap();
        assert_eq!(faces[0].material, None);
        assert_eq!(faces[1].indices, vec![2, 3, 0]);
        assert_eq!(faces[1].material, Some(1));
    }
}
