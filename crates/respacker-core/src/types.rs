//! Common types used across respacker
//!
//! Vectors, transforms and colours in the authoring tool's Z-up convention,
//! plus the conversions into the engine's Y-up convention.

use serde::{Deserialize, Serialize};

/// 3D vector (location, Euler rotation, scale, normal)
///
/// Serialized as a plain `[x, y, z]` array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0, z: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0, z: 1.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn normalize(&self) -> Self {
        let len = self.length();
        if len > 0.0 {
            Self {
                x: self.x / len,
                y: self.y / len,
                z: self.z / len,
            }
        } else {
            Self::ZERO
        }
    }

    pub fn dot(&self, other: &Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(&self, other: &Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Convert a location, direction or Euler rotation from Z-up to Y-up: `(x, z, -y)`
    pub fn to_y_up(&self) -> Self {
        Self::new(self.x, self.z, -self.y)
    }

    /// Convert a scale from Z-up to Y-up: `(x, z, y)`
    ///
    /// Scale factors are magnitudes along axes, so the permutation carries no sign.
    pub fn scale_to_y_up(&self) -> Self {
        Self::new(self.x, self.z, self.y)
    }
}

impl Default for Vec3 {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(v: Vec3) -> Self {
        [v.x, v.y, v.z]
    }
}

/// Object transform: location, Euler XYZ rotation (radians) and scale
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    #[serde(default)]
    pub location: Vec3,
    #[serde(default)]
    pub rotation: Vec3,
    #[serde(default = "default_scale")]
    pub scale: Vec3,
}

fn default_scale() -> Vec3 {
    Vec3::ONE
}

impl Transform {
    pub const IDENTITY: Self = Self {
        location: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Compose the world matrix `T * Rz * Ry * Rx * S`
    pub fn to_matrix(&self) -> Mat4x4 {
        Mat4x4::from_trs(self.location, self.rotation, self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 4x4 transformation matrix, column-major (`m[column][row]`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Mat4x4 {
    pub m: [[f32; 4]; 4],
}

impl Mat4x4 {
    pub const IDENTITY: Self = Self {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    /// Build a matrix from translation, Euler XYZ rotation and scale
    pub fn from_trs(translation: Vec3, rotation: Vec3, scale: Vec3) -> Self {
        let (sx, cx) = rotation.x.sin_cos();
        let (sy, cy) = rotation.y.sin_cos();
        let (sz, cz) = rotation.z.sin_cos();

        // Columns of Rz * Ry * Rx
        let r0 = [cy * cz, cy * sz, -sy];
        let r1 = [sx * sy * cz - cx * sz, sx * sy * sz + cx * cz, sx * cy];
        let r2 = [cx * sy * cz + sx * sz, cx * sy * sz - sx * cz, cx * cy];

        Self {
            m: [
                [r0[0] * scale.x, r0[1] * scale.x, r0[2] * scale.x, 0.0],
                [r1[0] * scale.y, r1[1] * scale.y, r1[2] * scale.y, 0.0],
                [r2[0] * scale.z, r2[1] * scale.z, r2[2] * scale.z, 0.0],
                [translation.x, translation.y, translation.z, 1.0],
            ],
        }
    }

    /// Get translation component
    pub fn translation(&self) -> Vec3 {
        Vec3::new(self.m[3][0], self.m[3][1], self.m[3][2])
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Transform a point (translation applied)
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let v = self.transform_vector(p);
        Vec3::new(v.x + self.m[3][0], v.y + self.m[3][1], v.z + self.m[3][2])
    }

    /// Transform a direction (translation ignored)
    pub fn transform_vector(&self, v: Vec3) -> Vec3 {
        let m = &self.m;
        Vec3::new(
            m[0][0] * v.x + m[1][0] * v.y + m[2][0] * v.z,
            m[0][1] * v.x + m[1][1] * v.y + m[2][1] * v.z,
            m[0][2] * v.x + m[1][2] * v.y + m[2][2] * v.z,
        )
    }

    /// Transform a surface normal by the inverse-transpose of the linear part
    ///
    /// The result is not normalized. A singular matrix yields a zero vector.
    pub fn transform_normal(&self, n: Vec3) -> Vec3 {
        let m = &self.m;
        let c0 = Vec3::new(m[0][0], m[0][1], m[0][2]);
        let c1 = Vec3::new(m[1][0], m[1][1], m[1][2]);
        let c2 = Vec3::new(m[2][0], m[2][1], m[2][2]);

        // Columns of the cofactor matrix; dividing by the determinant gives the inverse-transpose
        let (k0, k1, k2) = (c1.cross(&c2), c2.cross(&c0), c0.cross(&c1));
        let det = c0.dot(&k0);
        if det == 0.0 {
            return Vec3::ZERO;
        }

        Vec3::new(
            (k0.x * n.x + k1.x * n.y + k2.x * n.z) / det,
            (k0.y * n.x + k1.y * n.y + k2.y * n.z) / det,
            (k0.z * n.x + k1.z * n.y + k2.z * n.z) / det,
        )
    }
}

impl Default for Mat4x4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 8-bit RGB color, as written into light descriptors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Scale a normalized (0.0-1.0) RGB triple to 0-255, truncating toward zero
    ///
    /// The product is taken in `f64` so truncation sees the exact channel value.
    pub fn from_normalized(rgb: [f32; 3]) -> Self {
        let channel = |v: f32| (f64::from(v) * 255.0).clamp(0.0, 255.0) as u8;
        Self::rgb(channel(rgb[0]), channel(rgb[1]), channel(rgb[2]))
    }
}
