//! Surface materials and texture objects

use serde::{Deserialize, Serialize};

use super::TextureId;

/// Shading model of a surface material
///
/// Phong surfaces are also Lambert surfaces; anything else only gets a name
/// and the default colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceKind {
    #[default]
    Lambert,
    Phong,
    Other,
}

impl SurfaceKind {
    pub fn is_lambert(&self) -> bool {
        matches!(self, SurfaceKind::Lambert | SurfaceKind::Phong)
    }

    pub fn is_phong(&self) -> bool {
        matches!(self, SurfaceKind::Phong)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PropertyValue {
    Vector([f64; 3]),
    Color([f64; 3]),
    Number(f64),
}

/// Named, typed material property with its source-linked textures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
    #[serde(default)]
    pub textures: Vec<TextureId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Material {
    pub name: String,
    #[serde(default)]
    pub kind: SurfaceKind,
    /// Surface fields set explicitly by the parser
    #[serde(default)]
    pub diffuse: Option<[f64; 3]>,
    #[serde(default)]
    pub emissive: Option<[f64; 3]>,
    #[serde(default)]
    pub specular: Option<[f64; 3]>,
    #[serde(default)]
    pub transparency_factor: Option<f64>,
    #[serde(default)]
    pub properties: Vec<Property>,
}

impl Material {
    pub fn named(name: impl Into<String>, kind: SurfaceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            diffuse: None,
            emissive: None,
            specular: None,
            transparency_factor: None,
            properties: Vec::new(),
        }
    }

    /// Case-insensitive property lookup
    pub fn find_property(&self, name: &str) -> Option<&Property> {
        self.properties
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Texture {
    #[serde(default)]
    pub name: String,
    /// Path as recorded when the scene was authored
    #[serde(default)]
    pub file_name: String,
    /// Path relative to the scene file
    #[serde(default)]
    pub relative_file_name: String,
}
