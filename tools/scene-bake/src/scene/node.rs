//! Scene nodes and their local transform components

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

use super::{MeshId, NodeId};
use crate::error::{Result, UnsupportedInput};
use crate::math::{compose_xyz, vec3_from_scene};

/// Euler rotation order of a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RotationOrder {
    #[default]
    Xyz,
    Xzy,
    Yzx,
    Yxz,
    Zxy,
    Zyx,
    SphericXyz,
}

fn unit_scale() -> [f64; 3] {
    [1.0, 1.0, 1.0]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub name: String,
    #[serde(default)]
    pub children: Vec<NodeId>,
    /// Mesh attachment, if any
    #[serde(default)]
    pub mesh: Option<MeshId>,
    #[serde(default)]
    pub translation: [f64; 3],
    /// Euler angles in degrees
    #[serde(default)]
    pub rotation: [f64; 3],
    #[serde(default = "unit_scale")]
    pub scaling: [f64; 3],
    /// Unset flags leave the component at identity
    #[serde(default)]
    pub translation_active: bool,
    #[serde(default)]
    pub rotation_active: bool,
    #[serde(default)]
    pub scaling_active: bool,
    #[serde(default)]
    pub rotation_order: RotationOrder,
}

/// Translation, Euler rotation (degrees) and scale after the activity flags
/// have been applied
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformComponents {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scaling: Vec3,
}

impl Default for TransformComponents {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scaling: Vec3::ONE,
        }
    }
}

impl Node {
    /// Node with identity transform and no children
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
            mesh: None,
            translation: [0.0; 3],
            rotation: [0.0; 3],
            scaling: unit_scale(),
            translation_active: true,
            rotation_active: true,
            scaling_active: true,
            rotation_order: RotationOrder::Xyz,
        }
    }

    /// Static components; inactive ones fall back to identity
    pub fn components(&self) -> TransformComponents {
        let identity = TransformComponents::default();
        TransformComponents {
            translation: if self.translation_active {
                vec3_from_scene(self.translation)
            } else {
                identity.translation
            },
            rotation: if self.rotation_active {
                vec3_from_scene(self.rotation)
            } else {
                identity.rotation
            },
            scaling: if self.scaling_active {
                vec3_from_scene(self.scaling)
            } else {
                identity.scaling
            },
        }
    }

    /// Compose components in this node's rotation order
    pub fn compose(&self, components: &TransformComponents) -> Result<Mat4> {
        match self.rotation_order {
            RotationOrder::Xyz => Ok(compose_xyz(components)),
            order => Err(UnsupportedInput::RotationOrder {
                node: self.name.clone(),
                order,
            }
            .into()),
        }
    }

    pub fn local_transform(&self) -> Result<Mat4> {
        self.compose(&self.components())
    }
}
