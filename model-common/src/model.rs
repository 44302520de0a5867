//! Flattened model records
//!
//! A [`Model`] is what the scene baker hands to an engine: a flat bone list,
//! shared vertex/index buffers partitioned into per-material mesh parts,
//! resolved materials and optional baked animation.
//!
//! Bone order is the addressing scheme for everything else. Child lists,
//! blend indices, skeleton parent arrays and animation frames all refer to
//! bones by their position in [`Model::bones`].

use std::collections::BTreeMap;

use bitcode::{Decode, Encode};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::math::Matrix4;

/// Maximum number of (bone, weight) influences packed into one vertex
pub const MAX_BONE_INFLUENCES: usize = 4;

/// Maximum deduplicated vertex count per mesh (signed 16-bit index ceiling)
pub const MAX_VERTEX_COUNT: usize = i16::MAX as usize;

/// Parent index used for root bones in [`AnimationData::parent_indices`]
pub const NO_PARENT: i32 = -1;

/// Opaque shader stage handle issued by a content importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct ShaderHandle(pub u32);

/// Opaque texture handle issued by a content importer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub struct TextureHandle(pub u32);

/// Pipeline stage a shader handle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum ShaderStageKind {
    Vertex,
    Fragment,
}

/// One node of the flattened hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Bone {
    pub name: String,
    /// Local transform relative to the parent bone
    pub transform: Matrix4,
    /// Indices of child bones, in scene order
    pub child_bones: Vec<u32>,
    /// Rest (bind) pose matrix, when the scene carries a pose for this node
    pub rest_pose: Option<Matrix4>,
}

impl Bone {
    pub fn new(name: impl Into<String>, transform: Matrix4) -> Self {
        Self {
            name: name.into(),
            transform,
            child_bones: Vec::new(),
            rest_pose: None,
        }
    }
}

/// Fixed-width vertex (64 bytes)
///
/// Two vertices are the same vertex iff every field compares equal; mesh
/// assembly deduplicates on exactly this relation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize, Encode, Decode,
)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    /// Texture coordinate with V already flipped (`1 - v`)
    pub tex_coord: [f32; 2],
    /// Bone indices, zero-padded past the last influence
    pub blend_indices: [f32; 4],
    /// Bone weights, zero-padded past the last influence
    pub blend_weights: [f32; 4],
}

impl Vertex {
    pub fn at(position: [f32; 3]) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Number of influences carrying a non-zero weight
    pub fn influence_count(&self) -> usize {
        self.blend_weights.iter().filter(|w| **w != 0.0).count()
    }
}

/// Vertex layout of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode)]
pub enum VertexFormat {
    /// Position, normal, texture coordinate
    PositionNormalTexture,
    /// Position, normal, texture coordinate, blend indices, blend weights
    Skinned,
}

impl VertexFormat {
    pub fn is_skinned(&self) -> bool {
        matches!(self, VertexFormat::Skinned)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct VertexBuffer {
    pub format: VertexFormat,
    pub vertices: Vec<Vertex>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct IndexBuffer {
    pub indices: Vec<u16>,
}

/// A contiguous run of triangles drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct MeshPart {
    /// Index into [`Model::materials`]
    pub material: u32,
    /// Index into [`Model::vertex_buffers`]
    pub vertex_buffer: u32,
    /// Index into [`Model::index_buffers`]
    pub index_buffer: u32,
    /// First index of this part within the index buffer
    pub start_index: u32,
    /// Number of triangles
    pub primitive_count: u32,
}

impl MeshPart {
    /// Widened so decoded counts cannot overflow
    pub fn index_count(&self) -> u64 {
        u64::from(self.primitive_count) * 3
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Mesh {
    pub name: String,
    /// Bone of the node the mesh is attached to
    pub bone: u32,
    pub parts: Vec<MeshPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Material {
    pub name: String,
    pub diffuse_color: [f32; 3],
    pub emissive_color: [f32; 3],
    pub specular_color: [f32; 3],
    pub specular_power: f32,
    pub alpha: f32,
    pub texture: Option<TextureHandle>,
    pub vertex_shader: ShaderHandle,
    pub fragment_shader: ShaderHandle,
}

impl Material {
    /// Mid-gray diffuse, opaque, everything else unset
    pub const DEFAULT_DIFFUSE: [f32; 3] = [0.5, 0.5, 0.5];

    pub fn new(
        name: impl Into<String>,
        vertex_shader: ShaderHandle,
        fragment_shader: ShaderHandle,
    ) -> Self {
        Self {
            name: name.into(),
            diffuse_color: Self::DEFAULT_DIFFUSE,
            emissive_color: [0.0; 3],
            specular_color: [0.0; 3],
            specular_power: 0.0,
            alpha: 1.0,
            texture: None,
            vertex_shader,
            fragment_shader,
        }
    }
}

/// One sampled instant: a local transform per bone, index-aligned to the bone list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct AnimationFrame {
    /// Seconds from the start of the clip
    pub time: f32,
    pub transforms: Vec<Matrix4>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct AnimationSequence {
    pub name: String,
    /// Clip length in seconds
    pub duration: f32,
    /// Frames ordered by time
    pub frames: Vec<AnimationFrame>,
}

/// Baked animation plus the skeleton it is expressed against
///
/// The three skeleton arrays are parallel to [`Model::bones`]. They only
/// exist together with the sequences, never on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct AnimationData {
    pub sequences: BTreeMap<String, AnimationSequence>,
    /// Local rest transforms
    pub bone_transforms: Vec<Matrix4>,
    /// Inverse of each bone's global rest transform
    pub absolute_transforms: Vec<Matrix4>,
    /// Parent bone per bone, [`NO_PARENT`] for roots
    pub parent_indices: Vec<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Model {
    /// Path the scene was actually read from
    pub file_name: String,
    pub bones: Vec<Bone>,
    pub meshes: Vec<Mesh>,
    pub vertex_buffers: Vec<VertexBuffer>,
    pub index_buffers: Vec<IndexBuffer>,
    pub materials: Vec<Material>,
    pub animations: Option<AnimationData>,
}

impl Model {
    /// Iterate every mesh part of every mesh
    pub fn parts(&self) -> impl Iterator<Item = &MeshPart> {
        self.meshes.iter().flat_map(|m| m.parts.iter())
    }

    /// Total triangle count across all parts
    pub fn triangle_count(&self) -> u64 {
        self.parts().map(|p| u64::from(p.primitive_count)).sum()
    }

    pub fn bone_index(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_size() {
        assert_eq!(std::mem::size_of::<Vertex>(), 64);
    }

    #[test]
    fn test_vertex_equality_is_structural() {
        let a = Vertex::at([1.0, 2.0, 3.0]);
        let mut b = a;
        assert_eq!(a, b);
        b.tex_coord[1] = 0.25;
        assert_ne!(a, b);
    }

    #[test]
    fn test_influence_count_ignores_padding() {
        let mut v = Vertex::at([0.0; 3]);
        v.blend_indices = [3.0, 1.0, 0.0, 0.0];
        v.blend_weights = [0.75, 0.25, 0.0, 0.0];
        assert_eq!(v.influence_count(), 2);
    }

    #[test]
    fn test_material_defaults() {
        let m = Material::new("mat", ShaderHandle(0), ShaderHandle(1));
        assert_eq!(m.diffuse_color, [0.5, 0.5, 0.5]);
        assert_eq!(m.emissive_color, [0.0; 3]);
        assert_eq!(m.alpha, 1.0);
        assert!(m.texture.is_none());
    }

    #[test]
    fn test_triangle_count_sums_parts() {
        let part = |start, count| MeshPart {
            material: 0,
            vertex_buffer: 0,
            index_buffer: 0,
            start_index: start,
            primitive_count: count,
        };
        let model = Model {
            meshes: vec![Mesh {
                name: "m".into(),
                bone: 0,
                parts: vec![part(0, 2), part(6, 3)],
            }],
            ..Default::default()
        };
        assert_eq!(model.triangle_count(), 5);
        assert_eq!(model.parts().nth(1).map(|p| p.index_count()), Some(9));
    }
}
