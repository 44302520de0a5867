//! Binary model container (`.sbmodel`)
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │  Header (4 bytes): magic "SBMD"              │
//! ├──────────────────────────────────────────────┤
//! │  ModelFile (bitcode serialized)              │
//! │  ├── version: u32                            │
//! │  ├── model: Model                            │
//! │  ├── shader_stages: Vec<ShaderStageEntry>    │
//! │  └── textures: Vec<String>                   │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Shader and texture handles inside the model index into `shader_stages`
//! and `textures` respectively.

use bitcode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::model::{Model, ShaderStageKind, NO_PARENT};

/// Model file format constants
#[derive(Debug, Clone, Copy)]
pub struct ModelFormat {
    /// File extension without dot
    pub extension: &'static str,
    /// Magic bytes at start of file
    pub magic: &'static [u8; 4],
    /// Format version for backward compatibility
    pub version: u32,
}

pub const MODEL_FORMAT: ModelFormat = ModelFormat {
    extension: "sbmodel",
    magic: b"SBMD",
    version: 1,
};

/// Named shader stage referenced by a [`crate::ShaderHandle`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ShaderStageEntry {
    pub name: String,
    pub kind: ShaderStageKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct ModelFile {
    pub version: u32,
    pub model: Model,
    pub shader_stages: Vec<ShaderStageEntry>,
    /// Texture file paths, relative to nothing (as resolved at import time)
    pub textures: Vec<String>,
}

impl ModelFile {
    pub fn new(model: Model, shader_stages: Vec<ShaderStageEntry>, textures: Vec<String>) -> Self {
        Self {
            version: MODEL_FORMAT.version,
            model,
            shader_stages,
            textures,
        }
    }

    /// Serialize to bytes with magic header
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = MODEL_FORMAT.magic.to_vec();
        bytes.extend(bitcode::encode(self));
        bytes
    }

    /// Deserialize from bytes and validate
    pub fn from_bytes(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < 4 || &bytes[0..4] != MODEL_FORMAT.magic {
            anyhow::bail!(
                "Invalid model magic bytes (expected: {:?})",
                std::str::from_utf8(MODEL_FORMAT.magic).unwrap_or("SBMD")
            );
        }

        let file: ModelFile = bitcode::decode(&bytes[4..])
            .map_err(|e| anyhow::anyhow!("Failed to decode model file: {}", e))?;

        file.validate()?;

        Ok(file)
    }

    /// Validate cross references
    ///
    /// Checks:
    /// - Version is supported
    /// - Bone child indices and blend indices address existing bones
    /// - Mesh parts address existing buffers/materials and stay in range
    /// - Material handles address the shader/texture tables
    /// - Animation arrays are parallel to the bone list
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.version > MODEL_FORMAT.version {
            anyhow::bail!(
                "Unsupported model version: {} (max supported: {})",
                self.version,
                MODEL_FORMAT.version
            );
        }

        let model = &self.model;
        let bone_count = model.bones.len();

        for (i, bone) in model.bones.iter().enumerate() {
            if let Some(&child) = bone.child_bones.iter().find(|&&c| c as usize >= bone_count) {
                anyhow::bail!("Bone {} references missing child bone {}", i, child);
            }
        }

        for buffer in &model.vertex_buffers {
            for vertex in &buffer.vertices {
                for (index, weight) in vertex.blend_indices.iter().zip(vertex.blend_weights) {
                    if weight != 0.0 && *index as usize >= bone_count {
                        anyhow::bail!("Vertex blend index {} out of range", index);
                    }
                }
            }
        }

        for mesh in &model.meshes {
            if mesh.bone as usize >= bone_count {
                anyhow::bail!("Mesh '{}' attached to missing bone {}", mesh.name, mesh.bone);
            }
            for part in &mesh.parts {
                let indices = model
                    .index_buffers
                    .get(part.index_buffer as usize)
                    .ok_or_else(|| anyhow::anyhow!("Mesh '{}' has no index buffer", mesh.name))?;
                let end = u64::from(part.start_index) + part.index_count();
                if end > indices.indices.len() as u64 {
                    anyhow::bail!("Mesh '{}' part exceeds its index buffer", mesh.name);
                }
                if part.vertex_buffer as usize >= model.vertex_buffers.len() {
                    anyhow::bail!("Mesh '{}' has no vertex buffer", mesh.name);
                }
                if part.material as usize >= model.materials.len() {
                    anyhow::bail!("Mesh '{}' references missing material", mesh.name);
                }
            }
        }

        for material in &model.materials {
            let shaders = [material.vertex_shader.0, material.fragment_shader.0];
            if shaders
                .iter()
                .any(|&s| s as usize >= self.shader_stages.len())
            {
                anyhow::bail!("Material '{}' references missing shader stage", material.name);
            }
            if let Some(texture) = material.texture {
                if texture.0 as usize >= self.textures.len() {
                    anyhow::bail!("Material '{}' references missing texture", material.name);
                }
            }
        }

        if let Some(animations) = &model.animations {
            if animations.bone_transforms.len() != bone_count
                || animations.absolute_transforms.len() != bone_count
                || animations.parent_indices.len() != bone_count
            {
                anyhow::bail!("Skeleton arrays are not parallel to the bone list");
            }
            if animations
                .parent_indices
                .iter()
                .any(|&p| p != NO_PARENT && (p < 0 || p as usize >= bone_count))
            {
                anyhow::bail!("Skeleton parent index out of range");
            }
            for sequence in animations.sequences.values() {
                if sequence.frames.iter().any(|f| f.transforms.len() != bone_count) {
                    anyhow::bail!(
                        "Animation '{}' has frames not aligned to the bone list",
                        sequence.name
                    );
                }
            }
        }

        Ok(())
    }
}
