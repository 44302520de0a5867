//! Shared model records for the scene baker
//!
//! This crate provides the flattened, engine-consumable model representation
//! shared between:
//! - `scene-bake` (asset pipeline, produces models)
//! - engine runtimes (consume `.sbmodel` files)
//!
//! # Modules
//!
//! - [`math`] - POD matrix type with glam conversions
//! - [`model`] - Bones, vertex/index buffers, mesh parts, materials, animation
//! - [`packing`] - Interleaved vertex packing for GPU upload
//! - [`formats`] - The `.sbmodel` binary container

pub mod formats;
pub mod math;
pub mod model;
pub mod packing;

pub use math::Matrix4;

pub use model::{
    AnimationData, AnimationFrame, AnimationSequence, Bone, IndexBuffer, Material, Mesh, MeshPart,
    Model, ShaderHandle, ShaderStageKind, TextureHandle, Vertex, VertexBuffer, VertexFormat,
    MAX_BONE_INFLUENCES, MAX_VERTEX_COUNT, NO_PARENT,
};

pub use packing::{pack_vertex_buffer, vertex_stride};

pub use formats::{ModelFile, ShaderStageEntry, MODEL_FORMAT};
