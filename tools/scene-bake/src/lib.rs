//! scene-bake library
//!
//! Flattens parsed 3D scenes into engine-ready models: a bone hierarchy with
//! stable indices, deduplicated vertex/index buffers split into per-material
//! parts, resolved materials and baked animation.

pub mod animation;
pub mod content;
pub mod error;
pub mod export;
pub mod hierarchy;
pub mod import;
pub mod material;
pub mod math;
pub mod mesh;
pub mod resolve;
pub mod scene;
pub mod settings;
pub mod skin;

// Re-export output records from model-common
pub use model_common::{
    AnimationData, Bone, Material, Mesh, MeshPart, Model, ModelFile, Vertex, VertexFormat,
    MODEL_FORMAT,
};

pub use content::{ContentImporter, RecordingContentImporter};
pub use error::{ImportError, UnsupportedInput};
pub use export::{export_model, OutputFormat};
pub use import::ModelImporter;
pub use resolve::{FallbackImporter, ResolveStrategy};
pub use scene::{JsonSceneLoader, Scene, SceneLoader};
pub use settings::ImportSettings;
