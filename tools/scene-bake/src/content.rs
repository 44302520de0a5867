//! Host-side content import for shaders and textures
//!
//! Materials reference shader stages and texture images by handle. Issuing
//! those handles is the host's business, so the baker only talks to it
//! through [`ContentImporter`].

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use model_common::{ShaderHandle, ShaderStageEntry, ShaderStageKind, TextureHandle};

use crate::error::Result;

/// Turns shader names and texture paths into opaque handles
pub trait ContentImporter {
    fn import_shader_stage(&mut self, name: &str, kind: ShaderStageKind) -> Result<ShaderHandle>;

    fn import_texture(&mut self, path: &Path) -> Result<TextureHandle>;
}

/// Importer that records every request and hands out sequential handles
///
/// Repeated requests for the same shader stage or texture path return the
/// handle issued the first time. The recorded lists are what a
/// [`model_common::ModelFile`] stores alongside the model.
#[derive(Debug, Default)]
pub struct RecordingContentImporter {
    shader_stages: Vec<ShaderStageEntry>,
    shader_lookup: HashMap<(String, ShaderStageKind), ShaderHandle>,
    textures: Vec<PathBuf>,
    texture_lookup: HashMap<PathBuf, TextureHandle>,
}

impl RecordingContentImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shader_stages(&self) -> &[ShaderStageEntry] {
        &self.shader_stages
    }

    pub fn textures(&self) -> &[PathBuf] {
        &self.textures
    }

    /// Consume the importer, returning shader stages and texture paths in
    /// handle order
    pub fn into_parts(self) -> (Vec<ShaderStageEntry>, Vec<String>) {
        let textures = self
            .textures
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect();
        (self.shader_stages, textures)
    }
}

impl ContentImporter for RecordingContentImporter {
    fn import_shader_stage(&mut self, name: &str, kind: ShaderStageKind) -> Result<ShaderHandle> {
        let key = (name.to_string(), kind);
        if let Some(&handle) = self.shader_lookup.get(&key) {
            return Ok(handle);
        }

        let handle = ShaderHandle(self.shader_stages.len() as u32);
        self.shader_stages.push(ShaderStageEntry {
            name: name.to_string(),
            kind,
        });
        self.shader_lookup.insert(key, handle);
        tracing::trace!("Shader stage {:?} '{}' -> {:?}", kind, name, handle);
        Ok(handle)
    }

    fn import_texture(&mut self, path: &Path) -> Result<TextureHandle> {
        if let Some(&handle) = self.texture_lookup.get(path) {
            return Ok(handle);
        }

        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(path.to_path_buf());
        self.texture_lookup.insert(path.to_path_buf(), handle);
        tracing::trace!("Texture {} -> {:?}", path.display(), handle);
        Ok(handle)
    }
}
