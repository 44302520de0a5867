//! Model import pipeline
//!
//! resolve -> load -> hierarchy -> meshes (skin, layers, triangulation,
//! buffers, materials) -> rest pose -> animation. Any error aborts the whole
//! import; no partial model is returned.

use std::path::{Path, PathBuf};

use model_common::Model;

use crate::animation::AnimationBaker;
use crate::content::ContentImporter;
use crate::error::Result;
use crate::hierarchy::Hierarchy;
use crate::material::MaterialResolver;
use crate::mesh::MeshAssembler;
use crate::resolve::{resolve, FallbackImporter, ResolveStrategy, Resolved};
use crate::scene::{JsonSceneLoader, Scene, SceneLoader};
use crate::settings::ImportSettings;

pub struct ModelImporter {
    settings: ImportSettings,
    loader: Box<dyn SceneLoader>,
    strategies: Vec<ResolveStrategy>,
}

impl ModelImporter {
    /// Importer reading JSON scenes, probing `settings.extension`
    pub fn new(settings: ImportSettings) -> Self {
        let loader = JsonSceneLoader::new(settings.extension.clone());
        Self::with_loader(settings, Box::new(loader))
    }

    pub fn with_loader(settings: ImportSettings, loader: Box<dyn SceneLoader>) -> Self {
        let strategies = vec![
            ResolveStrategy::AsGiven,
            ResolveStrategy::WithExtension(loader.extension().to_string()),
        ];
        Self {
            settings,
            loader,
            strategies,
        }
    }

    /// Add an importer tried after the file probes
    pub fn with_fallback(mut self, fallback: impl FallbackImporter + 'static) -> Self {
        self.strategies
            .push(ResolveStrategy::Delegate(Box::new(fallback)));
        self
    }

    pub fn settings(&self) -> &ImportSettings {
        &self.settings
    }

    /// Resolve, load and convert the model at `path`
    pub fn import(&self, path: &Path, content: &mut dyn ContentImporter) -> Result<Model> {
        match resolve(path, &self.strategies, content)? {
            Resolved::Model(model) => Ok(model),
            Resolved::Scene(file) => {
                tracing::info!("Importing {}", file.display());
                let scene = self.loader.load(&file)?;
                self.import_scene(&scene, &file, content)
            }
        }
    }

    /// Locate and load a scene file without converting it
    pub fn load_scene(&self, path: &Path) -> Result<(PathBuf, Scene)> {
        let file_strategies: Vec<ResolveStrategy> = self
            .strategies
            .iter()
            .filter_map(|s| match s {
                ResolveStrategy::AsGiven => Some(ResolveStrategy::AsGiven),
                ResolveStrategy::WithExtension(ext) => {
                    Some(ResolveStrategy::WithExtension(ext.clone()))
                }
                ResolveStrategy::Delegate(_) => None,
            })
            .collect();
        let mut content = crate::content::RecordingContentImporter::new();
        match resolve(path, &file_strategies, &mut content)? {
            Resolved::Scene(file) => {
                let scene = self.loader.load(&file)?;
                Ok((file, scene))
            }
            Resolved::Model(_) => Err(crate::error::ImportError::NotFound(path.to_path_buf())),
        }
    }

    /// Convert an already loaded scene; `path` is the file it came from
    pub fn import_scene(
        &self,
        scene: &Scene,
        path: &Path,
        content: &mut dyn ContentImporter,
    ) -> Result<Model> {
        let mut hierarchy = Hierarchy::build(scene)?;

        let globals = if self.settings.bake_global_transform {
            Some(scene.global_transforms()?)
        } else {
            None
        };
        let mut assembler = MeshAssembler::new(scene, &hierarchy);
        if let Some(globals) = &globals {
            assembler = assembler.with_global_transforms(globals);
        }

        let mut materials = MaterialResolver::new(scene, path, self.settings.shaders.clone());
        let mut meshes = Vec::new();
        let mut vertex_buffers = Vec::new();
        let mut index_buffers = Vec::new();

        for node_id in scene.node_ids() {
            let Some(mesh_id) = scene.node(node_id)?.mesh else {
                continue;
            };
            let slot = vertex_buffers.len() as u32;
            let assembled = assembler.assemble(node_id, mesh_id, slot, &mut materials, content)?;
            meshes.push(assembled.mesh);
            vertex_buffers.push(assembled.vertex_buffer);
            index_buffers.push(assembled.index_buffer);
        }

        hierarchy.apply_pose(scene)?;

        let animations =
            AnimationBaker::new(scene, &hierarchy, self.settings.sample_rate()).bake()?;

        let model = Model {
            file_name: path.display().to_string(),
            bones: hierarchy.into_bones(),
            meshes,
            vertex_buffers,
            index_buffers,
            materials: materials.into_materials(),
            animations,
        };

        tracing::info!(
            "Imported {}: {} bones, {} meshes, {} materials, {} triangles{}",
            model.file_name,
            model.bones.len(),
            model.meshes.len(),
            model.materials.len(),
            model.triangle_count(),
            if model.animations.is_some() {
                ", animated"
            } else {
                ""
            }
        );
        Ok(model)
    }
}

impl Default for ModelImporter {
    fn default() -> Self {
        Self::new(ImportSettings::default())
    }
}
