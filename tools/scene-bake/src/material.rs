//! Material resolution and caching
//!
//! Each (scene material, shader combination) pair resolves to one engine
//! material. The resolver owns its cache and lives for a single import, so
//! nothing leaks from one model into the next.

use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use model_common::{Material, ShaderStageKind, TextureHandle};

use crate::content::ContentImporter;
use crate::error::Result;
use crate::math::vec3_from_scene;
use crate::scene::{self, MaterialId, PropertyValue, Scene};
use crate::settings::ShaderSettings;

/// Shader stages a mesh part is drawn with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderCombo {
    /// Skinned vertex stage + shared fragment stage
    Skinned,
    /// Basic vertex stage + shared fragment stage
    Basic,
}

impl ShaderCombo {
    pub fn for_skinned(skinned: bool) -> Self {
        if skinned {
            ShaderCombo::Skinned
        } else {
            ShaderCombo::Basic
        }
    }
}

/// Name of the material used for meshes without a material layer
pub const DEFAULT_MATERIAL_NAME: &str = "default";

type CacheKey = (Option<MaterialId>, ShaderCombo);

pub struct MaterialResolver<'a> {
    scene: &'a Scene,
    /// Directory texture paths are resolved against
    base_dir: PathBuf,
    shaders: ShaderSettings,
    cache: HashMap<CacheKey, u32>,
    materials: Vec<Material>,
}

impl<'a> MaterialResolver<'a> {
    /// Resolver for materials of `scene`, loaded from `model_path`
    pub fn new(scene: &'a Scene, model_path: &Path, shaders: ShaderSettings) -> Self {
        let base_dir = model_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self {
            scene,
            base_dir,
            shaders,
            cache: HashMap::new(),
            materials: Vec::new(),
        }
    }

    /// Index of the engine material for `material` drawn with `combo`
    ///
    /// `None` stands for the default material. Repeated calls with the same
    /// pair return the same index without touching the content importer.
    pub fn resolve(
        &mut self,
        material: Option<MaterialId>,
        combo: ShaderCombo,
        content: &mut dyn ContentImporter,
    ) -> Result<u32> {
        let key = (material, combo);
        if let Some(&index) = self.cache.get(&key) {
            tracing::debug!("Material cache hit: {:?} with {:?} -> {}", material, combo, index);
            return Ok(index);
        }

        let resolved = self.build(material, combo, content)?;
        let index = self.materials.len() as u32;
        tracing::debug!("Resolved material '{}' ({:?}) -> {}", resolved.name, combo, index);
        self.materials.push(resolved);
        self.cache.insert(key, index);
        Ok(index)
    }

    pub fn get(&self, index: u32) -> Option<&Material> {
        self.materials.get(index as usize)
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn into_materials(self) -> Vec<Material> {
        self.materials
    }

    fn build(
        &self,
        material: Option<MaterialId>,
        combo: ShaderCombo,
        content: &mut dyn ContentImporter,
    ) -> Result<Material> {
        let vertex_stage = match combo {
            ShaderCombo::Skinned => &self.shaders.skinned,
            ShaderCombo::Basic => &self.shaders.basic,
        };
        let vertex_shader = content.import_shader_stage(vertex_stage, ShaderStageKind::Vertex)?;
        let fragment_shader =
            content.import_shader_stage(&self.shaders.fragment, ShaderStageKind::Fragment)?;

        let Some(id) = material else {
            return Ok(Material::new(
                DEFAULT_MATERIAL_NAME,
                vertex_shader,
                fragment_shader,
            ));
        };

        let source = self.scene.material(id)?;
        let mut out = Material::new(source.name.clone(), vertex_shader, fragment_shader);

        if let Some(diffuse) = find_color(source, source.diffuse, "Diffuse") {
            out.diffuse_color = diffuse;
        }
        if let Some(emissive) = find_color(source, source.emissive, "Emissive") {
            out.emissive_color = emissive;
        }
        out.texture = self.diffuse_texture(source, content)?;

        if source.kind.is_phong() {
            if let Some(specular) = find_color(source, source.specular, "Specular") {
                out.specular_color = specular;
            }
            if let Some(power) = find_specular_power(source) {
                out.specular_power = power;
            }
        }

        if source.kind.is_lambert() {
            let transparency = source.transparency_factor.or_else(|| {
                match source.find_property("TransparencyFactor").map(|p| p.value) {
                    Some(PropertyValue::Number(n)) => Some(n),
                    _ => None,
                }
            });
            if let Some(t) = transparency {
                out.alpha = (1.0 - t) as f32;
            }
        }

        Ok(out)
    }

    /// Import the first texture linked to the diffuse property
    fn diffuse_texture(
        &self,
        source: &scene::Material,
        content: &mut dyn ContentImporter,
    ) -> Result<Option<TextureHandle>> {
        let texture_id = ["DiffuseColor", "Diffuse"]
            .iter()
            .filter_map(|name| source.find_property(name))
            .flat_map(|p| p.textures.iter())
            .next();

        let Some(&texture_id) = texture_id else {
            return Ok(None);
        };

        let texture = self.scene.texture(texture_id)?;
        let Some(path) = self.texture_path(texture) else {
            tracing::warn!(
                "Material '{}': texture '{}' has no file name, skipping",
                source.name,
                texture.name
            );
            return Ok(None);
        };

        tracing::debug!("Material '{}': diffuse texture {}", source.name, path.display());
        content.import_texture(&path).map(Some)
    }

    /// Texture file path relative to the model's directory
    fn texture_path(&self, texture: &scene::Texture) -> Option<PathBuf> {
        let name = [&texture.relative_file_name, &texture.file_name]
            .into_iter()
            .find(|n| !n.is_empty())?;
        let path = Path::new(name);
        if path.is_absolute() {
            Some(path.to_path_buf())
        } else {
            Some(self.base_dir.join(path))
        }
    }
}

fn non_zero(color: [f64; 3]) -> Option<[f32; 3]> {
    if color.iter().any(|c| *c != 0.0) {
        Some(vec3_from_scene(color).to_array())
    } else {
        None
    }
}

/// Color lookup: explicit surface field, then a vector-typed property, then
/// a color-typed property. Zero means unset.
fn find_color(
    source: &scene::Material,
    explicit: Option<[f64; 3]>,
    name: &str,
) -> Option<[f32; 3]> {
    let color_name = format!("{name}Color");
    let candidates = [name, color_name.as_str()];

    let vector = candidates
        .iter()
        .filter_map(|n| source.find_property(n))
        .find_map(|p| match p.value {
            PropertyValue::Vector(v) => non_zero(v),
            _ => None,
        });
    let color = || {
        candidates
            .iter()
            .filter_map(|n| source.find_property(n))
            .find_map(|p| match p.value {
                PropertyValue::Color(c) => non_zero(c),
                _ => None,
            })
    };

    explicit.and_then(non_zero).or(vector).or_else(color)
}

fn find_specular_power(source: &scene::Material) -> Option<f32> {
    ["ShininessExponent", "Shininess"]
        .iter()
        .filter_map(|n| source.find_property(n))
        .find_map(|p| match p.value {
            PropertyValue::Number(n) if n > 0.0 => Some(n as f32),
            _ => None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RecordingContentImporter;
    use crate::scene::{Property, SurfaceKind, Texture, TextureId};

    fn property(name: &str, value: PropertyValue) -> Property {
        Property {
            name: name.into(),
            value,
            textures: Vec::new(),
        }
    }

    fn scene_with(materials: Vec<scene::Material>) -> Scene {
        Scene {
            materials,
            ..Default::default()
        }
    }

    fn resolve_one(scene: &Scene, combo: ShaderCombo) -> (Material, RecordingContentImporter) {
        let mut content = RecordingContentImporter::new();
        let mut resolver =
            MaterialResolver::new(scene, Path::new("assets/model.json"), ShaderSettings::default());
        let index = resolver
            .resolve(Some(MaterialId(0)), combo, &mut content)
            .unwrap();
        (resolver.get(index).unwrap().clone(), content)
    }

    #[test]
    fn test_same_pair_resolves_once() {
        let scene = scene_with(vec![
            scene::Material::named("skin", SurfaceKind::Lambert),
            scene::Material::named("cloth", SurfaceKind::Lambert),
        ]);
        let mut content = RecordingContentImporter::new();
        let mut resolver =
            MaterialResolver::new(&scene, Path::new("m.json"), ShaderSettings::default());

        let a = resolver
            .resolve(Some(MaterialId(0)), ShaderCombo::Skinned, &mut content)
            .unwrap();
        let b = resolver
            .resolve(Some(MaterialId(1)), ShaderCombo::Skinned, &mut content)
            .unwrap();
        let a_again = resolver
            .resolve(Some(MaterialId(0)), ShaderCombo::Skinned, &mut content)
            .unwrap();
        let a_basic = resolver
            .resolve(Some(MaterialId(0)), ShaderCombo::Basic, &mut content)
            .unwrap();

        assert_eq!(a, a_again);
        assert_ne!(a, b);
        assert_ne!(a, a_basic);
        assert_eq!(resolver.len(), 3);
    }

    #[test]
    fn test_defaults() {
        let scene = scene_with(vec![scene::Material::named("plain", SurfaceKind::Other)]);
        let (material, content) = resolve_one(&scene, ShaderCombo::Basic);

        assert_eq!(material.name, "plain");
        assert_eq!(material.diffuse_color, [0.5, 0.5, 0.5]);
        assert_eq!(material.emissive_color, [0.0; 3]);
        assert_eq!(material.alpha, 1.0);
        assert!(material.texture.is_none());

        let stages = content.shader_stages();
        assert_eq!(stages[material.vertex_shader.0 as usize].name, "$basic");
        assert_eq!(
            stages[material.fragment_shader.0 as usize].kind,
            ShaderStageKind::Fragment
        );
    }

    #[test]
    fn test_skinned_combo_uses_skinned_vertex_stage() {
        let scene = scene_with(vec![scene::Material::named("m", SurfaceKind::Lambert)]);
        let (material, content) = resolve_one(&scene, ShaderCombo::Skinned);
        let stages = content.shader_stages();
        assert_eq!(stages[material.vertex_shader.0 as usize].name, "$skinned");
        assert_eq!(stages[material.fragment_shader.0 as usize].name, "$basic");
    }

    #[test]
    fn test_color_lookup_order() {
        // explicit field wins
        let mut m = scene::Material::named("m", SurfaceKind::Lambert);
        m.diffuse = Some([1.0, 0.0, 0.0]);
        m.properties = vec![
            property("Diffuse", PropertyValue::Vector([0.0, 1.0, 0.0])),
            property("DiffuseColor", PropertyValue::Color([0.0, 0.0, 1.0])),
        ];
        assert_eq!(find_color(&m, m.diffuse, "Diffuse"), Some([1.0, 0.0, 0.0]));

        // zero explicit value counts as unset
        m.diffuse = Some([0.0; 3]);
        assert_eq!(find_color(&m, m.diffuse, "Diffuse"), Some([0.0, 1.0, 0.0]));

        // vector property before color property
        m.properties.reverse();
        assert_eq!(find_color(&m, m.diffuse, "Diffuse"), Some([0.0, 1.0, 0.0]));

        // zero vector falls through to the color
        m.properties[1].value = PropertyValue::Vector([0.0; 3]);
        assert_eq!(find_color(&m, m.diffuse, "Diffuse"), Some([0.0, 0.0, 1.0]));

        m.properties.clear();
        assert_eq!(find_color(&m, None, "Diffuse"), None);
    }

    #[test]
    fn test_emissive_from_property() {
        let mut m = scene::Material::named("glow", SurfaceKind::Lambert);
        m.properties = vec![property("EmissiveColor", PropertyValue::Color([0.0, 0.5, 1.0]))];
        let (material, _) = resolve_one(&scene_with(vec![m]), ShaderCombo::Basic);
        assert_eq!(material.emissive_color, [0.0, 0.5, 1.0]);
        assert_eq!(material.diffuse_color, [0.5, 0.5, 0.5]);
    }

    #[test]
    fn test_phong_specular() {
        let mut m = scene::Material::named("shiny", SurfaceKind::Phong);
        m.properties = vec![
            property("SpecularColor", PropertyValue::Color([0.2, 0.2, 0.2])),
            property("Shininess", PropertyValue::Number(8.0)),
            property("ShininessExponent", PropertyValue::Number(0.0)),
        ];
        let (material, _) = resolve_one(&scene_with(vec![m.clone()]), ShaderCombo::Basic);
        assert_eq!(material.specular_color, [0.2, 0.2, 0.2]);
        // zero exponent is skipped
        assert_eq!(material.specular_power, 8.0);

        m.properties[2].value = PropertyValue::Number(32.0);
        let (material, _) = resolve_one(&scene_with(vec![m]), ShaderCombo::Basic);
        assert_eq!(material.specular_power, 32.0);
    }

    #[test]
    fn test_lambert_ignores_specular() {
        let mut m = scene::Material::named("matte", SurfaceKind::Lambert);
        m.specular = Some([1.0, 1.0, 1.0]);
        m.properties = vec![property("Shininess", PropertyValue::Number(8.0))];
        let (material, _) = resolve_one(&scene_with(vec![m]), ShaderCombo::Basic);
        assert_eq!(material.specular_color, [0.0; 3]);
        assert_eq!(material.specular_power, 0.0);
    }

    #[test]
    fn test_transparency_sets_alpha() {
        let mut m = scene::Material::named("glass", SurfaceKind::Phong);
        m.transparency_factor = Some(0.75);
        let (material, _) = resolve_one(&scene_with(vec![m]), ShaderCombo::Basic);
        assert_eq!(material.alpha, 0.25);

        let mut other = scene::Material::named("other", SurfaceKind::Other);
        other.transparency_factor = Some(0.75);
        let (material, _) = resolve_one(&scene_with(vec![other]), ShaderCombo::Basic);
        assert_eq!(material.alpha, 1.0);
    }

    #[test]
    fn test_diffuse_texture_relative_to_model() {
        let mut m = scene::Material::named("textured", SurfaceKind::Lambert);
        m.properties = vec![Property {
            textures: vec![TextureId(1), TextureId(0)],
            ..property("DiffuseColor", PropertyValue::Color([1.0, 1.0, 1.0]))
        }];
        let mut scene = scene_with(vec![m]);
        scene.textures = vec![
            Texture {
                name: "unused".into(),
                file_name: "unused.png".into(),
                relative_file_name: String::new(),
            },
            Texture {
                name: "albedo".into(),
                file_name: "/authoring/machine/albedo.png".into(),
                relative_file_name: "textures/albedo.png".into(),
            },
        ];

        let (material, content) = resolve_one(&scene, ShaderCombo::Basic);
        let handle = material.texture.unwrap();
        assert_eq!(
            content.textures()[handle.0 as usize],
            Path::new("assets/textures/albedo.png")
        );
        assert_eq!(content.textures().len(), 1);
    }

    #[test]
    fn test_default_material_for_missing_layer() {
        let scene = Scene::default();
        let mut content = RecordingContentImporter::new();
        let mut resolver =
            MaterialResolver::new(&scene, Path::new("m.json"), ShaderSettings::default());
        let index = resolver
            .resolve(None, ShaderCombo::Basic, &mut content)
            .unwrap();
        assert_eq!(resolver.get(index).unwrap().name, DEFAULT_MATERIAL_NAME);
    }

    #[test]
    fn test_unknown_material_is_malformed() {
        let scene = Scene::default();
        let mut content = RecordingContentImporter::new();
        let mut resolver =
            MaterialResolver::new(&scene, Path::new("m.json"), ShaderSettings::default());
        assert!(resolver
            .resolve(Some(MaterialId(3)), ShaderCombo::Basic, &mut content)
            .is_err());
    }
}
