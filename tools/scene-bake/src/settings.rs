//! Import settings (`scene-bake.toml`)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for one import
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSettings {
    /// Animation samples per second.
    /// Default: 60
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,

    /// Explicit sampling step in seconds. Overrides `frame_rate` when set.
    #[serde(default)]
    pub sample_step: Option<f64>,

    /// Bake each mesh's global node transform into its vertices.
    /// Default: false (vertices stay in the node's local space)
    #[serde(default)]
    pub bake_global_transform: bool,

    /// Extension probed when the input path does not exist as given (no dot).
    /// Default: "json"
    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub shaders: ShaderSettings,
}

/// Symbolic shader stage names handed to the content importer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShaderSettings {
    /// Vertex stage for skinned meshes
    #[serde(default = "default_skinned_shader")]
    pub skinned: String,
    /// Vertex stage for unskinned meshes
    #[serde(default = "default_basic_shader")]
    pub basic: String,
    /// Fragment stage for every material
    #[serde(default = "default_basic_shader")]
    pub fragment: String,
}

fn default_frame_rate() -> f64 {
    60.0
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_skinned_shader() -> String {
    "$skinned".to_string()
}

fn default_basic_shader() -> String {
    "$basic".to_string()
}

impl Default for ShaderSettings {
    fn default() -> Self {
        Self {
            skinned: default_skinned_shader(),
            basic: default_basic_shader(),
            fragment: default_basic_shader(),
        }
    }
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            frame_rate: default_frame_rate(),
            sample_step: None,
            bake_global_transform: false,
            extension: default_extension(),
            shaders: ShaderSettings::default(),
        }
    }
}

impl ImportSettings {
    /// Load settings from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse settings from string
    pub fn parse(content: &str) -> Result<Self> {
        let settings: Self = toml::from_str(content).context("Failed to parse import settings")?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if !(self.frame_rate.is_finite() && self.frame_rate > 0.0) {
            anyhow::bail!("frame_rate must be positive, got {}", self.frame_rate);
        }
        if let Some(step) = self.sample_step {
            if !(step.is_finite() && step > 0.0) {
                anyhow::bail!("sample_step must be positive, got {}", step);
            }
        }
        Ok(())
    }

    /// Samples per second actually used for baking
    pub fn sample_rate(&self) -> f64 {
        match self.sample_step {
            Some(step) => 1.0 / step,
            None => self.frame_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let settings = ImportSettings::parse("").unwrap();
        assert_eq!(settings, ImportSettings::default());
        assert_eq!(settings.sample_rate(), 60.0);
        assert_eq!(settings.shaders.skinned, "$skinned");
        assert_eq!(settings.shaders.basic, "$basic");
        assert_eq!(settings.shaders.fragment, "$basic");
    }

    #[test]
    fn test_partial_override() {
        let toml = r#"
frame_rate = 30.0
bake_global_transform = true

[shaders]
fragment = "lit"
"#;
        let settings = ImportSettings::parse(toml).unwrap();
        assert_eq!(settings.frame_rate, 30.0);
        assert!(settings.bake_global_transform);
        assert_eq!(settings.extension, "json");
        assert_eq!(settings.shaders.fragment, "lit");
        assert_eq!(settings.shaders.skinned, "$skinned");
    }

    #[test]
    fn test_sample_step_overrides_rate() {
        let settings = ImportSettings::parse("frame_rate = 24.0\nsample_step = 0.5").unwrap();
        assert_eq!(settings.sample_rate(), 2.0);
    }

    #[test]
    fn test_rejects_non_positive_rate() {
        assert!(ImportSettings::parse("frame_rate = 0.0").is_err());
        assert!(ImportSettings::parse("sample_step = -1.0").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene-bake.toml");
        std::fs::write(&path, "extension = \"scene\"\n").unwrap();

        let settings = ImportSettings::load(&path).unwrap();
        assert_eq!(settings.extension, "scene");
        assert!(ImportSettings::load(&dir.path().join("missing.toml")).is_err());
    }
}
