//! Writing imported models to disk

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use model_common::{pack_vertex_buffer, ModelFile, MODEL_FORMAT};

use crate::content::RecordingContentImporter;
use crate::import::ModelImporter;

/// On-disk representation of an exported model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Binary `.sbmodel` container
    #[default]
    Binary,
    /// Pretty-printed JSON of the same [`ModelFile`]
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Binary => MODEL_FORMAT.extension,
            OutputFormat::Json => "model.json",
        }
    }
}

/// Import `input` and write the result to `output`
pub fn export_model(
    importer: &ModelImporter,
    input: &Path,
    output: &Path,
    format: OutputFormat,
) -> Result<ModelFile> {
    let mut content = RecordingContentImporter::new();
    let model = importer
        .import(input, &mut content)
        .with_context(|| format!("Failed to import {:?}", input))?;
    let (shader_stages, textures) = content.into_parts();
    let file = ModelFile::new(model, shader_stages, textures);

    let out =
        File::create(output).with_context(|| format!("Failed to create output: {:?}", output))?;
    let mut writer = BufWriter::new(out);
    match format {
        OutputFormat::Binary => writer.write_all(&file.to_bytes())?,
        OutputFormat::Json => serde_json::to_writer_pretty(&mut writer, &file)
            .with_context(|| format!("Failed to write JSON: {:?}", output))?,
    }
    writer.flush()?;

    tracing::info!(
        "Exported model: {} bones, {} meshes, {} triangles -> {:?}",
        file.model.bones.len(),
        file.model.meshes.len(),
        file.model.triangle_count(),
        output
    );
    Ok(file)
}

/// Read back an `.sbmodel` file
pub fn read_model(path: &Path) -> Result<ModelFile> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read {:?}", path))?;
    ModelFile::from_bytes(&bytes).with_context(|| format!("Invalid model file: {:?}", path))
}

/// Log the animation stacks of the scene at `input`
pub fn list_stacks(importer: &ModelImporter, input: &Path) -> Result<()> {
    let (file, scene) = importer
        .load_scene(input)
        .with_context(|| format!("Failed to load scene: {:?}", input))?;

    if scene.animation_stacks.is_empty() {
        tracing::info!("No animation stacks found in {:?}", file);
        return Ok(());
    }

    let selected = scene.selected_stack().map(|s| s.name.as_str());
    tracing::info!("Animation stacks in {:?}:", file);
    for (i, stack) in scene.animation_stacks.iter().enumerate() {
        tracing::info!(
            "  [{}] '{}': {:.2}s..{:.2}s, {} layers{}",
            i,
            stack.name,
            stack.span.start,
            stack.span.stop,
            stack.layers.len(),
            if Some(stack.name.as_str()) == selected {
                " (selected)"
            } else {
                ""
            }
        );
    }
    Ok(())
}

/// Log a summary of an exported model file
pub fn describe_model(path: &Path) -> Result<()> {
    let file = read_model(path)?;
    let model = &file.model;

    tracing::info!("{:?} (format v{}, source {})", path, file.version, model.file_name);
    tracing::info!("  bones: {}", model.bones.len());
    for (i, buffer) in model.vertex_buffers.iter().enumerate() {
        tracing::info!(
            "  vertex buffer {}: {} vertices, {:?}, {} bytes packed",
            i,
            buffer.vertices.len(),
            buffer.format,
            pack_vertex_buffer(buffer).len()
        );
    }
    for mesh in &model.meshes {
        tracing::info!(
            "  mesh '{}' on bone {}: {} parts, {} triangles",
            mesh.name,
            mesh.bone,
            mesh.parts.len(),
            mesh.parts.iter().map(|p| u64::from(p.primitive_count)).sum::<u64>()
        );
    }
    for material in &model.materials {
        tracing::info!(
            "  material '{}': diffuse {:?}, alpha {}{}",
            material.name,
            material.diffuse_color,
            material.alpha,
            material
                .texture
                .and_then(|t| file.textures.get(t.0 as usize))
                .map(|t| format!(", texture {}", t))
                .unwrap_or_default()
        );
    }
    if let Some(animations) = &model.animations {
        for (name, sequence) in &animations.sequences {
            tracing::info!(
                "  animation '{}': {} frames, {:.2}s",
                name,
                sequence.frames.len(),
                sequence.duration
            );
        }
    }
    Ok(())
}
