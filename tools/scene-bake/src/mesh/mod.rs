//! Mesh assembly
//!
//! Turns one scene mesh attachment into an engine mesh: per-corner vertices
//! with normals, UVs and skin weights, fan-triangulated, grouped by material,
//! and deduplicated into one vertex/index buffer pair shared by every part.

mod buffers;
mod layers;
mod triangulate;

use glam::{Mat4, Quat, Vec3};
use hashbrown::HashMap;
use model_common::{IndexBuffer, Mesh, MeshPart, Vertex, VertexBuffer, VertexFormat};

use crate::content::ContentImporter;
use crate::error::{ImportError, LayerKind, Result};
use crate::hierarchy::Hierarchy;
use crate::material::{MaterialResolver, ShaderCombo};
use crate::math::{flip_v, vec2_from_scene, vec3_from_scene};
use crate::scene::{self, MaterialId, MeshId, NodeId, Scene};
use crate::skin::{self, SkinWeights};

use buffers::BufferBuilder;
use layers::{MaterialAssignment, PolygonVertexLayer};

/// Normal given to vertices of meshes without a normal layer
pub const DEFAULT_NORMAL: [f32; 3] = [0.0, 1.0, 0.0];

/// Output of assembling one mesh attachment
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledMesh {
    pub mesh: Mesh,
    pub vertex_buffer: VertexBuffer,
    pub index_buffer: IndexBuffer,
}

/// Space vertices are emitted in
#[derive(Debug, Clone, Copy)]
enum VertexSpace {
    /// Node-local, as stored in the scene
    Local,
    /// Node global transform applied
    Global { transform: Mat4, orientation: Quat },
}

impl VertexSpace {
    fn position(&self, p: Vec3) -> Vec3 {
        match self {
            VertexSpace::Local => p,
            VertexSpace::Global { transform, .. } => transform.transform_point3(p),
        }
    }

    fn normal(&self, n: Vec3) -> Vec3 {
        match self {
            VertexSpace::Local => n,
            VertexSpace::Global { orientation, .. } => *orientation * n,
        }
    }
}

pub struct MeshAssembler<'a> {
    scene: &'a Scene,
    hierarchy: &'a Hierarchy,
    /// Global node transforms, present when vertices are baked into global space
    globals: Option<&'a [Mat4]>,
}

impl<'a> MeshAssembler<'a> {
    pub fn new(scene: &'a Scene, hierarchy: &'a Hierarchy) -> Self {
        Self {
            scene,
            hierarchy,
            globals: None,
        }
    }

    /// Bake each node's global transform into its mesh's vertices
    pub fn with_global_transforms(mut self, globals: &'a [Mat4]) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Assemble the mesh attached to `node`
    ///
    /// `buffer_slot` is the index the caller will store the returned vertex
    /// and index buffers at; every part references it.
    pub fn assemble(
        &self,
        node: NodeId,
        mesh_id: MeshId,
        buffer_slot: u32,
        materials: &mut MaterialResolver<'_>,
        content: &mut dyn ContentImporter,
    ) -> Result<AssembledMesh> {
        let source = self.scene.mesh(mesh_id)?;
        let bone = self.hierarchy.bone_index(node)?;
        let space = self.vertex_space(node)?;

        let skin = skin::extract(source, self.hierarchy)?;
        let format = if skin.is_some() {
            VertexFormat::Skinned
        } else {
            VertexFormat::PositionNormalTexture
        };
        let base = base_vertices(source, skin.as_ref(), space);
        let groups = self.material_groups(source, &base, space)?;

        let combo = ShaderCombo::for_skinned(format.is_skinned());
        let mut builder = BufferBuilder::new(&source.name);
        let mut parts = Vec::with_capacity(groups.len());

        for (material, triangles) in groups {
            let start_index = builder.index_count() as u32;
            for vertex in triangles.iter().flatten() {
                builder.push(*vertex)?;
            }
            parts.push(MeshPart {
                material: materials.resolve(material, combo, content)?,
                vertex_buffer: buffer_slot,
                index_buffer: buffer_slot,
                start_index,
                primitive_count: triangles.len() as u32,
            });
        }

        tracing::info!(
            "Mesh '{}': {} parts, {} vertices, {} indices{}",
            source.name,
            parts.len(),
            builder.vertex_count(),
            builder.index_count(),
            if format.is_skinned() { ", skinned" } else { "" }
        );

        let (vertex_buffer, index_buffer) = builder.finish(format);
        Ok(AssembledMesh {
            mesh: Mesh {
                name: source.name.clone(),
                bone,
                parts,
            },
            vertex_buffer,
            index_buffer,
        })
    }

    fn vertex_space(&self, node: NodeId) -> Result<VertexSpace> {
        let Some(globals) = self.globals else {
            return Ok(VertexSpace::Local);
        };
        let transform = *globals.get(node.index()).ok_or_else(|| {
            ImportError::malformed(format!("no global transform for node {}", node.index()))
        })?;
        let (_, orientation, _) = transform.to_scale_rotation_translation();
        Ok(VertexSpace::Global {
            transform,
            orientation,
        })
    }

    /// Per-corner vertex copies, triangulated and grouped by material in
    /// order of first use
    fn material_groups(
        &self,
        source: &scene::Mesh,
        base: &[Vertex],
        space: VertexSpace,
    ) -> Result<Vec<(Option<MaterialId>, Vec<[Vertex; 3]>)>> {
        let name = source.name.as_str();
        let corner_count = source.polygon_vertex_count();
        let normals = source
            .normals
            .as_ref()
            .map(|e| PolygonVertexLayer::new(name, LayerKind::Normals, e, corner_count))
            .transpose()?;
        let uvs = source
            .uvs
            .as_ref()
            .map(|e| PolygonVertexLayer::new(name, LayerKind::TexCoords, e, corner_count))
            .transpose()?;
        let assignment = source
            .materials
            .as_ref()
            .map(|e| MaterialAssignment::resolve(name, e, source.polygons.len()))
            .transpose()?;
        if assignment.is_none() {
            tracing::warn!("Mesh '{}' has no material layer, using the default material", name);
        }

        let mut groups: Vec<(Option<MaterialId>, Vec<[Vertex; 3]>)> = Vec::new();
        let mut group_of: HashMap<Option<MaterialId>, usize> = HashMap::new();
        let mut corners: Vec<Vertex> = Vec::new();
        let mut counter = 0usize;

        for (p, polygon) in source.polygons.iter().enumerate() {
            let triangles = triangulate::fan(name, p, polygon.len())?;

            corners.clear();
            for &control_point in polygon {
                let mut vertex = *base.get(control_point).ok_or_else(|| {
                    ImportError::malformed(format!(
                        "mesh '{}' polygon {} references control point {} of {}",
                        name,
                        p,
                        control_point,
                        base.len()
                    ))
                })?;
                if let Some(layer) = &normals {
                    let n = space.normal(vec3_from_scene(layer.get(counter)?));
                    vertex.normal = n.to_array();
                }
                if let Some(layer) = &uvs {
                    vertex.tex_coord = flip_v(vec2_from_scene(layer.get(counter)?)).to_array();
                }
                corners.push(vertex);
                counter += 1;
            }

            let material = assignment.as_ref().map(|a| a.material_of(p));
            let group = *group_of.entry(material).or_insert_with(|| {
                groups.push((material, Vec::new()));
                groups.len() - 1
            });
            groups[group]
                .1
                .extend(triangles.map(|[a, b, c]| [corners[a], corners[b], corners[c]]));
        }

        Ok(groups)
    }
}

/// One vertex per control point: position, default normal, skin weights
fn base_vertices(
    source: &scene::Mesh,
    skin: Option<&SkinWeights>,
    space: VertexSpace,
) -> Vec<Vertex> {
    source
        .control_points
        .iter()
        .enumerate()
        .map(|(i, &point)| {
            let (blend_indices, blend_weights) =
                skin.map(|s| s.packed(i)).unwrap_or_default();
            Vertex {
                position: space.position(vec3_from_scene(point)).to_array(),
                normal: DEFAULT_NORMAL,
                tex_coord: [0.0; 2],
                blend_indices,
                blend_weights,
            }
        })
        .collect()
}
