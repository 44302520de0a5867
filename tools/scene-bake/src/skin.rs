//! Skin weight extraction
//!
//! Collects per-control-point (bone, weight) influences from a mesh's skin
//! deformer. Influences keep cluster order; nothing is sorted or normalized.

use model_common::MAX_BONE_INFLUENCES;
use smallvec::SmallVec;

use crate::error::{ImportError, Result, UnsupportedInput};
use crate::hierarchy::Hierarchy;
use crate::scene::Mesh;

/// (bone index, weight) pairs of one control point, in cluster order
pub type Influences = SmallVec<[(u32, f32); MAX_BONE_INFLUENCES]>;

/// Influence lists for every control point of a skinned mesh
#[derive(Debug, Clone, PartialEq)]
pub struct SkinWeights {
    pub influences: Vec<Influences>,
}

impl SkinWeights {
    /// Blend indices and weights for one control point, zero-padded
    pub fn packed(&self, control_point: usize) -> ([f32; 4], [f32; 4]) {
        self.influences
            .get(control_point)
            .map(|i| pack_influences(i))
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.influences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.influences.is_empty()
    }
}

/// Extract skin weights for `mesh`
///
/// Returns `Ok(None)` for a mesh without deformers. More than one deformer,
/// or a fifth influence on any control point, is unsupported.
pub fn extract(mesh: &Mesh, hierarchy: &Hierarchy) -> Result<Option<SkinWeights>> {
    let skin = match mesh.skins.as_slice() {
        [] => return Ok(None),
        [skin] => skin,
        skins => {
            return Err(UnsupportedInput::TooManyDeformers {
                mesh: mesh.name.clone(),
                count: skins.len(),
            }
            .into());
        }
    };

    let mut influences = vec![Influences::new(); mesh.control_points.len()];

    for cluster in &skin.clusters {
        let bone = hierarchy.bone_index(cluster.link)?;
        if cluster.indices.len() != cluster.weights.len() {
            return Err(ImportError::malformed(format!(
                "mesh '{}': cluster for bone {} has {} indices but {} weights",
                mesh.name,
                bone,
                cluster.indices.len(),
                cluster.weights.len()
            )));
        }

        for (&control_point, &weight) in cluster.indices.iter().zip(&cluster.weights) {
            let list = influences.get_mut(control_point).ok_or_else(|| {
                ImportError::malformed(format!(
                    "mesh '{}': cluster references control point {} of {}",
                    mesh.name,
                    control_point,
                    mesh.control_points.len()
                ))
            })?;

            if list.len() == MAX_BONE_INFLUENCES {
                return Err(UnsupportedInput::TooManyInfluences {
                    mesh: mesh.name.clone(),
                    control_point,
                    max: MAX_BONE_INFLUENCES,
                }
                .into());
            }
            list.push((bone, weight as f32));
        }
    }

    tracing::debug!(
        "Mesh '{}': {} clusters over {} control points",
        mesh.name,
        skin.clusters.len(),
        influences.len()
    );

    Ok(Some(SkinWeights { influences }))
}

/// Pack influences into fixed-width blend index/weight vectors
pub fn pack_influences(influences: &[(u32, f32)]) -> ([f32; 4], [f32; 4]) {
    let mut indices = [0.0f32; 4];
    let mut weights = [0.0f32; 4];
    for (slot, &(bone, weight)) in influences.iter().take(MAX_BONE_INFLUENCES).enumerate() {
        indices[slot] = bone as f32;
        weights[slot] = weight;
    }
    (indices, weights)
}
