//! Mesh attachments, attribute layers and skin deformers

use serde::{Deserialize, Serialize};

use super::{MaterialId, NodeId};

/// How a layer's values are associated with mesh elements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MappingMode {
    None,
    ByControlPoint,
    ByPolygonVertex,
    ByPolygon,
    ByEdge,
    AllSame,
}

/// Whether layer values are read in visiting order or through an index array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceMode {
    Direct,
    Index,
    IndexToDirect,
}

/// One attribute layer (normals, UVs, material assignment)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerElement<T> {
    pub mapping_mode: MappingMode,
    pub reference_mode: ReferenceMode,
    pub direct: Vec<T>,
    #[serde(default)]
    pub index: Vec<usize>,
}

/// Weights of the control points one bone influences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cluster {
    /// Node acting as the bone
    pub link: NodeId,
    #[serde(default)]
    pub indices: Vec<usize>,
    #[serde(default)]
    pub weights: Vec<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skin {
    pub clusters: Vec<Cluster>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub control_points: Vec<[f64; 3]>,
    /// Control-point index groups, one per polygon
    pub polygons: Vec<Vec<usize>>,
    #[serde(default)]
    pub normals: Option<LayerElement<[f64; 3]>>,
    #[serde(default)]
    pub uvs: Option<LayerElement<[f64; 2]>>,
    #[serde(default)]
    pub materials: Option<LayerElement<MaterialId>>,
    /// Skin deformers
    #[serde(default)]
    pub skins: Vec<Skin>,
}

impl Mesh {
    /// Total polygon-vertex occurrences across all polygons
    pub fn polygon_vertex_count(&self) -> usize {
        self.polygons.iter().map(|p| p.len()).sum()
    }
}
