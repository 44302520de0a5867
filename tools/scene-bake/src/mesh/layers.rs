//! Layer element resolution
//!
//! Normal and UV layers are read per polygon-vertex occurrence; the material
//! layer is read per polygon. Any mapping/reference combination outside the
//! ones handled here is rejected as unsupported input.

use crate::error::{ImportError, LayerKind, Result, UnsupportedInput};
use crate::scene::{LayerElement, MappingMode, MaterialId, ReferenceMode};

/// A validated per-polygon-vertex layer
pub(crate) struct PolygonVertexLayer<'a, T> {
    mesh: &'a str,
    kind: LayerKind,
    element: &'a LayerElement<T>,
}

impl<'a, T: Copy> PolygonVertexLayer<'a, T> {
    /// `corner_count` is the mesh's total polygon-vertex count; the array
    /// walked by the running counter must have exactly that many entries
    pub fn new(
        mesh: &'a str,
        kind: LayerKind,
        element: &'a LayerElement<T>,
        corner_count: usize,
    ) -> Result<Self> {
        let (array, len) = match (element.mapping_mode, element.reference_mode) {
            (MappingMode::ByPolygonVertex, ReferenceMode::Direct) => {
                ("direct", element.direct.len())
            }
            (MappingMode::ByPolygonVertex, ReferenceMode::IndexToDirect) => {
                ("index", element.index.len())
            }
            (mapping, reference) => {
                return Err(UnsupportedInput::LayerMode {
                    mesh: mesh.to_string(),
                    layer: kind,
                    mapping,
                    reference,
                }
                .into());
            }
        };
        if len != corner_count {
            return Err(ImportError::malformed(format!(
                "mesh '{}' {} layer: {} array has {} entries for {} polygon vertices",
                mesh,
                kind,
                array,
                len,
                corner_count
            )));
        }
        Ok(Self {
            mesh,
            kind,
            element,
        })
    }

    /// Value for the `counter`-th polygon-vertex occurrence of the mesh
    pub fn get(&self, counter: usize) -> Result<T> {
        let direct_index = match self.element.reference_mode {
            ReferenceMode::IndexToDirect => *self.element.index.get(counter).ok_or_else(|| {
                self.out_of_range("index", counter, self.element.index.len())
            })?,
            _ => counter,
        };
        self.element
            .direct
            .get(direct_index)
            .copied()
            .ok_or_else(|| self.out_of_range("direct", direct_index, self.element.direct.len()))
    }

    fn out_of_range(&self, array: &str, at: usize, len: usize) -> ImportError {
        ImportError::malformed(format!(
            "mesh '{}' {} layer: {} array has {} entries, needed entry {}",
            self.mesh, self.kind, array, len, at
        ))
    }
}

/// Material of every polygon, as read from the material layer
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum MaterialAssignment {
    /// One material for the whole mesh
    AllSame(MaterialId),
    /// One material per polygon
    ByPolygon(Vec<MaterialId>),
}

impl MaterialAssignment {
    pub fn resolve(
        mesh: &str,
        element: &LayerElement<MaterialId>,
        polygon_count: usize,
    ) -> Result<Self> {
        let unsupported = || -> ImportError {
            UnsupportedInput::LayerMode {
                mesh: mesh.to_string(),
                layer: LayerKind::Materials,
                mapping: element.mapping_mode,
                reference: element.reference_mode,
            }
            .into()
        };

        if element.reference_mode != ReferenceMode::IndexToDirect {
            return Err(unsupported());
        }

        let lookup = |index: usize| {
            element.direct.get(index).copied().ok_or_else(|| {
                ImportError::malformed(format!(
                    "mesh '{}' material layer: index {} past {} materials",
                    mesh,
                    index,
                    element.direct.len()
                ))
            })
        };

        match element.mapping_mode {
            MappingMode::AllSame => {
                let index = element.index.first().copied().unwrap_or(0);
                Ok(MaterialAssignment::AllSame(lookup(index)?))
            }
            MappingMode::ByPolygon => {
                if element.index.len() != polygon_count {
                    return Err(ImportError::malformed(format!(
                        "mesh '{}' material layer: {} indices for {} polygons",
                        mesh,
                        element.index.len(),
                        polygon_count
                    )));
                }
                let materials = element
                    .index
                    .iter()
                    .map(|&i| lookup(i))
                    .collect::<Result<Vec<_>>>()?;
                Ok(MaterialAssignment::ByPolygon(materials))
            }
            _ => Err(unsupported()),
        }
    }

    pub fn material_of(&self, polygon: usize) -> MaterialId {
        match self {
            MaterialAssignment::AllSame(material) => *material,
            MaterialAssignment::ByPolygon(materials) => materials[polygon],
        }
    }
}
