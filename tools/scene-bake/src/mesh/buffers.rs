//! Deduplicating vertex/index buffer construction

use hashbrown::HashMap;
use model_common::{IndexBuffer, Vertex, VertexBuffer, VertexFormat, MAX_VERTEX_COUNT};

use crate::error::{Result, UnsupportedInput};

/// Hashable identity of a vertex
///
/// Raw float bits, with negative zero folded onto positive zero so the key
/// agrees with float equality for every non-NaN value.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey([u32; 16]);

impl VertexKey {
    fn of(vertex: &Vertex) -> Self {
        let floats: &[f32; 16] = bytemuck::cast_ref(vertex);
        Self(floats.map(|f| if f == 0.0 { 0 } else { f.to_bits() }))
    }
}

/// Accumulates unique vertices and the indices that reference them
pub(crate) struct BufferBuilder<'a> {
    mesh: &'a str,
    vertices: Vec<Vertex>,
    lookup: HashMap<VertexKey, u16>,
    indices: Vec<u16>,
}

impl<'a> BufferBuilder<'a> {
    pub fn new(mesh: &'a str) -> Self {
        Self {
            mesh,
            vertices: Vec::new(),
            lookup: HashMap::new(),
            indices: Vec::new(),
        }
    }

    /// Append one index, adding the vertex if it has not been seen
    pub fn push(&mut self, vertex: Vertex) -> Result<()> {
        let key = VertexKey::of(&vertex);
        let index = match self.lookup.get(&key) {
            Some(&index) => index,
            None => {
                if self.vertices.len() >= MAX_VERTEX_COUNT {
                    return Err(UnsupportedInput::TooManyVertices {
                        mesh: self.mesh.to_string(),
                        count: self.vertices.len() + 1,
                        max: MAX_VERTEX_COUNT,
                    }
                    .into());
                }
                let index = self.vertices.len() as u16;
                self.vertices.push(vertex);
                self.lookup.insert(key, index);
                index
            }
        };
        self.indices.push(index);
        Ok(())
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn finish(self, format: VertexFormat) -> (VertexBuffer, IndexBuffer) {
        (
            VertexBuffer {
                format,
                vertices: self.vertices,
            },
            IndexBuffer {
                indices: self.indices,
            },
        )
    }
}
