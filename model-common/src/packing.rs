//! Vertex data packing utilities
//!
//! Interleaves a [`VertexBuffer`] into the byte layout its [`VertexFormat`]
//! describes, ready for GPU upload.
//!
//! ```text
//! PositionNormalTexture (32 bytes): pos f32x3 | normal f32x3 | uv f32x2
//! Skinned               (64 bytes): ... | blend indices f32x4 | blend weights f32x4
//! ```

use bytemuck::cast_slice;

use crate::model::{Vertex, VertexBuffer, VertexFormat};

/// Float count of the position/normal/uv prefix shared by every format
const BASIC_FLOATS: usize = 8;

/// Calculate vertex stride in bytes
#[inline]
pub const fn vertex_stride(format: VertexFormat) -> u32 {
    match format {
        VertexFormat::PositionNormalTexture => 32,
        VertexFormat::Skinned => 64,
    }
}

/// Pack a vertex buffer into interleaved bytes
pub fn pack_vertex_buffer(buffer: &VertexBuffer) -> Vec<u8> {
    match buffer.format {
        VertexFormat::Skinned => cast_slice::<Vertex, u8>(&buffer.vertices).to_vec(),
        VertexFormat::PositionNormalTexture => {
            let stride = vertex_stride(buffer.format) as usize;
            let mut data = Vec::with_capacity(buffer.vertices.len() * stride);
            for vertex in &buffer.vertices {
                let floats: &[f32] = cast_slice(std::slice::from_ref(vertex));
                data.extend_from_slice(cast_slice(&floats[..BASIC_FLOATS]));
            }
            data
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn floats(data: &[u8]) -> Vec<f32> {
        data.chunks_exact(4)
            .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn sample_vertex() -> Vertex {
        Vertex {
            position: [1.0, 2.0, 3.0],
            normal: [0.0, 1.0, 0.0],
            tex_coord: [0.25, 0.75],
            blend_indices: [2.0, 0.0, 0.0, 0.0],
            blend_weights: [1.0, 0.0, 0.0, 0.0],
        }
    }

    #[test]
    fn test_stride_matches_vertex_size() {
        assert_eq!(
            vertex_stride(VertexFormat::Skinned) as usize,
            std::mem::size_of::<Vertex>()
        );
        assert_eq!(vertex_stride(VertexFormat::PositionNormalTexture), 32);
    }

    #[test]
    fn test_basic_format_drops_skinning() {
        let buffer = VertexBuffer {
            format: VertexFormat::PositionNormalTexture,
            vertices: vec![sample_vertex(), sample_vertex()],
        };
        let data = pack_vertex_buffer(&buffer);
        assert_eq!(data.len(), 64);

        assert_eq!(
            floats(&data[..32]),
            vec![1.0, 2.0, 3.0, 0.0, 1.0, 0.0, 0.25, 0.75]
        );
    }

    #[test]
    fn test_skinned_format_keeps_blend_data() {
        let buffer = VertexBuffer {
            format: VertexFormat::Skinned,
            vertices: vec![sample_vertex()],
        };
        let data = pack_vertex_buffer(&buffer);
        assert_eq!(data.len(), 64);

        let floats = floats(&data);
        assert_eq!(&floats[8..12], &[2.0, 0.0, 0.0, 0.0]);
        assert_eq!(&floats[12..16], &[1.0, 0.0, 0.0, 0.0]);
    }
}
