//! Polygon triangulation

use crate::error::{Result, UnsupportedInput};

/// Fan-triangulate a polygon of `count` corners from corner 0
///
/// Yields corner positions within the polygon, `count - 2` triangles of the
/// form `(0, i - 1, i)`. Triangles pass through unchanged.
pub(crate) fn fan(
    mesh: &str,
    polygon: usize,
    count: usize,
) -> Result<impl Iterator<Item = [usize; 3]>> {
    if count < 3 {
        return Err(UnsupportedInput::DegeneratePolygon {
            mesh: mesh.to_string(),
            polygon,
            count,
        }
        .into());
    }
    Ok((2..count).map(|i| [0, i - 1, i]))
}
