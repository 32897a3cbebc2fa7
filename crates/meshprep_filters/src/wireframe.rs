//! Triangle topologies to line lists (wireframe)

use meshprep_core::{Geometry, GeometryError, Indices, PrimitiveType};

use crate::check_index_range;

fn push_triangle_edges(lines: &mut Vec<u32>, a: u32, b: u32, c: u32) {
    lines.extend_from_slice(&[a, b, b, c, c, a]);
}

fn triangles_to_lines(triangles: &[u32]) -> Vec<u32> {
    let mut lines = Vec::with_capacity(triangles.len() * 2);
    for tri in triangles.chunks_exact(3) {
        push_triangle_edges(&mut lines, tri[0], tri[1], tri[2]);
    }
    lines
}

fn triangle_strip_to_lines(strip: &[u32]) -> Vec<u32> {
    if strip.len() < 3 {
        return Vec::new();
    }
    let mut lines = Vec::with_capacity((strip.len() - 2) * 6);
    push_triangle_edges(&mut lines, strip[0], strip[1], strip[2]);
    for i in 3..strip.len() {
        push_triangle_edges(&mut lines, strip[i], strip[i - 1], strip[i - 2]);
    }
    lines
}

fn triangle_fan_to_lines(fan: &[u32]) -> Vec<u32> {
    if fan.len() < 3 {
        return Vec::new();
    }
    let base = fan[0];
    let mut lines = Vec::with_capacity((fan.len() - 2) * 6);
    for pair in fan[1..].windows(2) {
        push_triangle_edges(&mut lines, base, pair[0], pair[1]);
    }
    lines
}

/// Convert a triangle, triangle-strip or triangle-fan geometry into a line
/// list of every triangle edge.
///
/// Each triangle `(a, b, c)` yields the edges `(a, b), (b, c), (c, a)`.
/// Edges shared between triangles are emitted once per triangle. A geometry
/// without indices is returned unchanged.
///
/// # Errors
/// [`GeometryError::UnsupportedPrimitiveType`] if an indexed geometry is not
/// a triangle topology, [`GeometryError::InvalidIndexCount`] for a triangle
/// list with a partial triangle and [`GeometryError::IndexOutOfRange`] for
/// dangling indices.
pub fn to_wireframe(mut geometry: Geometry) -> Result<Geometry, GeometryError> {
    let Some(indices) = geometry.indices.as_ref() else {
        return Ok(geometry);
    };
    let triangles = indices.to_u32_vec();

    if geometry.primitive_type == PrimitiveType::Triangles && triangles.len() % 3 != 0 {
        return Err(GeometryError::InvalidIndexCount {
            count: triangles.len(),
            per_primitive: 3,
        });
    }

    let lines = match geometry.primitive_type {
        PrimitiveType::Triangles => triangles_to_lines(&triangles),
        PrimitiveType::TriangleStrip => triangle_strip_to_lines(&triangles),
        PrimitiveType::TriangleFan => triangle_fan_to_lines(&triangles),
        other => {
            return Err(GeometryError::UnsupportedPrimitiveType {
                expected: "TRIANGLES, TRIANGLE_STRIP or TRIANGLE_FAN",
                actual: other,
            });
        }
    };

    let vertex_count = geometry.vertex_count()?;
    check_index_range(&triangles, vertex_count)?;
    geometry.indices = Some(Indices::for_vertex_count(vertex_count, lines));
    geometry.primitive_type = PrimitiveType::Lines;
    Ok(geometry)
}
