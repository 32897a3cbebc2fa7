//! Line geometry for inspecting per-vertex vectors

use meshprep_core::{names, Attribute, BoundingSphere, Geometry, GeometryError, PrimitiveType, Vec3};

/// Build a LINES geometry with one segment per vertex, from the vertex
/// position to `position + vector * length`.
///
/// Useful for checking synthesized normals or tangents. The result is not
/// indexed; its bounding sphere is the source sphere grown by `length`.
///
/// # Errors
/// Fails if `position` or `attribute_name` is missing, not 3-component, or
/// the two disagree on vertex count.
pub fn create_line_segments_for_vectors(
    geometry: &Geometry,
    attribute_name: &str,
    length: f64,
) -> Result<Geometry, GeometryError> {
    let positions = geometry.require_attribute(names::POSITION)?;
    positions.expect_components(names::POSITION, 3)?;
    let vectors = geometry.require_attribute(attribute_name)?;
    vectors.expect_components(attribute_name, 3)?;

    let vertex_count = positions.vertex_count();
    if vectors.vertex_count() != vertex_count {
        return Err(GeometryError::VertexCountMismatch {
            name: attribute_name.to_string(),
            expected: vertex_count,
            actual: vectors.vertex_count(),
        });
    }

    let mut values = Vec::with_capacity(vertex_count * 6);
    for (p, v) in positions.values.chunks_exact(3).zip(vectors.values.chunks_exact(3)) {
        let start = Vec3::from_slice(p, 0);
        let end = start + Vec3::from_slice(v, 0) * length;
        values.extend_from_slice(&start.to_array());
        values.extend_from_slice(&end.to_array());
    }

    let mut lines = Geometry::new(PrimitiveType::Lines).with_attribute(names::POSITION, Attribute::double3(values));
    lines.bounding_sphere = geometry
        .bounding_sphere
        .map(|sphere| BoundingSphere::new(sphere.center, sphere.radius + length));
    Ok(lines)
}
