//! Smooth per-vertex normal synthesis

use meshprep_core::{names, Attribute, Geometry, GeometryError, Vec3};

use crate::{check_index_range, synthesis_triangles};

const EPSILON10: f64 = 1e-10;

/// Compute smooth per-vertex normals from counter-clockwise triangles.
///
/// Each vertex normal is the normalized sum of the unnormalized (area
/// weighted) face normals of the triangles using it. Where the sum cancels
/// out, the first contributing face normal is used; vertices with no usable
/// face get `(0, 0, 1)`. An existing `normal` attribute is overwritten.
///
/// Returns the geometry unchanged unless it is an indexed triangle list
/// with whole triangles.
///
/// # Errors
/// Fails if `position` is missing or not 3-component, or if an index is out
/// of range.
pub fn compute_normal(mut geometry: Geometry) -> Result<Geometry, GeometryError> {
    let positions = geometry.require_attribute(names::POSITION)?;
    positions.expect_components(names::POSITION, 3)?;

    let Some(indices) = synthesis_triangles(&geometry) else {
        return Ok(geometry);
    };
    let vertex_count = positions.vertex_count();
    check_index_range(&indices, vertex_count)?;

    let mut sums = vec![Vec3::ZERO; vertex_count];
    let mut first_face: Vec<Option<Vec3>> = vec![None; vertex_count];

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let v0 = Vec3::from_slice(&positions.values, i0 * 3);
        let v1 = Vec3::from_slice(&positions.values, i1 * 3);
        let v2 = Vec3::from_slice(&positions.values, i2 * 3);
        let face = (v1 - v0).cross(v2 - v0);

        for i in [i0, i1, i2] {
            sums[i] += face;
            first_face[i].get_or_insert(face);
        }
    }

    let mut values = Vec::with_capacity(vertex_count * 3);
    for (sum, first) in sums.into_iter().zip(first_face) {
        let normal = if sum.length_squared() > EPSILON10 {
            sum.normalized()
        } else {
            match first {
                Some(face) if face.length_squared() > EPSILON10 => face.normalized(),
                _ => Vec3::Z,
            }
        };
        values.extend_from_slice(&normal.to_array());
    }

    match geometry.attributes.get_mut(names::NORMAL) {
        Some(normal) => {
            normal.components_per_attribute = 3;
            normal.values = values;
        }
        None => {
            geometry.attributes.insert(names::NORMAL.to_string(), Attribute::float3(values));
        }
    }

    Ok(geometry)
}
