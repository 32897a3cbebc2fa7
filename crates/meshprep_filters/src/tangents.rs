//! Tangent space synthesis

use meshprep_core::{names, Attribute, Geometry, GeometryError, Vec3};

use crate::{check_index_range, synthesis_triangles};

/// Texture-space determinants below this are treated as degenerate
const DETERMINANT_EPSILON: f64 = 1e-12;

/// Orthogonalized tangents shorter than this are replaced
const TANGENT_EPSILON: f64 = 1e-10;

/// Compute per-vertex `tangent` and `binormal` attributes.
///
/// Per triangle, the tangent direction follows Lengyel's method from the
/// edge vectors and texture coordinate deltas; it is accumulated into each
/// corner vertex. Per vertex the sum is made orthogonal to the normal with
/// one Gram-Schmidt step, and the binormal is `normalize(n x t)`.
///
/// Triangles whose texture coordinates are degenerate contribute nothing.
/// A vertex left without a usable tangent receives some unit vector
/// perpendicular to its normal.
///
/// Same no-op conditions as [`compute_normal`](crate::compute_normal).
///
/// # Errors
/// Fails if `position`, `normal` (3 components) or `st` (2 components) is
/// missing or malformed, if their vertex counts differ, or if an index is
/// out of range.
pub fn compute_tangent_and_binormal(mut geometry: Geometry) -> Result<Geometry, GeometryError> {
    let positions = geometry.require_attribute(names::POSITION)?;
    positions.expect_components(names::POSITION, 3)?;
    let normals = geometry.require_attribute(names::NORMAL)?;
    normals.expect_components(names::NORMAL, 3)?;
    let st = geometry.require_attribute(names::ST)?;
    st.expect_components(names::ST, 2)?;

    let vertex_count = positions.vertex_count();
    for (name, attribute) in [(names::NORMAL, normals), (names::ST, st)] {
        if attribute.vertex_count() != vertex_count {
            return Err(GeometryError::VertexCountMismatch {
                name: name.to_string(),
                expected: vertex_count,
                actual: attribute.vertex_count(),
            });
        }
    }

    let Some(indices) = synthesis_triangles(&geometry) else {
        return Ok(geometry);
    };
    check_index_range(&indices, vertex_count)?;

    let mut sums = vec![Vec3::ZERO; vertex_count];
    let mut skipped = 0usize;

    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let v0 = Vec3::from_slice(&positions.values, i0 * 3);
        let e1 = Vec3::from_slice(&positions.values, i1 * 3) - v0;
        let e2 = Vec3::from_slice(&positions.values, i2 * 3) - v0;

        let (s0, t0) = (st.values[i0 * 2], st.values[i0 * 2 + 1]);
        let (du1, dv1) = (st.values[i1 * 2] - s0, st.values[i1 * 2 + 1] - t0);
        let (du2, dv2) = (st.values[i2 * 2] - s0, st.values[i2 * 2 + 1] - t0);

        let determinant = du1 * dv2 - du2 * dv1;
        if determinant.abs() < DETERMINANT_EPSILON {
            skipped += 1;
            continue;
        }
        let tangent = (e1 * dv2 - e2 * dv1) / determinant;

        for i in [i0, i1, i2] {
            sums[i] += tangent;
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {} triangles with degenerate texture coordinates", skipped);
    }

    let mut tangents = Vec::with_capacity(vertex_count * 3);
    let mut binormals = Vec::with_capacity(vertex_count * 3);
    for (v, sum) in sums.into_iter().enumerate() {
        let n = Vec3::from_slice(&normals.values, v * 3).normalized();
        let orthogonal = sum - n * n.dot(sum);
        let tangent = if orthogonal.length_squared() > TANGENT_EPSILON {
            orthogonal.normalized()
        } else {
            n.any_orthonormal()
        };
        let binormal = n.cross(tangent).normalized();
        tangents.extend_from_slice(&tangent.to_array());
        binormals.extend_from_slice(&binormal.to_array());
    }

    geometry.attributes.insert(names::TANGENT.to_string(), Attribute::float3(tangents));
    geometry.attributes.insert(names::BINORMAL.to_string(), Attribute::float3(binormals));
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_normal;
    use crate::test_util::{approx_eq, grid};
    use meshprep_core::PrimitiveType;

    fn vector(geometry: &Geometry, name: &str, vertex: usize) -> Vec3 {
        Vec3::from_slice(&geometry.attributes[name].values, vertex * 3)
    }

    fn uv_triangle() -> Geometry {
        Geometry::new(PrimitiveType::Triangles)
            .with_attribute(
                names::POSITION,
                Attribute::double3(vec![0.0, 0.0, 0.0, 2.0, 0.0, 0.3, 0.5, 1.0, -0.2]),
            )
            .with_attribute(names::ST, Attribute::float2(vec![0.0, 0.0, 1.0, 0.1, 0.2, 1.0]))
            .with_indices(vec![0u16, 1, 2])
    }

    #[test]
    fn test_orthonormal_basis() {
        let g = compute_tangent_and_binormal(compute_normal(uv_triangle()).unwrap()).unwrap();
        for v in 0..3 {
            let n = vector(&g, names::NORMAL, v);
            let t = vector(&g, names::TANGENT, v);
            let b = vector(&g, names::BINORMAL, v);
            assert!(approx_eq(n.length(), 1.0));
            assert!(approx_eq(t.length(), 1.0));
            assert!(approx_eq(b.length(), 1.0));
            assert!(approx_eq(n.dot(t), 0.0));
            assert!(approx_eq(n.dot(b), 0.0));
            assert!(approx_eq(t.dot(b), 0.0));
        }
    }

    #[test]
    fn test_grid_tangent_follows_s() {
        // s grows along +X, t along +Y
        let g = compute_tangent_and_binormal(compute_normal(grid(3, 2)).unwrap()).unwrap();
        for v in 0..g.validate().unwrap() {
            assert!(vector(&g, names::TANGENT, v).abs_diff_eq(Vec3::X, 1e-9));
            assert!(vector(&g, names::BINORMAL, v).abs_diff_eq(Vec3::Y, 1e-9));
        }
    }

    #[test]
    fn test_degenerate_uvs_fall_back() {
        let g = uv_triangle().with_attribute(names::ST, Attribute::float2(vec![0.5; 6]));
        let g = compute_tangent_and_binormal(compute_normal(g).unwrap()).unwrap();
        let n = vector(&g, names::NORMAL, 0);
        let t = vector(&g, names::TANGENT, 0);
        assert!(approx_eq(t.length(), 1.0));
        assert!(approx_eq(n.dot(t), 0.0));
    }

    #[test]
    fn test_missing_inputs() {
        assert_eq!(
            compute_tangent_and_binormal(uv_triangle()).unwrap_err(),
            GeometryError::MissingAttribute(names::NORMAL.to_string())
        );

        let mut g = compute_normal(uv_triangle()).unwrap();
        g.attributes.shift_remove(names::ST);
        assert_eq!(
            compute_tangent_and_binormal(g).unwrap_err(),
            GeometryError::MissingAttribute(names::ST.to_string())
        );
    }

    #[test]
    fn test_vertex_count_mismatch() {
        let g = compute_normal(uv_triangle())
            .unwrap()
            .with_attribute(names::ST, Attribute::float2(vec![0.0; 4]));
        assert_eq!(
            compute_tangent_and_binormal(g).unwrap_err(),
            GeometryError::VertexCountMismatch {
                name: names::ST.to_string(),
                expected: 3,
                actual: 2,
            }
        );
    }

    #[test]
    fn test_noop_without_indices() {
        let mut g = compute_normal(uv_triangle()).unwrap();
        g.indices = None;
        let out = compute_tangent_and_binormal(g.clone()).unwrap();
        assert_eq!(out, g);
        assert!(out.attribute(names::TANGENT).is_none());
    }
}
