//! Vertex and index reordering for GPU vertex caches

use meshprep_core::{Geometry, GeometryError, Indices, PrimitiveType};

use crate::vertex_cache::{calculate_acmr, Tipsify, VertexCacheOptimizer, DEFAULT_CACHE_SIZE};

/// Renumber vertices in the order the index stream first uses them, so that
/// vertices fetched close together in time sit close together in memory.
///
/// Every attribute is permuted to match; vertices no index references are
/// dropped. A geometry without indices is returned unchanged.
///
/// # Errors
/// [`GeometryError::IndexOutOfRange`] if an index references a vertex that
/// does not exist, or any attribute-consistency error from
/// [`Geometry::vertex_count`].
pub fn reorder_for_pre_vertex_cache(mut geometry: Geometry) -> Result<Geometry, GeometryError> {
    let vertex_count = geometry.vertex_count()?;
    let Some(indices) = geometry.indices.as_ref() else {
        return Ok(geometry);
    };

    let mut old_to_new: Vec<Option<u32>> = vec![None; vertex_count];
    let mut next = 0u32;
    let mut new_indices = Vec::with_capacity(indices.len());

    for old in indices.iter() {
        let slot = old_to_new
            .get_mut(old as usize)
            .ok_or(GeometryError::IndexOutOfRange { index: old, vertex_count })?;
        let new = *slot.get_or_insert_with(|| {
            let assigned = next;
            next += 1;
            assigned
        });
        new_indices.push(new);
    }

    let referenced = next as usize;
    for attribute in geometry.attributes.values_mut() {
        let n = attribute.components_per_attribute;
        let mut values = vec![0.0; referenced * n];
        for (old, new) in old_to_new.iter().enumerate() {
            if let Some(new) = *new {
                let new = new as usize;
                values[new * n..(new + 1) * n].copy_from_slice(attribute.vertex(old));
            }
        }
        attribute.values = values;
    }

    if referenced < vertex_count {
        log::debug!("Pre-transform reorder dropped {} unreferenced vertices", vertex_count - referenced);
    }

    geometry.indices = Some(Indices::for_vertex_count(referenced, new_indices));
    Ok(geometry)
}

/// Reorder triangles for the post-transform vertex cache using [`Tipsify`].
///
/// `cache_size` defaults to [`DEFAULT_CACHE_SIZE`]. Only the index order
/// changes; vertex attributes are untouched. Geometries without indices or
/// with a topology other than TRIANGLES are returned unchanged.
pub fn reorder_for_post_vertex_cache(geometry: Geometry, cache_size: Option<usize>) -> Result<Geometry, GeometryError> {
    reorder_for_post_vertex_cache_with(geometry, cache_size, &Tipsify)
}

/// [`reorder_for_post_vertex_cache`] with a caller-supplied optimizer
pub fn reorder_for_post_vertex_cache_with<O>(
    mut geometry: Geometry,
    cache_size: Option<usize>,
    optimizer: &O,
) -> Result<Geometry, GeometryError>
where
    O: VertexCacheOptimizer + ?Sized,
{
    if geometry.primitive_type != PrimitiveType::Triangles {
        return Ok(geometry);
    }
    let Some(indices) = geometry.indices.as_ref() else {
        return Ok(geometry);
    };

    let list = indices.to_u32_vec();
    let maximum_index = list.iter().copied().max().unwrap_or(0);
    let cache_size = cache_size.unwrap_or(DEFAULT_CACHE_SIZE);
    let reordered = optimizer.optimize(&list, maximum_index, cache_size)?;
    if log::log_enabled!(log::Level::Debug) {
        log::debug!(
            "Vertex cache ACMR {:.3} -> {:.3} (cache size {})",
            calculate_acmr(&list, cache_size)?,
            calculate_acmr(&reordered, cache_size)?,
            cache_size
        );
    }
    let reordered = indices.with_width_of(reordered);

    geometry.indices = Some(reordered);
    Ok(geometry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{grid, triangle_positions};
    use meshprep_core::{names, Attribute};

    #[test]
    fn test_pre_reorder_first_use_order() {
        let g = Geometry::new(PrimitiveType::Triangles)
            .with_attribute(names::POSITION, Attribute::double3(vec![
                0.0, 0.0, 0.0, //
                1.0, 0.0, 0.0, //
                2.0, 0.0, 0.0, //
                3.0, 0.0, 0.0,
            ]))
            .with_attribute(names::ST, Attribute::float2(vec![0.0, 0.0, 0.1, 0.1, 0.2, 0.2, 0.3, 0.3]))
            .with_indices(vec![3u16, 1, 2, 2, 1, 0]);

        let g = reorder_for_pre_vertex_cache(g).unwrap();
        assert_eq!(g.indices.as_ref().unwrap().to_u32_vec(), vec![0, 1, 2, 2, 1, 3]);
        assert_eq!(
            g.attributes[names::POSITION].values,
            vec![3.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 0.0, 0.0]
        );
        assert_eq!(g.attributes[names::ST].values, vec![0.3, 0.3, 0.1, 0.1, 0.2, 0.2, 0.0, 0.0]);
    }

    #[test]
    fn test_pre_reorder_preserves_triangles() {
        let mut g = grid(6, 4);
        // Scramble index order so the renumbering actually moves vertices
        let mut indices = g.indices.as_ref().unwrap().to_u32_vec();
        indices.reverse();
        g.indices = Some(Indices::U32(indices));

        let before = triangle_positions(&g);
        let after = reorder_for_pre_vertex_cache(g).unwrap();
        assert_eq!(triangle_positions(&after), before);
        assert!(after.validate().is_ok());
    }

    #[test]
    fn test_pre_reorder_drops_unreferenced() {
        let g = Geometry::new(PrimitiveType::Triangles)
            .with_attribute(names::POSITION, Attribute::double3(vec![0.0; 15]))
            .with_indices(vec![4u16, 2, 0]);
        let g = reorder_for_pre_vertex_cache(g).unwrap();
        assert_eq!(g.vertex_count().unwrap(), 3);
    }

    #[test]
    fn test_pre_reorder_out_of_range() {
        let g = Geometry::new(PrimitiveType::Triangles)
            .with_attribute(names::POSITION, Attribute::double3(vec![0.0; 9]))
            .with_indices(vec![0u16, 1, 3]);
        assert_eq!(
            reorder_for_pre_vertex_cache(g).unwrap_err(),
            GeometryError::IndexOutOfRange { index: 3, vertex_count: 3 }
        );
    }

    #[test]
    fn test_pre_reorder_without_indices() {
        let g = Geometry::new(PrimitiveType::Triangles)
            .with_attribute(names::POSITION, Attribute::double3(vec![1.0, 2.0, 3.0]));
        assert_eq!(reorder_for_pre_vertex_cache(g.clone()).unwrap(), g);
    }

    #[test]
    fn test_post_reorder_keeps_vertices_and_width() {
        let g = grid(20, 20);
        let positions = g.attributes[names::POSITION].clone();
        let before = triangle_positions(&g);

        let out = reorder_for_post_vertex_cache(g, None).unwrap();
        assert_eq!(out.attributes[names::POSITION], positions);
        assert!(matches!(out.indices, Some(Indices::U16(_))));
        assert_eq!(triangle_positions(&out), before);

        let acmr = calculate_acmr(&out.indices.unwrap().to_u32_vec(), DEFAULT_CACHE_SIZE).unwrap();
        assert!(acmr < 1.0);
    }

    #[test]
    fn test_post_reorder_skips_non_triangles() {
        let g = Geometry::new(PrimitiveType::Lines)
            .with_attribute(names::POSITION, Attribute::double3(vec![0.0; 6]))
            .with_indices(vec![1u16, 0]);
        assert_eq!(reorder_for_post_vertex_cache(g.clone(), Some(8)).unwrap(), g);
    }

    struct Reverse;

    impl VertexCacheOptimizer for Reverse {
        fn optimize(&self, indices: &[u32], _maximum_index: u32, _cache_size: usize) -> Result<Vec<u32>, GeometryError> {
            Ok(indices.chunks_exact(3).rev().flatten().copied().collect())
        }
    }

    #[test]
    fn test_post_reorder_custom_optimizer() {
        let g = Geometry::new(PrimitiveType::Triangles)
            .with_attribute(names::POSITION, Attribute::double3(vec![0.0; 12]))
            .with_indices(vec![0u32, 1, 2, 1, 3, 2]);
        let out = reorder_for_post_vertex_cache_with(g, None, &Reverse).unwrap();
        assert_eq!(out.indices.unwrap(), Indices::U32(vec![1, 3, 2, 0, 1, 2]));
    }
}
