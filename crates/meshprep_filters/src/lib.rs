//! Mesh preparation filters
//!
//! Each filter performs one transformation on a [`Geometry`] (or a list of
//! [`GeometryInstance`]s) and returns the result. Filters take their input
//! by value: the returned geometry may be the same one mutated or a freshly
//! built replacement, so always continue with the return value.
//!
//! Composition is up to the caller. A typical order for GPU upload is
//! world transform, combine, normal/tangent synthesis, pre-transform then
//! post-transform cache reordering, index-width partitioning and finally
//! attribute encoding.
//!
//! ## Filters
//!
//! - [`to_wireframe`] - Triangle topologies to a line list
//! - [`create_attribute_locations`] / [`remap_attribute_locations`] - Attribute slots
//! - [`reorder_for_pre_vertex_cache`] - First-use vertex renumbering
//! - [`reorder_for_post_vertex_cache`] - Triangle reordering for the vertex cache
//! - [`fit_to_unsigned_short_indices`] - Split for 16-bit indices
//! - [`transform_to_world_coordinates`] - Bake the model matrix
//! - [`combine_instances`] - Merge instances sharing a model matrix
//! - [`compute_normal`] - Smooth per-vertex normals
//! - [`compute_tangent_and_binormal`] - Tangent space basis
//! - [`encode_attribute`] - High/low split for extended precision
//! - [`project_to_2d`] - Geodetic projection to a 2D map
//! - [`create_line_segments_for_vectors`] - Visualize per-vertex vectors

mod wireframe;
mod locations;
pub mod vertex_cache;
mod reorder;
mod partition;
mod world;
mod combine;
mod normals;
mod tangents;
mod encode;
mod project;
mod debug_vectors;

pub use wireframe::to_wireframe;
pub use locations::{create_attribute_locations, remap_attribute_locations};
pub use vertex_cache::{calculate_acmr, Tipsify, VertexCacheOptimizer, DEFAULT_CACHE_SIZE};
pub use reorder::{reorder_for_post_vertex_cache, reorder_for_post_vertex_cache_with, reorder_for_pre_vertex_cache};
pub use partition::fit_to_unsigned_short_indices;
pub use world::transform_to_world_coordinates;
pub use combine::combine_instances;
pub use normals::compute_normal;
pub use tangents::compute_tangent_and_binormal;
pub use encode::{encode_attribute, encode_attribute_with_names};
pub use project::{project_to_2d, project_to_2d_with};
pub use debug_vectors::create_line_segments_for_vectors;

pub use meshprep_core::{Geometry, GeometryError, GeometryInstance};

use meshprep_core::PrimitiveType;

/// Triangle-list indices for normal/tangent synthesis, or `None` when the
/// geometry is not an indexed triangle list with whole triangles
pub(crate) fn synthesis_triangles(geometry: &Geometry) -> Option<Vec<u32>> {
    let indices = geometry.indices.as_ref()?;
    if geometry.primitive_type != PrimitiveType::Triangles || indices.len() < 2 || indices.len() % 3 != 0 {
        return None;
    }
    Some(indices.to_u32_vec())
}

/// Fail on the first index at or beyond `vertex_count`
pub(crate) fn check_index_range(indices: &[u32], vertex_count: usize) -> Result<(), GeometryError> {
    match indices.iter().find(|&&i| i as usize >= vertex_count) {
        Some(&index) => Err(GeometryError::IndexOutOfRange { index, vertex_count }),
        None => Ok(()),
    }
}
