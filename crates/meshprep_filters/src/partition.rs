//! Index-width partitioning
//!
//! Splits meshes too large for 16-bit indices into self-contained chunks.

use meshprep_core::{AttributeMap, BoundingSphere, Geometry, GeometryError, Indices, PrimitiveType};

/// Vertex count at which a mesh no longer fits 16-bit indices
const SIXTY_FOUR_KILOBYTES: usize = Indices::SIXTY_FOUR_KILOBYTES;

/// Output chunk under construction
struct Chunk {
    attributes: AttributeMap,
    indices: Vec<u32>,
    vertex_count: usize,
}

impl Chunk {
    fn new(source: &AttributeMap, vertex_capacity: usize) -> Self {
        Self {
            attributes: source
                .iter()
                .map(|(name, attribute)| (name.clone(), attribute.empty_like(vertex_capacity)))
                .collect(),
            indices: Vec::new(),
            vertex_count: 0,
        }
    }

    fn copy_vertex(&mut self, source: &AttributeMap, index: usize) -> u32 {
        for (target, (_, attribute)) in self.attributes.values_mut().zip(source.iter()) {
            target.push_vertex_from(attribute, index);
        }
        let assigned = self.vertex_count as u32;
        self.vertex_count += 1;
        assigned
    }

    fn seal(self, bounding_sphere: Option<BoundingSphere>) -> Geometry {
        Geometry {
            attributes: self.attributes,
            indices: Some(Indices::U16(self.indices.into_iter().map(|i| i as u16).collect())),
            primitive_type: PrimitiveType::Triangles,
            bounding_sphere,
        }
    }
}

/// Split a triangle mesh so every piece can use 16-bit indices.
///
/// Geometries with fewer than 65536 vertices, or without indices, are
/// returned as the only element. Larger meshes are walked one triangle at a
/// time; each chunk receives compacted copies of the vertices its triangles
/// use, and is sealed before it would need index 65535 or beyond, so no
/// triangle is split across chunks. Every chunk keeps the source bounding
/// sphere.
///
/// # Errors
/// [`GeometryError::UnsupportedPrimitiveType`] if an indexed geometry is not
/// TRIANGLES, [`GeometryError::InvalidIndexCount`] for partial triangles, and
/// [`GeometryError::IndexOutOfRange`] for dangling indices.
pub fn fit_to_unsigned_short_indices(geometry: Geometry) -> Result<Vec<Geometry>, GeometryError> {
    if geometry.indices.is_some() && geometry.primitive_type != PrimitiveType::Triangles {
        return Err(GeometryError::UnsupportedPrimitiveType {
            expected: "TRIANGLES",
            actual: geometry.primitive_type,
        });
    }

    let vertex_count = geometry.vertex_count()?;
    let indices = match geometry.indices.as_ref() {
        Some(indices) if vertex_count >= SIXTY_FOUR_KILOBYTES => indices.to_u32_vec(),
        _ => return Ok(vec![geometry]),
    };
    if indices.len() % 3 != 0 {
        return Err(GeometryError::InvalidIndexCount {
            count: indices.len(),
            per_primitive: 3,
        });
    }

    // (chunk number, new index) of each source vertex; entries from earlier
    // chunks are stale and count as unmapped
    let mut remap: Vec<Option<(usize, u32)>> = vec![None; vertex_count];
    let capacity = vertex_count.min(SIXTY_FOUR_KILOBYTES);
    let mut chunks = Vec::new();
    let mut chunk = Chunk::new(&geometry.attributes, capacity);

    for triangle in indices.chunks_exact(3) {
        let chunk_number = chunks.len();
        for &old in triangle {
            let slot = remap
                .get_mut(old as usize)
                .ok_or(GeometryError::IndexOutOfRange { index: old, vertex_count })?;
            let new = match *slot {
                Some((number, new)) if number == chunk_number => new,
                _ => {
                    let new = chunk.copy_vertex(&geometry.attributes, old as usize);
                    *slot = Some((chunk_number, new));
                    new
                }
            };
            chunk.indices.push(new);
        }

        if chunk.vertex_count + 3 >= SIXTY_FOUR_KILOBYTES {
            let full = std::mem::replace(&mut chunk, Chunk::new(&geometry.attributes, capacity));
            chunks.push(full.seal(geometry.bounding_sphere));
        }
    }

    if !chunk.indices.is_empty() {
        chunks.push(chunk.seal(geometry.bounding_sphere));
    }

    log::debug!(
        "Split geometry with {} vertices and {} indices into {} chunks",
        vertex_count,
        indices.len(),
        chunks.len()
    );

    Ok(chunks)
}
