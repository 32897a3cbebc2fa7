//! Post-transform vertex cache optimization
//!
//! [`VertexCacheOptimizer`] is the seam between the reorder filter and the
//! cache simulation. [`Tipsify`] implements the linear-time algorithm of
//! Sander, Nehab and Barczak ("Fast Triangle Reordering for Vertex Locality
//! and Reduced Overdraw", 2007).

use meshprep_core::GeometryError;

/// Typical depth of a GPU post-transform vertex cache
pub const DEFAULT_CACHE_SIZE: usize = 24;

/// Reorders a triangle list to improve vertex cache hit rate
pub trait VertexCacheOptimizer {
    /// Return a permutation of the triangles in `indices`.
    ///
    /// `maximum_index` is the largest value in `indices`; each triangle keeps
    /// its vertex order.
    fn optimize(&self, indices: &[u32], maximum_index: u32, cache_size: usize) -> Result<Vec<u32>, GeometryError>;
}

fn check_input(index_count: usize, cache_size: usize) -> Result<(), GeometryError> {
    if index_count % 3 != 0 {
        return Err(GeometryError::InvalidIndexCount {
            count: index_count,
            per_primitive: 3,
        });
    }
    if cache_size < 3 {
        return Err(GeometryError::InvalidCacheSize(cache_size));
    }
    Ok(())
}

/// Average cache miss ratio: cache misses per triangle when `indices` is
/// drawn through a FIFO cache of `cache_size` entries.
///
/// 0.5 is the practical optimum for large regular meshes, 3.0 the worst case.
pub fn calculate_acmr(indices: &[u32], cache_size: usize) -> Result<f64, GeometryError> {
    check_input(indices.len(), cache_size)?;
    let Some(&maximum) = indices.iter().max() else {
        return Ok(0.0);
    };

    let mut time_stamps = vec![0usize; maximum as usize + 1];
    let mut time = cache_size + 1;
    let mut misses = 0usize;
    for &index in indices {
        let stamp = &mut time_stamps[index as usize];
        if time - *stamp > cache_size {
            *stamp = time;
            time += 1;
            misses += 1;
        }
    }

    Ok(misses as f64 / (indices.len() / 3) as f64)
}

#[derive(Default)]
struct VertexState {
    live_triangles: usize,
    time_stamp: usize,
    triangles: Vec<usize>,
}

/// Tipsify triangle reordering
#[derive(Clone, Copy, Debug, Default)]
pub struct Tipsify;

impl Tipsify {
    /// Pop the dead-end stack until a vertex with live triangles turns up,
    /// then fall back to scanning forward from `cursor`
    fn skip_dead_end(vertices: &[VertexState], dead_end: &mut Vec<u32>, cursor: &mut usize) -> Option<usize> {
        while let Some(d) = dead_end.pop() {
            if vertices[d as usize].live_triangles > 0 {
                return Some(d as usize);
            }
        }
        while *cursor < vertices.len() {
            let candidate = *cursor;
            *cursor += 1;
            if vertices[candidate].live_triangles > 0 {
                return Some(candidate);
            }
        }
        None
    }

    /// Choose the next fanning vertex from the one-ring of the last fan,
    /// preferring vertices that will still be in the cache after their
    /// remaining triangles are emitted
    fn next_vertex(
        vertices: &[VertexState],
        one_ring: &[u32],
        time: usize,
        cache_size: usize,
        dead_end: &mut Vec<u32>,
        cursor: &mut usize,
    ) -> Option<usize> {
        let mut best: Option<usize> = None;
        let mut best_priority = 0usize;

        for &index in one_ring {
            let vertex = &vertices[index as usize];
            if vertex.live_triangles == 0 {
                continue;
            }
            let age = time - vertex.time_stamp;
            let priority = if age + 2 * vertex.live_triangles <= cache_size { age } else { 0 };
            if best.is_none() || priority > best_priority {
                best = Some(index as usize);
                best_priority = priority;
            }
        }

        best.or_else(|| Self::skip_dead_end(vertices, dead_end, cursor))
    }
}

impl VertexCacheOptimizer for Tipsify {
    fn optimize(&self, indices: &[u32], maximum_index: u32, cache_size: usize) -> Result<Vec<u32>, GeometryError> {
        check_input(indices.len(), cache_size)?;
        if indices.is_empty() {
            return Ok(Vec::new());
        }

        let vertex_limit = maximum_index as usize + 1;
        let mut vertices: Vec<VertexState> = (0..vertex_limit).map(|_| VertexState::default()).collect();
        for (t, triangle) in indices.chunks_exact(3).enumerate() {
            for &index in triangle {
                let vertex = vertices.get_mut(index as usize).ok_or(GeometryError::IndexOutOfRange {
                    index,
                    vertex_count: vertex_limit,
                })?;
                vertex.triangles.push(t);
                vertex.live_triangles += 1;
            }
        }

        let mut emitted = vec![false; indices.len() / 3];
        let mut output = Vec::with_capacity(indices.len());
        let mut one_ring: Vec<u32> = Vec::new();
        let mut dead_end: Vec<u32> = Vec::new();
        let mut time = cache_size + 1;
        let mut cursor = 1usize;
        let mut fanning = Some(0usize);

        while let Some(f) = fanning {
            one_ring.clear();
            for k in 0..vertices[f].triangles.len() {
                let t = vertices[f].triangles[k];
                if emitted[t] {
                    continue;
                }
                emitted[t] = true;
                for &index in &indices[3 * t..3 * t + 3] {
                    one_ring.push(index);
                    dead_end.push(index);
                    output.push(index);

                    let vertex = &mut vertices[index as usize];
                    vertex.live_triangles -= 1;
                    if time - vertex.time_stamp > cache_size {
                        vertex.time_stamp = time;
                        time += 1;
                    }
                }
            }
            fanning = Self::next_vertex(&vertices, &one_ring, time, cache_size, &mut dead_end, &mut cursor);
        }

        Ok(output)
    }
}
