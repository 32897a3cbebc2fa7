//! Geometry and geometry instances
//!
//! A [`Geometry`] is a set of parallel per-vertex attribute buffers, an
//! optional index buffer, a topology tag and an optional bounding sphere.
//! Filters take a geometry by value and hand back the processed result.

use serde::{Serialize, Deserialize};

use meshprep_math::{mat4, BoundingSphere, Mat4, Vec3};

use crate::attribute::{names, Attribute, AttributeMap};
use crate::error::GeometryError;

/// How vertices are assembled into primitives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrimitiveType {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveType {
    /// Whether this topology produces triangles
    pub fn is_triangles(&self) -> bool {
        matches!(self, Self::Triangles | Self::TriangleStrip | Self::TriangleFan)
    }
}

/// Index buffer, 16 or 32 bits per index
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Indices {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl Indices {
    /// Vertex count at which 16-bit indices no longer suffice
    pub const SIXTY_FOUR_KILOBYTES: usize = 65536;

    /// Build an index buffer using the narrowest width that can address
    /// `vertex_count` vertices
    ///
    /// Values that do not fit 16 bits force a 32-bit buffer, so no index is
    /// ever truncated.
    pub fn for_vertex_count(vertex_count: usize, indices: Vec<u32>) -> Self {
        if vertex_count < Self::SIXTY_FOUR_KILOBYTES {
            Self::narrow_or_wide(indices)
        } else {
            Indices::U32(indices)
        }
    }

    /// Build an index buffer of the same width as `self` from new values
    ///
    /// A 16-bit buffer is widened to 32 bits if a new value does not fit.
    pub fn with_width_of(&self, indices: Vec<u32>) -> Self {
        match self {
            Indices::U16(_) => Self::narrow_or_wide(indices),
            Indices::U32(_) => Indices::U32(indices),
        }
    }

    fn narrow_or_wide(indices: Vec<u32>) -> Self {
        match indices.iter().map(|&i| u16::try_from(i)).collect::<Result<Vec<u16>, _>>() {
            Ok(narrow) => Indices::U16(narrow),
            Err(_) => Indices::U32(indices),
        }
    }

    /// Number of indices
    pub fn len(&self) -> usize {
        match self {
            Indices::U16(v) => v.len(),
            Indices::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index at position `i`
    #[inline]
    pub fn get(&self, i: usize) -> u32 {
        match self {
            Indices::U16(v) => v[i] as u32,
            Indices::U32(v) => v[i],
        }
    }

    /// Iterate indices widened to `u32`
    pub fn iter(&self) -> IndicesIter<'_> {
        match self {
            Indices::U16(v) => IndicesIter::U16(v.iter()),
            Indices::U32(v) => IndicesIter::U32(v.iter()),
        }
    }

    /// Copy indices into a `u32` vector
    pub fn to_u32_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }

    /// Largest index, or `None` when empty
    pub fn max(&self) -> Option<u32> {
        self.iter().max()
    }

    /// Bytes per index
    pub fn index_size(&self) -> usize {
        match self {
            Indices::U16(_) => 2,
            Indices::U32(_) => 4,
        }
    }

    /// Raw bytes for upload to an index buffer
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Indices::U16(v) => bytemuck::cast_slice(v),
            Indices::U32(v) => bytemuck::cast_slice(v),
        }
    }
}

impl From<Vec<u32>> for Indices {
    fn from(v: Vec<u32>) -> Self {
        Indices::U32(v)
    }
}

impl From<Vec<u16>> for Indices {
    fn from(v: Vec<u16>) -> Self {
        Indices::U16(v)
    }
}

/// Iterator over [`Indices`] yielding `u32`
pub enum IndicesIter<'a> {
    U16(std::slice::Iter<'a, u16>),
    U32(std::slice::Iter<'a, u32>),
}

impl Iterator for IndicesIter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            IndicesIter::U16(it) => it.next().map(|&i| i as u32),
            IndicesIter::U32(it) => it.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            IndicesIter::U16(it) => it.size_hint(),
            IndicesIter::U32(it) => it.size_hint(),
        }
    }
}

impl ExactSizeIterator for IndicesIter<'_> {}

/// Parallel vertex attributes plus topology
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Named per-vertex attributes, all with the same vertex count
    #[serde(default)]
    pub attributes: AttributeMap,
    /// Optional index buffer; every index is below the vertex count
    #[serde(default)]
    pub indices: Option<Indices>,
    /// How vertices (or indices) form primitives
    #[serde(default)]
    pub primitive_type: PrimitiveType,
    /// Optional bounding volume
    #[serde(default)]
    pub bounding_sphere: Option<BoundingSphere>,
}

impl Geometry {
    /// Create an empty geometry with the given topology
    pub fn new(primitive_type: PrimitiveType) -> Self {
        Self {
            attributes: AttributeMap::new(),
            indices: None,
            primitive_type,
            bounding_sphere: None,
        }
    }

    /// Add (or replace) an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, attribute: Attribute) -> Self {
        self.attributes.insert(name.into(), attribute);
        self
    }

    /// Set the index buffer
    pub fn with_indices(mut self, indices: impl Into<Indices>) -> Self {
        self.indices = Some(indices.into());
        self
    }

    /// Set the bounding sphere
    pub fn with_bounding_sphere(mut self, sphere: BoundingSphere) -> Self {
        self.bounding_sphere = Some(sphere);
        self
    }

    /// Look up an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    /// Look up an attribute that must be present
    pub fn require_attribute(&self, name: &str) -> Result<&Attribute, GeometryError> {
        self.attributes
            .get(name)
            .ok_or_else(|| GeometryError::MissingAttribute(name.to_string()))
    }

    /// Number of indices, or 0 when not indexed
    pub fn index_count(&self) -> usize {
        self.indices.as_ref().map_or(0, Indices::len)
    }

    /// Number of vertices shared by all attributes
    ///
    /// Fails if any attribute holds partial vertices or disagrees with the
    /// first attribute's count. A geometry without attributes has 0 vertices.
    pub fn vertex_count(&self) -> Result<usize, GeometryError> {
        let mut count = None;
        for (name, attribute) in &self.attributes {
            attribute.validate(name)?;
            let n = attribute.vertex_count();
            match count {
                None => count = Some(n),
                Some(expected) if expected != n => {
                    return Err(GeometryError::VertexCountMismatch {
                        name: name.clone(),
                        expected,
                        actual: n,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(count.unwrap_or(0))
    }

    /// Check every structural invariant and return the vertex count
    pub fn validate(&self) -> Result<usize, GeometryError> {
        let vertex_count = self.vertex_count()?;
        if let Some(indices) = &self.indices {
            if let Some(index) = indices.iter().find(|&i| i as usize >= vertex_count) {
                return Err(GeometryError::IndexOutOfRange { index, vertex_count });
            }
        }
        Ok(vertex_count)
    }

    /// Sphere around the `position` attribute, if there is one
    pub fn compute_bounding_sphere(&self) -> Option<BoundingSphere> {
        let positions = self.attributes.get(names::POSITION)?;
        if positions.components_per_attribute != 3 {
            return None;
        }
        BoundingSphere::from_points(
            positions
                .values
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        )
    }
}

fn identity_matrix() -> Mat4 {
    mat4::IDENTITY
}

/// A geometry placed in the world by a model matrix
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryInstance {
    /// The instanced geometry
    pub geometry: Geometry,
    /// Local-to-world transform (column-major)
    #[serde(default = "identity_matrix")]
    pub model_matrix: Mat4,
}

impl GeometryInstance {
    /// Create an instance with the identity model matrix
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            model_matrix: mat4::IDENTITY,
        }
    }

    /// Set the model matrix
    pub fn with_model_matrix(mut self, model_matrix: Mat4) -> Self {
        self.model_matrix = model_matrix;
        self
    }
}

impl From<Geometry> for GeometryInstance {
    fn from(geometry: Geometry) -> Self {
        Self::new(geometry)
    }
}
