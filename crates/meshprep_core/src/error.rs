//! Geometry error types
//!
//! Every error here is a precondition violation: the caller handed a filter
//! geometry it cannot process. Filters report these synchronously and never
//! return partial results.

use std::fmt;

use crate::attribute::ComponentDatatype;
use crate::geometry::PrimitiveType;

/// Error type for geometry filters
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// A required attribute is not present
    MissingAttribute(String),
    /// An attribute has the wrong number of components per vertex
    ComponentMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// An attribute's value count is not a multiple of its component count
    InvalidValueLength {
        name: String,
        length: usize,
        components: usize,
    },
    /// An attribute describes a different number of vertices than its siblings
    VertexCountMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },
    /// An index references a vertex at or beyond the vertex count
    IndexOutOfRange { index: u32, vertex_count: usize },
    /// The filter does not accept this topology
    UnsupportedPrimitiveType {
        expected: &'static str,
        actual: PrimitiveType,
    },
    /// The model matrix cannot be inverted to transform directions
    SingularModelMatrix,
    /// A merge input has a different model matrix than the first instance
    MismatchedModelMatrix { instance: usize },
    /// A merge input has a different primitive type than the first instance
    MismatchedPrimitiveType { instance: usize },
    /// Merge inputs disagree on whether they are indexed
    MismatchedIndices { instance: usize },
    /// Merge was given no instances
    EmptyInstanceList,
    /// An attribute that must be floating point is not
    NotFloatingPoint {
        name: String,
        datatype: ComponentDatatype,
    },
    /// An index list does not hold whole primitives
    InvalidIndexCount { count: usize, per_primitive: usize },
    /// Vertex cache size too small to simulate
    InvalidCacheSize(usize),
    /// A position could not be converted to geodetic coordinates
    ProjectionFailed([f64; 3]),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometryError::MissingAttribute(name) => {
                write!(f, "Geometry has no '{}' attribute", name)
            }
            GeometryError::ComponentMismatch { name, expected, actual } => write!(
                f,
                "Attribute '{}' must have {} components per vertex, found {}",
                name, expected, actual
            ),
            GeometryError::InvalidValueLength { name, length, components } => write!(
                f,
                "Attribute '{}' has {} values, not a multiple of {}",
                name, length, components
            ),
            GeometryError::VertexCountMismatch { name, expected, actual } => write!(
                f,
                "Attribute '{}' has {} vertices, expected {}",
                name, actual, expected
            ),
            GeometryError::IndexOutOfRange { index, vertex_count } => write!(
                f,
                "Index {} is out of range for {} vertices",
                index, vertex_count
            ),
            GeometryError::UnsupportedPrimitiveType { expected, actual } => write!(
                f,
                "Primitive type must be {}, found {:?}",
                expected, actual
            ),
            GeometryError::SingularModelMatrix => {
                write!(f, "Model matrix is singular; directions cannot be transformed")
            }
            GeometryError::MismatchedModelMatrix { instance } => write!(
                f,
                "Instance {} has a different model matrix; all instances must share one",
                instance
            ),
            GeometryError::MismatchedPrimitiveType { instance } => write!(
                f,
                "Instance {} has a different primitive type; all instances must share one",
                instance
            ),
            GeometryError::MismatchedIndices { instance } => write!(
                f,
                "Instance {} disagrees on indices; all instances must have indices or none",
                instance
            ),
            GeometryError::EmptyInstanceList => write!(f, "No instances to combine"),
            GeometryError::NotFloatingPoint { name, datatype } => write!(
                f,
                "Attribute '{}' must be floating point, found {:?}",
                name, datatype
            ),
            GeometryError::InvalidIndexCount { count, per_primitive } => write!(
                f,
                "Index count {} is not a multiple of {}",
                count, per_primitive
            ),
            GeometryError::InvalidCacheSize(size) => {
                write!(f, "Vertex cache size must be at least 3, found {}", size)
            }
            GeometryError::ProjectionFailed(p) => write!(
                f,
                "Could not project point ({}, {}, {}) to 2D",
                p[0], p[1], p[2]
            ),
        }
    }
}

impl std::error::Error for GeometryError {}
