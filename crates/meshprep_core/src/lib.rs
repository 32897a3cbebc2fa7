//! Core types for mesh preparation
//!
//! This crate provides the in-memory geometry contract every filter
//! consumes and produces:
//!
//! - [`ComponentDatatype`] - Numeric type of an attribute's components
//! - [`Attribute`] - One named per-vertex data channel
//! - [`PrimitiveType`] - How indices assemble into primitives
//! - [`Indices`] - 16- or 32-bit index buffer
//! - [`Geometry`] - Parallel attribute arrays plus indices and bounds
//! - [`GeometryInstance`] - A geometry with its model matrix
//! - [`GeometryError`] - Precondition violations reported by filters

mod attribute;
mod error;
mod geometry;
mod io;

pub use attribute::{names, Attribute, AttributeMap, ComponentDatatype};
pub use error::GeometryError;
pub use geometry::{Geometry, GeometryInstance, Indices, IndicesIter, PrimitiveType};
pub use io::{GeometryLoadError, GeometrySaveError};

// Re-export commonly used types from meshprep_math for convenience
pub use meshprep_math::{BoundingSphere, Mat3, Mat4, Vec3};
