//! Mathematics Library for mesh preparation
//!
//! This crate provides the vector, matrix and bounding-volume types the
//! geometry filters are built on, plus the ellipsoid and map projection
//! math used when flattening geometry to 2D.
//!
//! ## Core Types
//!
//! - [`Vec3`] - 3D vector with x, y, z components (double precision)
//! - [`Mat4`] - 4x4 column-major transform
//! - [`Mat3`] - 3x3 column-major matrix (rotation / normal matrix)
//!
//! ## Spatial Types
//!
//! - [`BoundingSphere`] - Sphere enclosing a set of points
//! - [`Ellipsoid`] - Reference ellipsoid for geodetic conversion
//! - [`Cartographic`] - Longitude, latitude and height
//! - [`MapProjection`] - Trait for 2D map projections

mod vec3;
pub mod mat4;
pub mod bounding_sphere;
pub mod ellipsoid;
pub mod projection;
pub mod encode;

pub use vec3::Vec3;
pub use mat4::{Mat3, Mat4};
pub use bounding_sphere::BoundingSphere;
pub use ellipsoid::{Cartographic, Ellipsoid};
pub use projection::{GeographicProjection, MapProjection, WebMercatorProjection};
pub use encode::{encode_double, EncodedDouble};
