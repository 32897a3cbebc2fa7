//! meshprep - Mesh preparation for GPU upload
//!
//! Loads geometry instances, runs the filters from [`meshprep_filters`] in
//! upload order and writes the prepared chunks back out.
//!
//! - [`config`] - Layered TOML/environment configuration
//! - [`prepare`] - The filter driver plus RON input and output

pub mod config;
pub mod prepare;

pub use config::{ConfigError, PipelineConfig};
pub use prepare::{load_instances, prepare, write_prepared, PrepareError, PreparedMesh};
