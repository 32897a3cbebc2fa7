//! Geometry serialization
//!
//! Geometries and instances are stored as RON files.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

use crate::geometry::{Geometry, GeometryInstance};

fn load_ron<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, GeometryLoadError> {
    let contents = fs::read_to_string(path)?;
    let value = ron::from_str(&contents)?;
    Ok(value)
}

fn save_ron<T: Serialize, P: AsRef<Path>>(value: &T, path: P) -> Result<(), GeometrySaveError> {
    let pretty = ron::ser::PrettyConfig::new()
        .struct_names(true)
        .enumerate_arrays(false);
    let contents = ron::ser::to_string_pretty(value, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}

impl Geometry {
    /// Load a geometry from a RON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeometryLoadError> {
        load_ron(path)
    }

    /// Save a geometry to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GeometrySaveError> {
        save_ron(self, path)
    }
}

impl GeometryInstance {
    /// Load an instance from a RON file
    ///
    /// A missing `model_matrix` defaults to the identity.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, GeometryLoadError> {
        let instance: Self = load_ron(path.as_ref())?;
        log::debug!(
            "Loaded instance from {} with {} attributes",
            path.as_ref().display(),
            instance.geometry.attributes.len()
        );
        Ok(instance)
    }

    /// Save an instance to a RON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), GeometrySaveError> {
        save_ron(self, path)
    }
}

/// Error loading a geometry
#[derive(Debug)]
pub enum GeometryLoadError {
    /// IO error (file not found, permission denied, etc.)
    Io(io::Error),
    /// Parse error (invalid RON syntax)
    Parse(ron::error::SpannedError),
}

impl From<io::Error> for GeometryLoadError {
    fn from(e: io::Error) -> Self {
        GeometryLoadError::Io(e)
    }
}

impl From<ron::error::SpannedError> for GeometryLoadError {
    fn from(e: ron::error::SpannedError) -> Self {
        GeometryLoadError::Parse(e)
    }
}

impl std::fmt::Display for GeometryLoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryLoadError::Io(e) => write!(f, "IO error: {}", e),
            GeometryLoadError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for GeometryLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeometryLoadError::Io(e) => Some(e),
            GeometryLoadError::Parse(e) => Some(e),
        }
    }
}

/// Error saving a geometry
#[derive(Debug)]
pub enum GeometrySaveError {
    /// IO error (permission denied, disk full, etc.)
    Io(io::Error),
    /// Serialization error
    Serialize(ron::Error),
}

impl From<io::Error> for GeometrySaveError {
    fn from(e: io::Error) -> Self {
        GeometrySaveError::Io(e)
    }
}

impl From<ron::Error> for GeometrySaveError {
    fn from(e: ron::Error) -> Self {
        GeometrySaveError::Serialize(e)
    }
}

impl std::fmt::Display for GeometrySaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometrySaveError::Io(e) => write!(f, "IO error: {}", e),
            GeometrySaveError::Serialize(e) => write!(f, "Serialize error: {}", e),
        }
    }
}

impl std::error::Error for GeometrySaveError {}
