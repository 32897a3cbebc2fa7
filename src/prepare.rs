//! Preparing loaded instances for upload
//!
//! [`prepare`] runs the filters in upload order, each step switched by
//! [`PipelineConfig`]:
//!
//! 1. Bake every model matrix and merge all instances into one mesh
//! 2. Synthesize normals, then tangents
//! 3. Reorder vertices, then triangles, for the vertex caches
//! 4. Split for 16-bit indices
//! 5. Wireframe, 2D projection and high/low position encoding per chunk

use std::fmt;
use std::path::{Path, PathBuf};

use meshprep_core::{names, Geometry, GeometryError, GeometryInstance, GeometryLoadError, GeometrySaveError};
use meshprep_filters::{
    combine_instances, compute_normal, compute_tangent_and_binormal, create_line_segments_for_vectors,
    encode_attribute, fit_to_unsigned_short_indices, project_to_2d, reorder_for_post_vertex_cache,
    reorder_for_pre_vertex_cache, to_wireframe, transform_to_world_coordinates,
};

use crate::config::PipelineConfig;

/// Position attributes split for extended precision when encoding is on
const ENCODED_POSITIONS: [&str; 3] = [names::POSITION, names::POSITION_3D, names::POSITION_2D];

/// Result of [`prepare`]
#[derive(Debug, Clone, Default)]
pub struct PreparedMesh {
    /// Upload-ready chunks
    pub chunks: Vec<Geometry>,
    /// Normal visualization lines, when requested and normals exist
    pub normal_lines: Option<Geometry>,
}

/// Run the configured filters over `instances`
pub fn prepare(instances: Vec<GeometryInstance>, config: &PipelineConfig) -> Result<PreparedMesh, PrepareError> {
    let instance_count = instances.len();
    let instances = instances
        .into_iter()
        .map(transform_to_world_coordinates)
        .collect::<Result<Vec<_>, _>>()?;
    let mut geometry = combine_instances(instances)?;
    log::info!(
        "Merged {} instances into {} vertices",
        instance_count,
        geometry.vertex_count()?
    );

    if config.synthesis.normals {
        geometry = compute_normal(geometry)?;
    }
    if config.synthesis.tangents {
        geometry = compute_tangent_and_binormal(geometry)?;
    }

    let normal_lines = if config.debug.vector_length > 0.0 && geometry.attribute(names::NORMAL).is_some() {
        Some(create_line_segments_for_vectors(&geometry, names::NORMAL, config.debug.vector_length)?)
    } else {
        None
    };

    if config.cache.pre_transform {
        geometry = reorder_for_pre_vertex_cache(geometry)?;
    }
    if config.cache.post_transform {
        geometry = reorder_for_post_vertex_cache(geometry, Some(config.cache.size))?;
    }

    let chunks = if config.output.partition {
        fit_to_unsigned_short_indices(geometry)?
    } else {
        vec![geometry]
    };

    let chunks = chunks
        .into_iter()
        .map(|chunk| finish_chunk(chunk, config))
        .collect::<Result<Vec<_>, _>>()?;
    log::info!("Prepared {} chunks", chunks.len());

    Ok(PreparedMesh { chunks, normal_lines })
}

fn finish_chunk(mut chunk: Geometry, config: &PipelineConfig) -> Result<Geometry, GeometryError> {
    if config.output.wireframe {
        chunk = to_wireframe(chunk)?;
    }
    if config.output.project_to_2d {
        chunk = project_to_2d(chunk)?;
    }
    if config.output.encode_positions {
        for name in ENCODED_POSITIONS {
            if chunk.attribute(name).is_some() {
                chunk = encode_attribute(chunk, name)?;
            }
        }
    }
    Ok(chunk)
}

/// Load geometry instances from RON files
pub fn load_instances<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<GeometryInstance>, PrepareError> {
    paths
        .iter()
        .map(|path| {
            GeometryInstance::load(path).map_err(|source| PrepareError::Load {
                path: path.as_ref().to_path_buf(),
                source,
            })
        })
        .collect()
}

/// Write every chunk (and normal lines, if any) to `directory` as RON.
///
/// Chunks are named `chunk_<n>.ron`; normal lines go to `normals.ron`.
/// Returns the written paths.
pub fn write_prepared<P: AsRef<Path>>(prepared: &PreparedMesh, directory: P) -> Result<Vec<PathBuf>, PrepareError> {
    let directory = directory.as_ref();
    std::fs::create_dir_all(directory).map_err(|e| PrepareError::Save {
        path: directory.to_path_buf(),
        source: GeometrySaveError::Io(e),
    })?;

    let mut written = Vec::with_capacity(prepared.chunks.len() + 1);
    let named = prepared
        .chunks
        .iter()
        .enumerate()
        .map(|(i, chunk)| (format!("chunk_{}.ron", i), chunk))
        .chain(prepared.normal_lines.iter().map(|lines| ("normals.ron".to_string(), lines)));

    for (file_name, geometry) in named {
        let path = directory.join(file_name);
        geometry.save(&path).map_err(|source| PrepareError::Save {
            path: path.clone(),
            source,
        })?;
        log::debug!("Wrote {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Error preparing geometry
#[derive(Debug)]
pub enum PrepareError {
    /// A filter rejected its input
    Geometry(GeometryError),
    /// An input file could not be loaded
    Load {
        path: PathBuf,
        source: GeometryLoadError,
    },
    /// An output file could not be written
    Save {
        path: PathBuf,
        source: GeometrySaveError,
    },
}

impl fmt::Display for PrepareError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrepareError::Geometry(e) => write!(f, "Geometry error: {}", e),
            PrepareError::Load { path, source } => write!(f, "Failed to load {}: {}", path.display(), source),
            PrepareError::Save { path, source } => write!(f, "Failed to save {}: {}", path.display(), source),
        }
    }
}

impl std::error::Error for PrepareError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PrepareError::Geometry(e) => Some(e),
            PrepareError::Load { source, .. } => Some(source),
            PrepareError::Save { source, .. } => Some(source),
        }
    }
}

impl From<GeometryError> for PrepareError {
    fn from(e: GeometryError) -> Self {
        PrepareError::Geometry(e)
    }
}
