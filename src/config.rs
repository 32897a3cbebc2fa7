//! Pipeline configuration
//!
//! Configuration is loaded from multiple sources with the following priority (lowest to highest):
//! 1. `config/default.toml` (version controlled)
//! 2. `config/user.toml` (gitignored, user overrides)
//! 3. Environment variables (`MESHPREP_SECTION__KEY`)

use figment::{Figment, providers::{Format, Toml, Env}};
use serde::{Serialize, Deserialize};
use std::path::Path;

use meshprep_filters::DEFAULT_CACHE_SIZE;

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Vertex cache optimization
    #[serde(default)]
    pub cache: CacheConfig,
    /// Normal and tangent synthesis
    #[serde(default)]
    pub synthesis: SynthesisConfig,
    /// Output shaping
    #[serde(default)]
    pub output: OutputConfig,
    /// Debug configuration
    #[serde(default)]
    pub debug: DebugConfig,
}

impl PipelineConfig {
    /// Load configuration from default locations
    ///
    /// Priority (lowest to highest):
    /// 1. `config/default.toml`
    /// 2. `config/user.toml`
    /// 3. Environment variables (`MESHPREP_*`)
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific config directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();
        let default_path = config_dir.join("default.toml");
        let user_path = config_dir.join("user.toml");

        let mut figment = Figment::new();

        if default_path.exists() {
            figment = figment.merge(Toml::file(&default_path));
        }

        // Load user config (optional)
        if user_path.exists() {
            figment = figment.merge(Toml::file(&user_path));
        }

        // Environment variables override everything
        // MESHPREP_CACHE__SIZE=32 -> cache.size = 32
        figment = figment.merge(Env::prefixed("MESHPREP_").split("__"));

        figment.extract().map_err(ConfigError::from)
    }
}

/// Vertex cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Renumber vertices in first-use order
    pub pre_transform: bool,
    /// Reorder triangles for the post-transform cache
    pub post_transform: bool,
    /// Simulated post-transform cache size in vertices
    pub size: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            pre_transform: true,
            post_transform: true,
            size: DEFAULT_CACHE_SIZE,
        }
    }
}

/// Attribute synthesis configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Compute smooth vertex normals
    pub normals: bool,
    /// Compute tangents and binormals (needs normals and `st`)
    pub tangents: bool,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            normals: true,
            tangents: false,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Split meshes that do not fit 16-bit indices
    pub partition: bool,
    /// Convert triangles to a line list
    pub wireframe: bool,
    /// Split positions into high/low single-precision parts
    pub encode_positions: bool,
    /// Project positions onto a 2D geographic map
    pub project_to_2d: bool,
    /// Directory prepared geometry is written to
    pub directory: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            partition: true,
            wireframe: false,
            encode_positions: false,
            project_to_2d: false,
            directory: "out".to_string(),
        }
    }
}

/// Debug configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
    /// Length of normal visualization segments; 0 disables them
    pub vector_length: f64,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            vector_length: 0.0,
        }
    }
}

/// Configuration error
#[derive(Debug)]
pub struct ConfigError {
    message: String,
}

impl From<figment::Error> for ConfigError {
    fn from(e: figment::Error) -> Self {
        ConfigError {
            message: e.to_string(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Configuration error: {}", self.message)
    }
}

impl std::error::Error for ConfigError {}
