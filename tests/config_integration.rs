//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use meshprep::config::PipelineConfig;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("MESHPREP_CACHE__SIZE", "32");
    std::env::set_var("MESHPREP_OUTPUT__WIREFRAME", "true");
    let config = PipelineConfig::load().unwrap();
    assert_eq!(config.cache.size, 32);
    assert!(config.output.wireframe);
    std::env::remove_var("MESHPREP_CACHE__SIZE");
    std::env::remove_var("MESHPREP_OUTPUT__WIREFRAME");
}

#[test]
#[serial]
fn test_default_file_loading() {
    std::env::remove_var("MESHPREP_CACHE__SIZE");
    std::env::remove_var("MESHPREP_OUTPUT__WIREFRAME");

    let cwd = std::env::current_dir().unwrap();
    assert!(cwd.join("config/default.toml").exists());

    let config = PipelineConfig::load().unwrap();
    println!("Cache size from file: {}", config.cache.size);
    assert!(config.cache.size >= 3);
}

#[test]
#[serial]
fn test_user_file_overrides_default() {
    let dir = std::env::temp_dir().join(format!("meshprep_config_test_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("default.toml"), "[synthesis]\nnormals = true\ntangents = false\n").unwrap();
    std::fs::write(dir.join("user.toml"), "[synthesis]\ntangents = true\n").unwrap();

    let config = PipelineConfig::load_from(&dir).unwrap();
    assert!(config.synthesis.normals);
    assert!(config.synthesis.tangents);
    // Sections absent from both files fall back to defaults
    assert_eq!(config.cache.size, 24);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
#[serial]
fn test_missing_directory_uses_defaults() {
    let config = PipelineConfig::load_from("does/not/exist").unwrap();
    assert_eq!(config.output.directory, "out");
}
