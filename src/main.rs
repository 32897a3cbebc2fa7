//! meshprep - Mesh preparation for GPU upload
//!
//! Usage: `meshprep <instance.ron>...`
//!
//! Every input file holds one geometry instance. All instances are merged
//! into one mesh, prepared according to `config/` and written to the
//! configured output directory.

use std::process::ExitCode;

use meshprep::{load_instances, prepare, write_prepared, PipelineConfig};

fn main() -> ExitCode {
    let config = PipelineConfig::load();

    // RUST_LOG still wins over the configured level
    let log_level = config
        .as_ref()
        .map(|c| c.debug.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config = config.unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        PipelineConfig::default()
    });

    let inputs: Vec<String> = std::env::args().skip(1).collect();
    if inputs.is_empty() {
        eprintln!("Usage: meshprep <instance.ron>...");
        return ExitCode::FAILURE;
    }

    log::info!("Preparing {} instances", inputs.len());
    let result = load_instances(&inputs)
        .and_then(|instances| prepare(instances, &config))
        .and_then(|prepared| write_prepared(&prepared, &config.output.directory));

    match result {
        Ok(written) => {
            log::info!("Wrote {} files to {}", written.len(), config.output.directory);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
