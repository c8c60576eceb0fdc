//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod email;
pub mod output;
pub mod process;
pub mod serve;

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use invex_core::models::config::InvexConfig;
use invex_core::{create_engine_from_dir, PureOcrEngine};

/// Load the config named on the command line, else the user config file, else defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<InvexConfig> {
    if let Some(path) = config_path {
        return InvexConfig::from_file(Path::new(path))
            .with_context(|| format!("Failed to load config from {}", path));
    }

    let user_config = config::default_config_path();
    if user_config.exists() {
        debug!("Using config file {}", user_config.display());
        return Ok(InvexConfig::from_file(&user_config)?);
    }

    Ok(InvexConfig::default())
}

/// Load the OCR engine from `model_dir`, or the configured model directory.
pub fn load_ocr_engine(
    model_dir: Option<&Path>,
    config: &InvexConfig,
) -> anyhow::Result<PureOcrEngine> {
    let model_dir = model_dir.unwrap_or(config.models.model_dir.as_path());

    if !config.has_ocr_models(model_dir) {
        anyhow::bail!(
            "OCR models not found in {}.\n\n\
             Place {}, {} and {} there, or pass --model-dir.",
            model_dir.display(),
            config.models.detection_model,
            config.models.recognition_model,
            config.models.dictionary
        );
    }

    debug!("Using OCR models from {}", model_dir.display());
    create_engine_from_dir(model_dir, config)
        .map_err(|e| anyhow::anyhow!("Failed to load OCR models: {}", e))
}
