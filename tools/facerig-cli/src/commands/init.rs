//! Write the default configuration.

use std::path::PathBuf;

use facerig_common::config::{config_file_path, AppConfig};

pub fn run(output: Option<PathBuf>, force: bool) -> anyhow::Result<()> {
    let path = output.unwrap_or_else(config_file_path);
    if path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            path.display()
        );
    }

    let config = AppConfig::default();
    config
        .save_to(&path)
        .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;

    println!("Configuration written to {}", path.display());
    println!("  Recording: {}fps -> {}", config.recording.fps, config.recording.output_path.display());
    println!("  Mapped features: {}", config.mapping.features.len());
    println!("  Shape targets: {}", config.rig.shape_targets.len());

    Ok(())
}
