//! Subcommand implementations.

pub mod info;
pub mod init;
pub mod record;
pub mod replay;
pub mod validate;

use std::path::Path;

use facerig_rig::{MemoryRig, RigDescription};

/// Load a rig description, or the built-in one.
fn load_rig(path: Option<&Path>) -> anyhow::Result<MemoryRig> {
    let description = match path {
        Some(path) => RigDescription::load(path)
            .map_err(|e| anyhow::anyhow!("Failed to load rig {}: {e}", path.display()))?,
        None => RigDescription::default(),
    };
    Ok(MemoryRig::new(description))
}

/// Write a rig's keyframes as pretty JSON.
fn write_bake(rig: &MemoryRig, fps: u32, frame_count: u64, path: &Path) -> anyhow::Result<()> {
    let baked = rig.bake(fps, frame_count);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(&baked)?)?;
    println!(
        "Baked {} tracks ({} frames) to {}",
        baked.tracks.len(),
        frame_count,
        path.display()
    );
    Ok(())
}
