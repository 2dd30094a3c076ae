//! Apply a recorded animation log to a rig.

use std::collections::BTreeSet;
use std::path::PathBuf;

use facerig_common::config::AppConfig;
use facerig_recorder::KeyframeRecorder;
use facerig_rig::RigAnimator;

use super::{load_rig, write_bake};

pub fn run(
    config: &AppConfig,
    log: PathBuf,
    rig: Option<PathBuf>,
    bake: Option<PathBuf>,
    fps: Option<u32>,
    calibrate_first_frame: Option<f64>,
) -> anyhow::Result<()> {
    let animation = KeyframeRecorder::new(&log)
        .load()
        .map_err(|e| anyhow::anyhow!("Failed to load animation log: {e}"))?;
    if animation.is_empty() {
        println!("{} holds no frames; nothing to replay.", log.display());
        return Ok(());
    }

    let mut rig_config = config.rig.clone();
    if let Some(fps) = fps {
        rig_config.fps = fps;
    }
    let mut animator = RigAnimator::bind(load_rig(rig.as_deref())?, &rig_config)?;

    if let (Some(range), Some(neutral)) = (calibrate_first_frame, animation.get(0)) {
        animator.calibrate_from_neutral(neutral, range)?;
        println!("Calibrated from first frame (full weight at {range}x neutral)");
    }

    println!(
        "Replaying {} frames onto '{}' @ {}fps",
        animation.len(),
        animator.host().description().name,
        animator.fps()
    );

    let mut skipped = BTreeSet::new();
    let mut rejected = 0u64;
    let mut refused_channels = BTreeSet::new();
    for signal in &animation {
        match animator.apply(signal) {
            Ok(report) => {
                skipped.extend(report.skipped_features);
                refused_channels.extend(report.rejected_channels);
            }
            Err(e) => {
                rejected += 1;
                tracing::debug!(error = %e, "Frame rejected by rig");
            }
        }
    }

    println!("  Frames applied: {}", animator.frame_count() - rejected);
    println!("  Keyed channels: {}", animator.host().keyed_channels());
    println!("  Scene length: {:.2}s", animator.current_time_secs());
    if !skipped.is_empty() {
        let names: Vec<_> = skipped.into_iter().collect();
        println!("  Features without a shape key: {}", names.join(", "));
    }
    if rejected > 0 {
        println!("  Frames rejected by the rig: {rejected}");
    }
    if !refused_channels.is_empty() {
        let names: Vec<_> = refused_channels.iter().map(ToString::to_string).collect();
        println!("  Channels refused by the rig: {}", names.join(", "));
    }

    if let Some(path) = bake {
        write_bake(animator.host(), animator.fps(), animator.frame_count(), &path)?;
    }

    Ok(())
}
