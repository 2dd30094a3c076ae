//! Show animation log statistics.

use std::path::PathBuf;

use facerig_common::clock::FrameRate;
use facerig_common::config::AppConfig;
use facerig_recorder::KeyframeRecorder;

pub fn run(config: &AppConfig, log: PathBuf, fps: Option<u32>) -> anyhow::Result<()> {
    let fps = fps.unwrap_or(config.recording.fps);
    let rate = FrameRate::new(fps).ok_or_else(|| anyhow::anyhow!("fps must be greater than zero"))?;

    let animation = KeyframeRecorder::new(&log)
        .load()
        .map_err(|e| anyhow::anyhow!("Failed to load animation log: {e}"))?;

    println!("Animation log: {}", log.display());
    println!("  Frames: {}", animation.len());
    println!(
        "  Duration: {:.2}s @ {}fps",
        rate.frame_to_secs(animation.len() as u64),
        fps
    );
    println!();

    let stats = animation.feature_stats();
    if stats.is_empty() {
        println!("No blendshape features recorded.");
        return Ok(());
    }

    println!("Features:");
    println!("  {:<20} {:>10} {:>10} {:>10}", "name", "min", "max", "mean");
    for (name, s) in &stats {
        println!(
            "  {:<20} {:>10.4} {:>10.4} {:>10.4}",
            name,
            s.min,
            s.max,
            s.mean()
        );
    }

    if let (Some(first), Some(last)) = (animation.get(0), animation.get(animation.len() - 1)) {
        println!();
        println!(
            "Head rotation: first ({:.1}, {:.1}, {:.1})  last ({:.1}, {:.1}, {:.1})",
            first.head_rotation.x,
            first.head_rotation.y,
            first.head_rotation.z,
            last.head_rotation.x,
            last.head_rotation.y,
            last.head_rotation.z
        );
    }

    Ok(())
}
