//! Record a tracking dump into an animation log.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use facerig_capture::{CaptureSession, JsonlTrackingSource, SessionConfig};
use facerig_common::config::AppConfig;
use facerig_recorder::KeyframeRecorder;
use facerig_rig::RigAnimator;
use facerig_signal_mapper::SignalMapper;

use super::{load_rig, write_bake};

pub struct RecordArgs {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub fps: Option<u32>,
    pub preview: bool,
    pub abort_on_error: bool,
    pub smoothing: Option<f64>,
    pub rig: Option<PathBuf>,
    pub bake: Option<PathBuf>,
    pub max_frames: Option<u64>,
}

pub async fn run(config: &AppConfig, args: RecordArgs) -> anyhow::Result<()> {
    let mut recording = config.recording.clone();
    if let Some(fps) = args.fps {
        recording.fps = fps;
    }
    if let Some(smoothing) = args.smoothing {
        recording.smoothing = smoothing;
    }
    recording.real_time_preview &= args.preview;
    recording.abort_on_malformed |= args.abort_on_error;
    let output = args.output.unwrap_or_else(|| recording.output_path.clone());

    let session_config = SessionConfig {
        max_frames: args.max_frames,
        ..SessionConfig::from_defaults(&recording)
    };

    let mapper = SignalMapper::from_config(&config.mapping)
        .map_err(|e| anyhow::anyhow!("Invalid mapping: {e}"))?;
    let source = JsonlTrackingSource::open(&args.input)
        .map_err(|e| anyhow::anyhow!("Failed to open {}: {e}", args.input.display()))?;

    let animator = if session_config.preview {
        let mut rig_config = config.rig.clone();
        rig_config.fps = recording.fps;
        Some(RigAnimator::bind(load_rig(args.rig.as_deref())?, &rig_config)?)
    } else {
        None
    };

    println!("Recording from: {}", args.input.display());
    println!("  Output: {}", output.display());
    println!("  FPS: {}", session_config.fps);
    println!("  Preview: {}", session_config.preview);
    println!("  On malformed frame: {:?}", session_config.on_error);
    println!("  Smoothing: {}", session_config.smoothing);
    println!();
    println!("Press Ctrl+C to stop recording...");

    let mut session = CaptureSession::new(
        Box::new(source),
        mapper,
        KeyframeRecorder::new(&output),
        animator,
        session_config,
    );

    let stop = session.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stop.store(true, Ordering::SeqCst);
        }
    });

    let summary = session.run().await?;

    println!();
    println!("Recording saved to: {}", output.display());
    println!("  Frames seen: {}", summary.frames_seen);
    println!("  Frames recorded: {}", summary.frames_recorded);
    println!("  Frames dropped: {}", summary.frames_dropped);
    println!("  Frames previewed: {}", summary.frames_applied);
    println!("  Duration: {:.2}s", summary.duration_secs);

    if let Some(path) = args.bake {
        match session.into_parts() {
            (_, Some(animator)) => {
                write_bake(animator.host(), animator.fps(), animator.frame_count(), &path)?
            }
            (_, None) => println!("Preview disabled; nothing to bake (use `facerig replay --bake`)"),
        }
    }

    Ok(())
}
