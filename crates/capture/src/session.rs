//! Capture session management.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{Interval, MissedTickBehavior};

use facerig_common::clock::{FrameRate, RecordingClock};
use facerig_common::config::RecordingDefaults;
use facerig_common::error::{FacerigError, FacerigResult};
use facerig_recorder::KeyframeRecorder;
use facerig_rig::{MemoryRig, RigAnimator, RigHost};
use facerig_signal_mapper::{SignalMapper, SignalSmoother};
use facerig_signal_model::signal::ControlSignal;

use crate::source::{SourceFrame, TrackingSource};

/// What to do with a frame that cannot be mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameErrorPolicy {
    /// Log and skip the frame; the session continues.
    DropFrame,
    /// Save what was recorded and end the session with the error.
    Abort,
}

/// Configuration for a capture session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Frames pulled from the source per second.
    pub fps: u32,

    /// Apply each frame to the animator while capturing.
    pub preview: bool,

    /// Handling of malformed frames.
    pub on_error: FrameErrorPolicy,

    /// Smoothing strength in `[0.0, 1.0]`.
    pub smoothing: f64,

    /// Stop after this many source frames.
    pub max_frames: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_defaults(&RecordingDefaults::default())
    }
}

impl SessionConfig {
    pub fn from_defaults(defaults: &RecordingDefaults) -> Self {
        Self {
            fps: defaults.fps,
            preview: defaults.real_time_preview,
            on_error: if defaults.abort_on_malformed {
                FrameErrorPolicy::Abort
            } else {
                FrameErrorPolicy::DropFrame
            },
            smoothing: defaults.smoothing,
            max_frames: None,
        }
    }
}

/// State of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Session created but not started.
    Idle,
    /// Pulling frames.
    Running,
    /// Finished normally and saved.
    Stopped,
    /// Ended by an error.
    Failed,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    /// Frames pulled from the source.
    pub frames_seen: u64,
    /// Frames appended to the recorder.
    pub frames_recorded: u64,
    /// Frames applied to the rig without a host error.
    pub frames_applied: u64,
    /// Malformed frames skipped.
    pub frames_dropped: u64,
    pub duration_secs: f64,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    seen: u64,
    recorded: u64,
    applied: u64,
    dropped: u64,
}

/// A capture session: source → mapper → recorder, with optional rig preview.
pub struct CaptureSession<H: RigHost = MemoryRig> {
    source: Box<dyn TrackingSource>,
    mapper: SignalMapper,
    smoother: SignalSmoother,
    recorder: KeyframeRecorder,
    animator: Option<RigAnimator<H>>,
    config: SessionConfig,
    state: SessionState,
    stop_flag: Arc<AtomicBool>,
}

impl<H: RigHost> CaptureSession<H> {
    pub fn new(
        source: Box<dyn TrackingSource>,
        mapper: SignalMapper,
        recorder: KeyframeRecorder,
        animator: Option<RigAnimator<H>>,
        config: SessionConfig,
    ) -> Self {
        Self {
            source,
            mapper,
            smoother: SignalSmoother::new(config.smoothing),
            recorder,
            animator,
            config,
            state: SessionState::Idle,
            stop_flag: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Run until the source is exhausted, `max_frames` is reached, or the
    /// stop flag is set. The recorder is saved before returning, on the
    /// error path too.
    pub async fn run(&mut self) -> FacerigResult<SessionSummary> {
        if self.state != SessionState::Idle {
            return Err(FacerigError::session("Session already started"));
        }
        let rate = FrameRate::new(self.config.fps)
            .ok_or_else(|| FacerigError::session("fps must be greater than zero"))?;

        let clock = RecordingClock::start();
        let started_at = Utc::now();
        self.state = SessionState::Running;
        tracing::info!(
            source = %self.source.name(),
            fps = rate.fps(),
            preview = self.config.preview,
            rig = self.animator.is_some(),
            epoch = %clock.epoch_wall(),
            "Capture session started"
        );

        let mut interval = tokio::time::interval(rate.interval());
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut counters = Counters::default();
        let outcome = self.drive(&mut interval, &mut counters).await;

        if let Err(e) = outcome {
            self.state = SessionState::Failed;
            tracing::error!(error = %e, frames = counters.recorded, "Capture session aborted");
            if let Err(save_err) = self.recorder.save() {
                tracing::error!(error = %save_err, "Failed to save partial recording");
            }
            return Err(e);
        }

        self.recorder.save()?;
        self.state = SessionState::Stopped;

        let summary = SessionSummary {
            frames_seen: counters.seen,
            frames_recorded: counters.recorded,
            frames_applied: counters.applied,
            frames_dropped: counters.dropped,
            duration_secs: clock.elapsed_secs(),
            started_at,
        };
        tracing::info!(
            seen = summary.frames_seen,
            recorded = summary.frames_recorded,
            dropped = summary.frames_dropped,
            duration_secs = summary.duration_secs,
            "Capture session stopped"
        );
        Ok(summary)
    }

    async fn drive(&mut self, interval: &mut Interval, counters: &mut Counters) -> FacerigResult<()> {
        loop {
            if self.stop_flag.load(Ordering::Relaxed) {
                tracing::info!("Stop requested");
                return Ok(());
            }
            if self.config.max_frames.is_some_and(|max| counters.seen >= max) {
                return Ok(());
            }

            interval.tick().await;

            let Some(frame) = self.source.next_sample()? else {
                tracing::info!(source = %self.source.name(), "Source exhausted");
                return Ok(());
            };
            counters.seen += 1;

            let signal = match self.map_frame(frame) {
                Ok(signal) => signal,
                Err(e @ FacerigError::MalformedInput { .. })
                    if self.config.on_error == FrameErrorPolicy::DropFrame =>
                {
                    tracing::warn!(frame = counters.seen - 1, error = %e, "Dropping malformed frame");
                    counters.dropped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            if self.config.preview {
                if let Some(animator) = self.animator.as_mut() {
                    match animator.apply(&signal) {
                        Ok(_) => counters.applied += 1,
                        Err(e) => tracing::warn!(error = %e, "Preview frame not applied"),
                    }
                }
            }

            self.recorder.record(signal);
            counters.recorded += 1;
        }
    }

    fn map_frame(&mut self, frame: SourceFrame) -> FacerigResult<ControlSignal> {
        let raw = match frame {
            SourceFrame::Sample(raw) => raw,
            SourceFrame::Malformed { message } => return Err(FacerigError::malformed(message)),
        };
        let signal = self.mapper.map(&raw)?;
        Ok(if self.smoother.is_passthrough() {
            signal
        } else {
            self.smoother.smooth(&signal)
        })
    }

    /// Set the stop flag.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }

    /// Get the stop flag for external coordination.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn recorder(&self) -> &KeyframeRecorder {
        &self.recorder
    }

    pub fn animator(&self) -> Option<&RigAnimator<H>> {
        self.animator.as_ref()
    }

    /// Take back the recorder and animator.
    pub fn into_parts(self) -> (KeyframeRecorder, Option<RigAnimator<H>>) {
        (self.recorder, self.animator)
    }
}
