//! Clock and frame timing utilities.
//!
//! A capture session is anchored to a monotonic epoch recorded when it
//! starts. Recorded frames carry no timestamps of their own; their time is
//! implied by frame index and the session frame rate.

use std::time::{Duration, Instant};

/// A recording clock that provides monotonic timestamps relative to
/// a fixed epoch (the moment capture started).
#[derive(Debug, Clone)]
pub struct RecordingClock {
    /// The instant capture started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl RecordingClock {
    /// Create a new recording clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Get seconds elapsed since capture start.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at capture start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }
}

/// Fixed-rate frame timebase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    fps: u32,
}

impl FrameRate {
    /// Create a frame rate. Returns `None` for zero.
    pub fn new(fps: u32) -> Option<Self> {
        (fps > 0).then_some(Self { fps })
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Interval between two frames.
    pub fn interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps as f64)
    }

    /// Time of a frame index, in seconds.
    pub fn frame_to_secs(&self, frame: u64) -> f64 {
        frame as f64 / self.fps as f64
    }

    /// Nearest frame index at or before `secs`.
    pub fn secs_to_frame(&self, secs: f64) -> u64 {
        (secs.max(0.0) * self.fps as f64).floor() as u64
    }
}

impl Default for FrameRate {
    fn default() -> Self {
        Self { fps: 30 }
    }
}
