//! Rig animator.
//!
//! Applies one control signal per call to the bound rig and keys every
//! written channel at the current frame. The frame counter advances by
//! exactly one per call, whatever was skipped, which gives the keyed
//! animation a uniform timebase at the configured frame rate.

use facerig_common::clock::FrameRate;
use facerig_common::config::RigConfig;
use facerig_common::error::{FacerigError, FacerigResult};
use facerig_signal_model::signal::ControlSignal;

use crate::binding::{RigBinding, ShapeCalibration, HEAD_CHANNEL, LOCATION_CHANNEL};
use crate::host::{ChannelRef, ChannelValue, RigHost};

/// Lifecycle of an animator.
///
/// `Unbound` only exists while [`RigAnimator::bind`] is introspecting the
/// rig; a returned animator is always `Bound` and stays so. The state is
/// exposed through [`RigAnimator::state`] for host introspection, such as a
/// host UI reporting whether a rig is driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimatorState {
    Unbound,
    Bound,
}

/// What one `apply` call wrote.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplyReport {
    /// Frame the keyframes were written at.
    pub frame: u64,
    /// Head rotation was keyed.
    pub rotation_applied: bool,
    /// Head location was keyed.
    pub location_applied: bool,
    /// Features written to at least one shape key.
    pub applied_features: Vec<String>,
    /// Features with no shape-key target on this rig.
    pub skipped_features: Vec<String>,
    /// Channels the host refused to set or key this frame.
    pub rejected_channels: Vec<ChannelRef>,
}

impl ApplyReport {
    /// Whether anything at all was keyed.
    pub fn keyed_anything(&self) -> bool {
        self.rotation_applied || self.location_applied || !self.applied_features.is_empty()
    }
}

/// Stateful consumer of control signals for one bound rig.
pub struct RigAnimator<H: RigHost> {
    host: H,
    binding: RigBinding,
    frame_rate: FrameRate,
    frame_count: u64,
    state: AnimatorState,
}

impl<H: RigHost> RigAnimator<H> {
    /// Bind to `host`. No animator is returned unless binding succeeds.
    pub fn bind(host: H, config: &RigConfig) -> FacerigResult<Self> {
        tracing::debug!(rig = %host.name(), state = ?AnimatorState::Unbound, "Binding rig");

        let frame_rate = FrameRate::new(config.fps)
            .ok_or_else(|| FacerigError::configuration("rig fps must be greater than zero"))?;
        let binding = RigBinding::resolve(&host, config)?;

        if binding.bone(HEAD_CHANNEL).is_none() {
            tracing::warn!(rig = %host.name(), "No head bone bound; head rotation will not be keyed");
        }

        Ok(Self {
            host,
            binding,
            frame_rate,
            frame_count: 0,
            state: AnimatorState::Bound,
        })
    }

    /// Apply one frame and advance the frame counter.
    ///
    /// Every bound channel is tried on its own. Channels missing from the rig
    /// are skipped, and channels the host refuses land in
    /// [`ApplyReport::rejected_channels`] while the rest of the frame is still
    /// keyed. `Rig` is returned only when the host refused every write it
    /// was offered. The frame counter advances either way.
    pub fn apply(&mut self, signal: &ControlSignal) -> FacerigResult<ApplyReport> {
        let frame = self.frame_count;
        let report = self.write_frame(signal, frame);
        self.frame_count += 1;

        if !report.rejected_channels.is_empty() && !report.keyed_anything() {
            tracing::warn!(
                frame,
                rejected = report.rejected_channels.len(),
                "Host rejected every channel write"
            );
            return Err(FacerigError::rig(format!(
                "frame {frame}: host refused all {} channel writes",
                report.rejected_channels.len()
            )));
        }

        tracing::trace!(
            frame,
            rotation = report.rotation_applied,
            applied = report.applied_features.len(),
            skipped = report.skipped_features.len(),
            rejected = report.rejected_channels.len(),
            "Frame applied"
        );
        Ok(report)
    }

    fn write_frame(&mut self, signal: &ControlSignal, frame: u64) -> ApplyReport {
        let mut report = ApplyReport {
            frame,
            ..Default::default()
        };

        if let Some(bone) = self.binding.bone(HEAD_CHANNEL) {
            let channel = ChannelRef::bone_rotation(bone);
            let radians = signal.head_rotation.to_radians();
            let keyed =
                self.key_channel(&channel, ChannelValue::Rotation(radians), frame, &mut report);
            report.rotation_applied = keyed;
        }

        if let (Some(bone), [x, y, z]) = (
            self.binding.bone(LOCATION_CHANNEL),
            signal.translation.as_slice(),
        ) {
            let scale = self.binding.translation_scale();
            let channel = ChannelRef::bone_location(bone);
            let value = ChannelValue::Location([x * scale, y * scale, z * scale]);
            let keyed = self.key_channel(&channel, value, frame, &mut report);
            report.location_applied = keyed;
        }

        for (feature, &raw) in &signal.blendshapes {
            let Some(targets) = self.binding.shape_targets(feature) else {
                report.skipped_features.push(feature.clone());
                continue;
            };
            let value = ChannelValue::Weight(self.binding.weight_for(feature, raw));
            let targets = targets.to_vec();
            let mut keyed = false;
            for channel in &targets {
                keyed |= self.key_channel(channel, value, frame, &mut report);
            }
            if keyed {
                report.applied_features.push(feature.clone());
            }
        }

        report
    }

    /// Set and key one channel. A refusal is logged and recorded in `report`.
    fn key_channel(
        &mut self,
        channel: &ChannelRef,
        value: ChannelValue,
        frame: u64,
        report: &mut ApplyReport,
    ) -> bool {
        let result = self
            .host
            .set_channel(channel, value)
            .and_then(|()| self.host.insert_keyframe(channel, frame));
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(frame, channel = %channel, error = %e, "Host refused channel write");
                report.rejected_channels.push(channel.clone());
                false
            }
        }
    }

    /// Frames applied so far; also the frame the next `apply` keys at.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Always `Bound` for a returned animator; see [`AnimatorState`].
    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn fps(&self) -> u32 {
        self.frame_rate.fps()
    }

    /// Scene time of the next frame, in seconds.
    pub fn current_time_secs(&self) -> f64 {
        self.frame_rate.frame_to_secs(self.frame_count)
    }

    pub fn binding(&self) -> &RigBinding {
        &self.binding
    }

    /// Set the weight calibration for one feature.
    pub fn calibrate(&mut self, feature: impl Into<String>, calibration: ShapeCalibration) {
        self.binding.set_calibration(feature, calibration);
    }

    /// Calibrate all features from a neutral-face frame.
    pub fn calibrate_from_neutral(
        &mut self,
        neutral: &ControlSignal,
        range: f64,
    ) -> FacerigResult<()> {
        self.binding.calibrate_from_neutral(neutral, range)
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }
}
