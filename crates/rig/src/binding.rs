//! Control-signal → rig channel binding.
//!
//! Resolved once, explicitly, from the host handed to the animator. Channel
//! names the host does not have are left out of the binding so the animator
//! can skip them per frame.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use facerig_common::config::{CalibrationConfig, RigConfig};
use facerig_common::error::{FacerigError, FacerigResult};
use facerig_signal_model::signal::ControlSignal;

use crate::host::{ChannelRef, RigHost};

/// Bone channel driven by head rotation.
pub const HEAD_CHANNEL: &str = "head";
/// Bone channel driven by head translation.
pub const LOCATION_CHANNEL: &str = "head_location";

/// Raw distance range mapped onto a `[0, 1]` shape-key weight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeCalibration {
    neutral: f64,
    full: f64,
}

impl ShapeCalibration {
    /// `full` must be finite and greater than `neutral`.
    pub fn new(neutral: f64, full: f64) -> FacerigResult<Self> {
        if !neutral.is_finite() || !full.is_finite() || full <= neutral {
            return Err(FacerigError::configuration(format!(
                "calibration range must satisfy neutral < full, got neutral={neutral} full={full}"
            )));
        }
        Ok(Self { neutral, full })
    }

    pub fn neutral(&self) -> f64 {
        self.neutral
    }

    pub fn full(&self) -> f64 {
        self.full
    }

    /// Weight for a raw distance, clamped to `[0, 1]`.
    pub fn weight(&self, raw: f64) -> f64 {
        ((raw - self.neutral) / (self.full - self.neutral)).clamp(0.0, 1.0)
    }
}

impl TryFrom<CalibrationConfig> for ShapeCalibration {
    type Error = FacerigError;

    fn try_from(config: CalibrationConfig) -> FacerigResult<Self> {
        Self::new(config.neutral, config.full)
    }
}

/// Resolved bone and shape-key targets for one rig.
#[derive(Debug, Clone, PartialEq)]
pub struct RigBinding {
    bone_targets: BTreeMap<String, String>,
    shape_targets: BTreeMap<String, Vec<ChannelRef>>,
    calibration: BTreeMap<String, ShapeCalibration>,
    translation_scale: f64,
}

impl RigBinding {
    /// Introspect `host` and resolve the configured channel names.
    ///
    /// Fails with `NoShapeKeyTarget` when the host has no mesh with shape
    /// keys, and with `Configuration` for invalid calibration or scale.
    pub fn resolve<H: RigHost + ?Sized>(host: &H, config: &RigConfig) -> FacerigResult<Self> {
        let meshes: Vec<_> = host
            .shape_key_meshes()
            .into_iter()
            .filter(|mesh| !mesh.keys.is_empty())
            .collect();
        if meshes.is_empty() {
            return Err(FacerigError::no_shape_key_target(format!(
                "rig '{}' has no mesh with shape keys",
                host.name()
            )));
        }

        if !config.translation_scale.is_finite() {
            return Err(FacerigError::configuration(format!(
                "translation_scale must be finite, got {}",
                config.translation_scale
            )));
        }

        let bones: BTreeSet<String> = host.bones().into_iter().collect();
        let mut bone_targets = BTreeMap::new();
        for (channel, bone) in &config.bone_targets {
            if bones.contains(bone) {
                bone_targets.insert(channel.clone(), bone.clone());
            } else {
                tracing::debug!(channel = %channel, bone = %bone, "Bone not on rig; channel unbound");
            }
        }

        let mut shape_targets = BTreeMap::new();
        for (feature, key) in &config.shape_targets {
            let refs: Vec<ChannelRef> = meshes
                .iter()
                .filter(|mesh| mesh.keys.iter().any(|k| k == key))
                .map(|mesh| ChannelRef::shape_key(&mesh.name, key))
                .collect();
            if refs.is_empty() {
                tracing::debug!(feature = %feature, key = %key, "Shape key not on rig; feature unbound");
            } else {
                shape_targets.insert(feature.clone(), refs);
            }
        }

        let calibration = config
            .calibration
            .iter()
            .map(|(feature, c)| {
                ShapeCalibration::try_from(*c).map(|calibration| (feature.clone(), calibration))
            })
            .collect::<FacerigResult<BTreeMap<_, _>>>()?;

        tracing::info!(
            rig = %host.name(),
            meshes = meshes.len(),
            bones = bone_targets.len(),
            features = shape_targets.len(),
            "Rig bound"
        );

        Ok(Self {
            bone_targets,
            shape_targets,
            calibration,
            translation_scale: config.translation_scale,
        })
    }

    /// Host bone bound to a channel name.
    pub fn bone(&self, channel: &str) -> Option<&str> {
        self.bone_targets.get(channel).map(String::as_str)
    }

    /// Host shape keys bound to a feature (one per mesh carrying the key).
    pub fn shape_targets(&self, feature: &str) -> Option<&[ChannelRef]> {
        self.shape_targets.get(feature).map(Vec::as_slice)
    }

    /// Features with at least one shape-key target.
    pub fn bound_features(&self) -> impl Iterator<Item = &str> {
        self.shape_targets.keys().map(String::as_str)
    }

    pub fn translation_scale(&self) -> f64 {
        self.translation_scale
    }

    pub fn calibration(&self, feature: &str) -> Option<ShapeCalibration> {
        self.calibration.get(feature).copied()
    }

    pub fn set_calibration(&mut self, feature: impl Into<String>, calibration: ShapeCalibration) {
        self.calibration.insert(feature.into(), calibration);
    }

    /// Calibrate every feature from a frame captured on a neutral face.
    ///
    /// The observed distance becomes weight 0 and `range` times it becomes
    /// weight 1. Features observed at zero distance are left uncalibrated.
    pub fn calibrate_from_neutral(
        &mut self,
        neutral: &ControlSignal,
        range: f64,
    ) -> FacerigResult<()> {
        if !range.is_finite() || range <= 1.0 {
            return Err(FacerigError::configuration(format!(
                "calibration range must be greater than 1, got {range}"
            )));
        }
        for (feature, &value) in &neutral.blendshapes {
            if value <= 0.0 {
                tracing::warn!(feature = %feature, "Neutral distance is zero; leaving uncalibrated");
                continue;
            }
            self.set_calibration(feature.clone(), ShapeCalibration::new(value, value * range)?);
        }
        Ok(())
    }

    /// Shape-key weight for a raw feature distance.
    ///
    /// Calibrated features map into `[0, 1]`; others pass through unchanged.
    pub fn weight_for(&self, feature: &str, raw: f64) -> f64 {
        match self.calibration.get(feature) {
            Some(c) => c.weight(raw),
            None => raw,
        }
    }
}
