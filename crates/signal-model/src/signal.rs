//! Control signals and the animation log.
//!
//! A [`ControlSignal`] is produced fresh for every frame and never mutated
//! afterwards. The recorder and the rig animator each take their own view of
//! it. The log is persisted as a plain JSON array in frame order; there is no
//! frame index field, so skipped frames cannot be represented.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Head rotation in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadRotation {
    /// Pitch (nod).
    pub x: f64,
    /// Yaw (turn).
    pub y: f64,
    /// Roll (tilt).
    pub z: f64,
}

impl HeadRotation {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euler angles in radians, `[x, y, z]`.
    pub fn to_radians(&self) -> [f64; 3] {
        [self.x.to_radians(), self.y.to_radians(), self.z.to_radians()]
    }
}

/// Per-frame animation control signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ControlSignal {
    /// Head rotation in degrees, straight from the tracker.
    pub head_rotation: HeadRotation,

    /// Feature name to raw landmark distance (not normalized).
    pub blendshapes: BTreeMap<String, f64>,

    /// Head translation, pass-through.
    pub translation: Vec<f64>,

    /// Expression coefficients, pass-through.
    pub expression: Vec<f64>,
}

impl ControlSignal {
    /// Whether every numeric field is finite. JSON has no encoding for
    /// NaN or infinity, so only finite signals survive a save.
    pub fn is_finite(&self) -> bool {
        let head = &self.head_rotation;
        [head.x, head.y, head.z].iter().all(|v| v.is_finite())
            && self.blendshapes.values().all(|v| v.is_finite())
            && self.translation.iter().all(|v| v.is_finite())
            && self.expression.iter().all(|v| v.is_finite())
    }

    /// Field-for-field comparison with an absolute tolerance.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= eps;
        let vec_close =
            |a: &[f64], b: &[f64]| a.len() == b.len() && a.iter().zip(b).all(|(x, y)| close(*x, *y));

        close(self.head_rotation.x, other.head_rotation.x)
            && close(self.head_rotation.y, other.head_rotation.y)
            && close(self.head_rotation.z, other.head_rotation.z)
            && self.blendshapes.len() == other.blendshapes.len()
            && self
                .blendshapes
                .iter()
                .zip(&other.blendshapes)
                .all(|((ka, va), (kb, vb))| ka == kb && close(*va, *vb))
            && vec_close(&self.translation, &other.translation)
            && vec_close(&self.expression, &other.expression)
    }
}

/// Ordered control signals; frame index is the position in the log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnimationLog {
    frames: Vec<ControlSignal>,
}

impl AnimationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one frame.
    pub fn push(&mut self, signal: ControlSignal) {
        self.frames.push(signal);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Signal recorded at a frame index.
    pub fn get(&self, frame: usize) -> Option<&ControlSignal> {
        self.frames.get(frame)
    }

    pub fn frames(&self) -> &[ControlSignal] {
        &self.frames
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ControlSignal> {
        self.frames.iter()
    }

    pub fn into_frames(self) -> Vec<ControlSignal> {
        self.frames
    }

    /// Index of the first frame holding a NaN or infinite value.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.frames.iter().position(|signal| !signal.is_finite())
    }

    /// Whether two logs hold the same frames within `eps`.
    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        self.len() == other.len()
            && self
                .frames
                .iter()
                .zip(&other.frames)
                .all(|(a, b)| a.approx_eq(b, eps))
    }

    /// Min/max/mean of every blendshape feature across the log.
    pub fn feature_stats(&self) -> BTreeMap<String, FeatureStats> {
        let mut stats: BTreeMap<String, FeatureStats> = BTreeMap::new();
        for signal in &self.frames {
            for (name, &value) in &signal.blendshapes {
                stats
                    .entry(name.clone())
                    .and_modify(|s| s.observe(value))
                    .or_insert_with(|| FeatureStats::first(value));
            }
        }
        stats
    }
}

impl From<Vec<ControlSignal>> for AnimationLog {
    fn from(frames: Vec<ControlSignal>) -> Self {
        Self { frames }
    }
}

impl FromIterator<ControlSignal> for AnimationLog {
    fn from_iter<I: IntoIterator<Item = ControlSignal>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a AnimationLog {
    type Item = &'a ControlSignal;
    type IntoIter = std::slice::Iter<'a, ControlSignal>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

/// Summary statistics for one blendshape feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureStats {
    pub min: f64,
    pub max: f64,
    pub sum: f64,
    pub count: usize,
}

impl FeatureStats {
    fn first(value: f64) -> Self {
        Self {
            min: value,
            max: value,
            sum: value,
            count: 1,
        }
    }

    fn observe(&mut self, value: f64) {
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.sum += value;
        self.count += 1;
    }

    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }
}

/// Parse an animation log from its JSON array form.
pub fn parse_log(json: &str) -> Result<AnimationLog, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize an animation log to its JSON array form.
pub fn serialize_log(log: &AnimationLog) -> Result<String, serde_json::Error> {
    serde_json::to_string(log)
}
