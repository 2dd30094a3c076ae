//! Raw tracking sample → control signal.
//!
//! Head angles are copied through in degrees; converting to the rig's
//! rotation units is the animator's job. Each blendshape value is the raw
//! Euclidean distance between its two landmarks.

use std::collections::BTreeMap;

use facerig_common::config::MappingConfig;
use facerig_common::error::{FacerigError, FacerigResult};
use facerig_signal_model::sample::{Point, RawTrackingSample};
use facerig_signal_model::signal::{ControlSignal, HeadRotation};

use crate::mapping::BlendshapeMapping;

/// Stateless mapper owning its blendshape table.
#[derive(Debug, Clone)]
pub struct SignalMapper {
    mapping: BlendshapeMapping,
    expression_len: Option<usize>,
}

impl SignalMapper {
    /// Create a mapper. Landmark indices are checked against each sample.
    pub fn new(mapping: BlendshapeMapping) -> Self {
        Self {
            mapping,
            expression_len: None,
        }
    }

    /// Create a mapper for a tracking model with a known landmark count,
    /// rejecting out-of-range indices up front.
    pub fn with_landmark_count(
        mapping: BlendshapeMapping,
        landmark_count: usize,
    ) -> FacerigResult<Self> {
        mapping.validate(landmark_count)?;
        Ok(Self::new(mapping))
    }

    /// Require every sample to carry exactly `len` expression coefficients.
    pub fn with_expression_len(mut self, len: usize) -> Self {
        self.expression_len = Some(len);
        self
    }

    /// Build a mapper from the `mapping` section of the app config.
    pub fn from_config(config: &MappingConfig) -> FacerigResult<Self> {
        let mapping = BlendshapeMapping::from_config(config)?;
        let mapper = match config.landmark_count {
            Some(count) => Self::with_landmark_count(mapping, count)?,
            None => Self::new(mapping),
        };
        Ok(match config.expression_len {
            Some(len) => mapper.with_expression_len(len),
            None => mapper,
        })
    }

    pub fn mapping(&self) -> &BlendshapeMapping {
        &self.mapping
    }

    /// Map one frame.
    ///
    /// Fails with `Configuration` when the mapping references a landmark the
    /// sample does not have, and with `MalformedInput` when the sample itself
    /// is inconsistent or a distance overflows.
    pub fn map(&self, raw: &RawTrackingSample) -> FacerigResult<ControlSignal> {
        raw.check_shape(self.expression_len)?;
        let landmarks = raw.primary_landmarks()?;

        if raw.landmarks.batch_len() > 1 {
            tracing::debug!(
                subjects = raw.landmarks.batch_len(),
                "Batched landmarks; using the first subject only"
            );
        }

        let mut blendshapes = BTreeMap::new();
        for (feature, pair) in self.mapping.iter() {
            let a = landmark(landmarks, pair.first, feature)?;
            let b = landmark(landmarks, pair.second, feature)?;
            let value = distance(a, b);
            if !value.is_finite() {
                return Err(FacerigError::malformed(format!(
                    "feature '{feature}' distance between landmarks {} and {} is not finite",
                    pair.first, pair.second
                )));
            }
            blendshapes.insert(feature.to_string(), value);
        }

        Ok(ControlSignal {
            head_rotation: HeadRotation::new(raw.pitch, raw.yaw, raw.roll),
            blendshapes,
            translation: raw.translation.clone(),
            expression: raw.expression.clone(),
        })
    }
}

/// Map a sample with an explicit mapping table.
pub fn map_sample(
    raw: &RawTrackingSample,
    mapping: &BlendshapeMapping,
) -> FacerigResult<ControlSignal> {
    SignalMapper::new(mapping.clone()).map(raw)
}

fn landmark<'a>(landmarks: &'a [Point], idx: usize, feature: &str) -> FacerigResult<&'a Point> {
    landmarks.get(idx).ok_or_else(|| {
        FacerigError::configuration(format!(
            "feature '{feature}' references landmark {idx} but the sample has {} points",
            landmarks.len()
        ))
    })
}

fn distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(p, q)| (p - q) * (p - q))
        .sum::<f64>()
        .sqrt()
}
