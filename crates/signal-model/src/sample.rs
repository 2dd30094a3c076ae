//! Raw tracking samples produced by the inference engine.
//!
//! One sample per video frame. Landmarks come either as a single keypoint
//! set or with a leading batch axis; the pipeline assumes a single subject
//! and only ever reads the first batch element.

use serde::{Deserialize, Serialize};

use facerig_common::error::{FacerigError, FacerigResult};

/// A 2D or 3D landmark position.
pub type Point = Vec<f64>;

/// Landmark set, optionally batched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Landmarks {
    /// `[[x, y(, z)], ...]`
    Single(Vec<Point>),
    /// `[[[x, y(, z)], ...], ...]`, leading batch axis.
    Batched(Vec<Vec<Point>>),
}

impl Landmarks {
    /// Build an unbatched 2D landmark set.
    pub fn from_points_2d(points: &[(f64, f64)]) -> Self {
        Self::Single(points.iter().map(|&(x, y)| vec![x, y]).collect())
    }

    /// Number of subjects in the set (1 when unbatched).
    pub fn batch_len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Batched(batch) => batch.len(),
        }
    }

    /// The landmark set of the first subject, if any.
    pub fn first_subject(&self) -> Option<&[Point]> {
        match self {
            Self::Single(points) => Some(points),
            Self::Batched(batch) => batch.first().map(Vec::as_slice),
        }
    }
}

/// One frame of tracking output: `(pitch, yaw, roll, translation, expression, scale, landmarks)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTrackingSample {
    /// Head pitch in degrees.
    pub pitch: f64,
    /// Head yaw in degrees.
    pub yaw: f64,
    /// Head roll in degrees.
    pub roll: f64,
    /// Head translation, 3 components.
    pub translation: Vec<f64>,
    /// Expression coefficients; meaning is specific to the tracking model.
    pub expression: Vec<f64>,
    /// Model scale factor.
    pub scale: f64,
    /// Facial keypoints.
    pub landmarks: Landmarks,
}

impl RawTrackingSample {
    pub fn new(
        pitch: f64,
        yaw: f64,
        roll: f64,
        translation: Vec<f64>,
        expression: Vec<f64>,
        scale: f64,
        landmarks: Landmarks,
    ) -> Self {
        Self {
            pitch,
            yaw,
            roll,
            translation,
            expression,
            scale,
            landmarks,
        }
    }

    /// Parse a sample from one line of a tracking dump.
    pub fn from_json(line: &str) -> FacerigResult<Self> {
        serde_json::from_str(line)
            .map_err(|e| FacerigError::malformed(format!("Unparseable tracking sample: {e}")))
    }

    /// Check vector lengths and numeric sanity of the pose fields.
    ///
    /// `expected_expression_len` is enforced when given.
    pub fn check_shape(&self, expected_expression_len: Option<usize>) -> FacerigResult<()> {
        for (name, value) in [
            ("pitch", self.pitch),
            ("yaw", self.yaw),
            ("roll", self.roll),
            ("scale", self.scale),
        ] {
            if !value.is_finite() {
                return Err(FacerigError::malformed(format!(
                    "{name} is not finite: {value}"
                )));
            }
        }

        if self.translation.len() != 3 {
            return Err(FacerigError::malformed(format!(
                "translation must have 3 components, got {}",
                self.translation.len()
            )));
        }
        if self.translation.iter().any(|v| !v.is_finite()) {
            return Err(FacerigError::malformed("translation has non-finite component"));
        }

        if let Some(expected) = expected_expression_len {
            if self.expression.len() != expected {
                return Err(FacerigError::malformed(format!(
                    "expression must have {expected} coefficients, got {}",
                    self.expression.len()
                )));
            }
        }
        if self.expression.iter().any(|v| !v.is_finite()) {
            return Err(FacerigError::malformed("expression has non-finite coefficient"));
        }

        Ok(())
    }

    /// The first subject's landmarks, checked for a consistent 2D/3D layout.
    pub fn primary_landmarks(&self) -> FacerigResult<&[Point]> {
        let points = self
            .landmarks
            .first_subject()
            .ok_or_else(|| FacerigError::malformed("landmark batch is empty"))?;

        let dim = match points.first() {
            Some(first) => first.len(),
            None => return Err(FacerigError::malformed("landmark set is empty")),
        };
        if dim != 2 && dim != 3 {
            return Err(FacerigError::malformed(format!(
                "landmarks must be 2D or 3D, got {dim} components"
            )));
        }

        for (idx, point) in points.iter().enumerate() {
            if point.len() != dim {
                return Err(FacerigError::malformed(format!(
                    "landmark {idx} has {} components, expected {dim}",
                    point.len()
                )));
            }
            if point.iter().any(|v| !v.is_finite()) {
                return Err(FacerigError::malformed(format!(
                    "landmark {idx} has a non-finite coordinate"
                )));
            }
        }

        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(landmarks: Landmarks) -> RawTrackingSample {
        RawTrackingSample::new(
            10.0,
            -5.0,
            0.0,
            vec![0.0, 0.1, 0.2],
            vec![0.5; 4],
            1.0,
            landmarks,
        )
    }

    #[test]
    fn test_landmarks_parse_single_and_batched() {
        let single: Landmarks = serde_json::from_str("[[0.0, 0.0], [3.0, 4.0]]").unwrap();
        assert_eq!(single.batch_len(), 1);
        assert_eq!(single.first_subject().unwrap().len(), 2);

        let batched: Landmarks =
            serde_json::from_str("[[[0.0, 0.0, 1.0], [3.0, 4.0, 1.0]]]").unwrap();
        assert!(matches!(batched, Landmarks::Batched(_)));
        assert_eq!(batched.first_subject().unwrap()[1], vec![3.0, 4.0, 1.0]);
    }

    #[test]
    fn test_sample_from_json_line() {
        let line = r#"{"pitch":10,"yaw":-5,"roll":0,"translation":[0,0,0],"expression":[],"scale":1.0,"landmarks":[[0,0],[3,4]]}"#;
        let parsed = RawTrackingSample::from_json(line).unwrap();
        assert_eq!(parsed.pitch, 10.0);
        assert_eq!(parsed.landmarks.batch_len(), 1);
    }

    #[test]
    fn test_sample_missing_field_is_malformed() {
        let line = r#"{"pitch":10,"yaw":-5,"translation":[0,0,0],"expression":[],"scale":1.0,"landmarks":[]}"#;
        let err = RawTrackingSample::from_json(line).unwrap_err();
        assert!(matches!(err, FacerigError::MalformedInput { .. }));
    }

    #[test]
    fn test_check_shape_rejects_short_translation() {
        let mut s = sample(Landmarks::from_points_2d(&[(0.0, 0.0)]));
        s.translation = vec![1.0, 2.0];
        assert!(matches!(
            s.check_shape(None),
            Err(FacerigError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_check_shape_enforces_expression_len() {
        let s = sample(Landmarks::from_points_2d(&[(0.0, 0.0)]));
        assert!(s.check_shape(Some(4)).is_ok());
        assert!(s.check_shape(Some(63)).is_err());
    }

    #[test]
    fn test_check_shape_rejects_nan_angle() {
        let mut s = sample(Landmarks::from_points_2d(&[(0.0, 0.0)]));
        s.yaw = f64::NAN;
        assert!(s.check_shape(None).is_err());
    }

    #[test]
    fn test_primary_landmarks_rejects_mixed_dimensions() {
        let s = sample(Landmarks::Single(vec![vec![0.0, 0.0], vec![1.0, 2.0, 3.0]]));
        assert!(matches!(
            s.primary_landmarks(),
            Err(FacerigError::MalformedInput { .. })
        ));
    }

    #[test]
    fn test_primary_landmarks_rejects_empty_batch() {
        let s = sample(Landmarks::Batched(vec![]));
        assert!(s.primary_landmarks().is_err());
        let s = sample(Landmarks::Single(vec![]));
        assert!(s.primary_landmarks().is_err());
    }

    #[test]
    fn test_primary_landmarks_uses_first_batch_element() {
        let s = sample(Landmarks::Batched(vec![
            vec![vec![1.0, 1.0]],
            vec![vec![9.0, 9.0]],
        ]));
        assert_eq!(s.primary_landmarks().unwrap()[0], vec![1.0, 1.0]);
    }
}
