//! Blendshape mapping table.
//!
//! Each named facial feature is driven by the distance between two tracked
//! landmarks. The table is fixed once built.

use std::collections::BTreeMap;

use serde::Serialize;

use facerig_common::config::MappingConfig;
use facerig_common::error::{FacerigError, FacerigResult};

/// Pair of landmark indices whose distance proxies a feature's activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LandmarkPair {
    pub first: usize,
    pub second: usize,
}

impl LandmarkPair {
    /// Largest index referenced by the pair.
    pub fn max_index(&self) -> usize {
        self.first.max(self.second)
    }
}

/// Immutable feature → landmark pair table, iterated in name order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlendshapeMapping {
    features: BTreeMap<String, LandmarkPair>,
}

impl BlendshapeMapping {
    /// Build a mapping from `(feature, (idx1, idx2))` entries.
    ///
    /// Rejects empty names, duplicate names, and pairs that reference the
    /// same landmark twice.
    pub fn new<I, S>(entries: I) -> FacerigResult<Self>
    where
        I: IntoIterator<Item = (S, (usize, usize))>,
        S: Into<String>,
    {
        let mut features = BTreeMap::new();
        for (name, (first, second)) in entries {
            let name = name.into();
            if name.trim().is_empty() {
                return Err(FacerigError::configuration(
                    "blendshape feature name must not be empty",
                ));
            }
            if first == second {
                return Err(FacerigError::configuration(format!(
                    "feature '{name}' maps landmark {first} to itself"
                )));
            }
            if features
                .insert(name.clone(), LandmarkPair { first, second })
                .is_some()
            {
                return Err(FacerigError::configuration(format!(
                    "feature '{name}' is mapped more than once"
                )));
            }
        }
        Ok(Self { features })
    }

    /// Build a mapping from the `mapping` section of the app config.
    pub fn from_config(config: &MappingConfig) -> FacerigResult<Self> {
        Self::new(
            config
                .features
                .iter()
                .map(|(name, [a, b])| (name.clone(), (*a, *b))),
        )
    }

    /// Check every referenced index against a landmark count.
    pub fn validate(&self, landmark_count: usize) -> FacerigResult<()> {
        for (name, pair) in &self.features {
            if pair.max_index() >= landmark_count {
                return Err(FacerigError::configuration(format!(
                    "feature '{name}' references landmark {} but the landmark set has {landmark_count} points",
                    pair.max_index()
                )));
            }
        }
        Ok(())
    }

    /// Smallest landmark count this mapping can run against.
    pub fn required_landmarks(&self) -> usize {
        self.features
            .values()
            .map(|p| p.max_index() + 1)
            .max()
            .unwrap_or(0)
    }

    pub fn get(&self, feature: &str) -> Option<LandmarkPair> {
        self.features.get(feature).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, LandmarkPair)> {
        self.features.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
