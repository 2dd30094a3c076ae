//! In-process rig host.
//!
//! Holds a rig description (bones plus shape-key meshes), the current value
//! of every written channel, and a keyframe track per channel. Used to
//! replay recorded logs without a host application and to bake the result
//! to JSON.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use facerig_common::error::{FacerigError, FacerigResult};

use crate::host::{ChannelRef, ChannelValue, RigHost, ShapeKeyMesh};

/// Static description of a rig's animatable structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RigDescription {
    pub name: String,
    pub bones: Vec<String>,
    pub meshes: Vec<ShapeKeyMesh>,
}

impl Default for RigDescription {
    fn default() -> Self {
        Self {
            name: "Armature".to_string(),
            bones: vec!["head".to_string(), "neck".to_string()],
            meshes: vec![ShapeKeyMesh {
                name: "Face".to_string(),
                keys: [
                    "eye_blink.L",
                    "eye_blink.R",
                    "mouth_open",
                    "mouth_wide",
                    "brow_up.L",
                    "brow_up.R",
                ]
                .into_iter()
                .map(String::from)
                .collect(),
            }],
        }
    }
}

impl RigDescription {
    /// Read a rig description from a JSON file.
    pub fn load(path: &Path) -> FacerigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            FacerigError::configuration(format!(
                "Invalid rig description {}: {e}",
                path.display()
            ))
        })
    }
}

/// One keyframe on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: u64,
    pub value: ChannelValue,
}

/// Keyframes of one channel, in frame order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakedTrack {
    pub channel: ChannelRef,
    pub keyframes: Vec<Keyframe>,
}

/// Serializable dump of every keyed channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BakedAnimation {
    pub rig: String,
    pub fps: u32,
    pub frame_count: u64,
    pub tracks: Vec<BakedTrack>,
}

/// Rig host backed by plain collections.
#[derive(Debug, Clone)]
pub struct MemoryRig {
    description: RigDescription,
    bones: BTreeSet<String>,
    values: BTreeMap<ChannelRef, ChannelValue>,
    tracks: BTreeMap<ChannelRef, Vec<Keyframe>>,
}

impl MemoryRig {
    pub fn new(description: RigDescription) -> Self {
        let bones = description.bones.iter().cloned().collect();
        Self {
            description,
            bones,
            values: BTreeMap::new(),
            tracks: BTreeMap::new(),
        }
    }

    pub fn description(&self) -> &RigDescription {
        &self.description
    }

    /// Current value of a channel, if it was ever written.
    pub fn value(&self, channel: &ChannelRef) -> Option<ChannelValue> {
        self.values.get(channel).copied()
    }

    /// Keyframes on a channel, in frame order.
    pub fn keyframes(&self, channel: &ChannelRef) -> &[Keyframe] {
        self.tracks.get(channel).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of channels holding at least one keyframe.
    pub fn keyed_channels(&self) -> usize {
        self.tracks.len()
    }

    /// Dump all tracks.
    pub fn bake(&self, fps: u32, frame_count: u64) -> BakedAnimation {
        BakedAnimation {
            rig: self.description.name.clone(),
            fps,
            frame_count,
            tracks: self
                .tracks
                .iter()
                .map(|(channel, keyframes)| BakedTrack {
                    channel: channel.clone(),
                    keyframes: keyframes.clone(),
                })
                .collect(),
        }
    }

    fn has_channel(&self, channel: &ChannelRef) -> bool {
        match channel {
            ChannelRef::BoneRotation { bone } | ChannelRef::BoneLocation { bone } => {
                self.bones.contains(bone)
            }
            ChannelRef::ShapeKey { mesh, key } => self
                .description
                .meshes
                .iter()
                .any(|m| &m.name == mesh && m.keys.iter().any(|k| k == key)),
        }
    }
}

impl RigHost for MemoryRig {
    fn name(&self) -> &str {
        &self.description.name
    }

    fn bones(&self) -> Vec<String> {
        self.description.bones.clone()
    }

    fn shape_key_meshes(&self) -> Vec<ShapeKeyMesh> {
        self.description
            .meshes
            .iter()
            .filter(|m| !m.keys.is_empty())
            .cloned()
            .collect()
    }

    fn set_channel(&mut self, channel: &ChannelRef, value: ChannelValue) -> FacerigResult<()> {
        let compatible = matches!(
            (channel, value),
            (ChannelRef::BoneRotation { .. }, ChannelValue::Rotation(_))
                | (ChannelRef::BoneLocation { .. }, ChannelValue::Location(_))
                | (ChannelRef::ShapeKey { .. }, ChannelValue::Weight(_))
        );
        if !compatible {
            return Err(FacerigError::rig(format!(
                "{channel} cannot hold {value:?}"
            )));
        }
        if !self.has_channel(channel) {
            return Err(FacerigError::rig(format!("{channel} does not exist")));
        }
        self.values.insert(channel.clone(), value);
        Ok(())
    }

    fn insert_keyframe(&mut self, channel: &ChannelRef, frame: u64) -> FacerigResult<()> {
        let value = self
            .values
            .get(channel)
            .copied()
            .ok_or_else(|| FacerigError::rig(format!("{channel} has no value to key")))?;

        let track = self.tracks.entry(channel.clone()).or_default();
        match track.binary_search_by_key(&frame, |k| k.frame) {
            Ok(idx) => track[idx].value = value,
            Err(idx) => track.insert(idx, Keyframe { frame, value }),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyframe_replaces_same_frame() {
        let mut rig = MemoryRig::new(RigDescription::default());
        let channel = ChannelRef::shape_key("Face", "mouth_open");

        rig.set_channel(&channel, ChannelValue::Weight(0.2)).unwrap();
        rig.insert_keyframe(&channel, 3).unwrap();
        rig.set_channel(&channel, ChannelValue::Weight(0.9)).unwrap();
        rig.insert_keyframe(&channel, 3).unwrap();
        rig.insert_keyframe(&channel, 1).unwrap();

        let keys = rig.keyframes(&channel);
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].frame, 1);
        assert_eq!(keys[1].value, ChannelValue::Weight(0.9));
    }

    #[test]
    fn test_rejects_unknown_channel_and_mismatched_value() {
        let mut rig = MemoryRig::new(RigDescription::default());
        assert!(rig
            .set_channel(&ChannelRef::bone_rotation("jaw"), ChannelValue::Rotation([0.0; 3]))
            .is_err());
        assert!(rig
            .set_channel(&ChannelRef::bone_rotation("head"), ChannelValue::Weight(1.0))
            .is_err());
        assert!(rig
            .insert_keyframe(&ChannelRef::bone_rotation("head"), 0)
            .is_err());
    }

    #[test]
    fn test_bake_lists_keyed_channels() {
        let mut rig = MemoryRig::new(RigDescription::default());
        let head = ChannelRef::bone_rotation("head");
        rig.set_channel(&head, ChannelValue::Rotation([0.1, 0.2, 0.3]))
            .unwrap();
        rig.insert_keyframe(&head, 0).unwrap();

        let baked = rig.bake(30, 1);
        assert_eq!(baked.rig, "Armature");
        assert_eq!(baked.tracks.len(), 1);
        assert_eq!(baked.tracks[0].channel, head);

        let json = serde_json::to_string(&baked).unwrap();
        let parsed: BakedAnimation = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, baked);
    }

    #[test]
    fn test_load_description() {
        let dir = std::env::temp_dir().join("facerig_test_rig_description");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("rig.json");
        std::fs::write(
            &path,
            r#"{"name":"Fox","bones":["head"],"meshes":[{"name":"FoxFace","keys":["mouth_open"]}]}"#,
        )
        .unwrap();

        let description = RigDescription::load(&path).unwrap();
        assert_eq!(description.name, "Fox");
        assert_eq!(description.meshes[0].keys, vec!["mouth_open"]);

        std::fs::write(&path, r#"{"name":"Fox"}"#).unwrap();
        assert!(matches!(
            RigDescription::load(&path),
            Err(FacerigError::Configuration { .. })
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
