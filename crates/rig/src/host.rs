//! Host rig capability contract.
//!
//! The animator never sees a host's object model. It only needs to list
//! bones and shape-key meshes once at bind time, set a value on a named
//! channel, and insert a keyframe for that channel at a frame index.

use std::fmt;

use serde::{Deserialize, Serialize};

use facerig_common::error::FacerigResult;

/// Address of one animatable channel in the host.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChannelRef {
    /// Euler rotation of a pose bone.
    BoneRotation { bone: String },
    /// Location of a pose bone.
    BoneLocation { bone: String },
    /// Weight of a shape key on a mesh.
    ShapeKey { mesh: String, key: String },
}

impl ChannelRef {
    pub fn bone_rotation(bone: impl Into<String>) -> Self {
        Self::BoneRotation { bone: bone.into() }
    }

    pub fn bone_location(bone: impl Into<String>) -> Self {
        Self::BoneLocation { bone: bone.into() }
    }

    pub fn shape_key(mesh: impl Into<String>, key: impl Into<String>) -> Self {
        Self::ShapeKey {
            mesh: mesh.into(),
            key: key.into(),
        }
    }

    /// Property name keyed on the target.
    pub fn data_path(&self) -> &'static str {
        match self {
            Self::BoneRotation { .. } => "rotation_euler",
            Self::BoneLocation { .. } => "location",
            Self::ShapeKey { .. } => "value",
        }
    }
}

impl fmt::Display for ChannelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BoneRotation { bone } | Self::BoneLocation { bone } => {
                write!(f, "pose.bones[\"{bone}\"].{}", self.data_path())
            }
            Self::ShapeKey { mesh, key } => {
                write!(f, "{mesh}.key_blocks[\"{key}\"].{}", self.data_path())
            }
        }
    }
}

/// Value written to a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ChannelValue {
    /// Euler angles in radians, `[x, y, z]`.
    Rotation([f64; 3]),
    /// Location in rig units.
    Location([f64; 3]),
    /// Shape-key weight.
    Weight(f64),
}

/// A mesh carrying shape keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeKeyMesh {
    pub name: String,
    pub keys: Vec<String>,
}

/// Capabilities the animator needs from a host application.
///
/// Implementations adapt a concrete scene graph. Calls are made from a
/// single thread, one frame at a time.
pub trait RigHost {
    /// Rig name for logging.
    fn name(&self) -> &str;

    /// Names of all pose bones.
    fn bones(&self) -> Vec<String>;

    /// Meshes that carry at least one shape key.
    fn shape_key_meshes(&self) -> Vec<ShapeKeyMesh>;

    /// Set the current value of a channel.
    fn set_channel(&mut self, channel: &ChannelRef, value: ChannelValue) -> FacerigResult<()>;

    /// Keyframe the channel's current value at `frame`.
    fn insert_keyframe(&mut self, channel: &ChannelRef, frame: u64) -> FacerigResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_display_paths() {
        assert_eq!(
            ChannelRef::bone_rotation("head").to_string(),
            "pose.bones[\"head\"].rotation_euler"
        );
        assert_eq!(
            ChannelRef::shape_key("Face", "eye_blink.L").to_string(),
            "Face.key_blocks[\"eye_blink.L\"].value"
        );
    }

    #[test]
    fn test_channel_serialization() {
        let json = serde_json::to_string(&ChannelRef::shape_key("Face", "mouth_open")).unwrap();
        assert_eq!(
            json,
            r#"{"kind":"shape_key","mesh":"Face","key":"mouth_open"}"#
        );
        let value = serde_json::to_string(&ChannelValue::Weight(0.5)).unwrap();
        assert_eq!(value, r#"{"type":"weight","value":0.5}"#);
    }
}
