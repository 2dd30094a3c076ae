//! FaceRig Rig
//!
//! Applies control signals to a character rig as timed keyframes:
//! - **Host:** Capability contract a host application implements
//!   (named channels, settable values, keyframe-at-frame)
//! - **Binding:** Control-signal names resolved once to host bones and
//!   shape keys, with optional weight calibration
//! - **Animator:** Stateful per-frame application with a frame counter
//! - **Memory:** In-process host used for replay, baking, and tests
//!
//! Missing bones or shape keys are skipped per frame, never fatal; a rig
//! without any shape-key mesh cannot be bound at all.

pub mod animator;
pub mod binding;
pub mod host;
pub mod memory;

pub use animator::{AnimatorState, ApplyReport, RigAnimator};
pub use binding::{RigBinding, ShapeCalibration};
pub use host::{ChannelRef, ChannelValue, RigHost, ShapeKeyMesh};
pub use memory::{MemoryRig, RigDescription};
