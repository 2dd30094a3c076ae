//! FaceRig Signal Model
//!
//! Defines the data contracts that flow through the retargeting pipeline:
//! - **Samples:** Raw per-frame tracking output (head pose, translation,
//!   expression coefficients, landmarks)
//! - **Signals:** The compact per-frame control signal (head rotation in
//!   degrees plus raw blendshape distances)
//! - **Logs:** Ordered control signals where frame index equals position
//!
//! Everything here is plain numeric data so it serializes without loss.

pub mod sample;
pub mod signal;

pub use sample::*;
pub use signal::*;
