//! FaceRig Signal Mapper
//!
//! Turns raw tracking samples into control signals:
//! - **Mapping:** Static feature → landmark-pair table
//! - **Mapper:** Head rotation copy plus per-feature landmark distances
//! - **Smoothing:** Optional frame-to-frame exponential smoothing
//!
//! This crate is pure computation with no I/O and no host dependencies.
//! All inputs are data; all outputs are data.

pub mod mapper;
pub mod mapping;
pub mod smooth;

pub use mapper::{map_sample, SignalMapper};
pub use mapping::{BlendshapeMapping, LandmarkPair};
pub use smooth::SignalSmoother;
