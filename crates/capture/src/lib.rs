//! FaceRig Capture
//!
//! Drives a capture session at a fixed cadence: each tick pulls one tracking
//! sample, maps it to a control signal, appends it to the recorder, and
//! optionally applies it to a bound rig for live preview.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                 CaptureSession                   │
//! │  ┌────────────────┐   ┌──────────────┐           │
//! │  │ TrackingSource │──▶│ SignalMapper │           │
//! │  └────────────────┘   └──────┬───────┘           │
//! │                              ▼                   │
//! │                     ┌────────────────┐           │
//! │                     │ SignalSmoother │           │
//! │                     └───────┬────────┘           │
//! │                ┌────────────┴──────────┐         │
//! │                ▼                       ▼         │
//! │      ┌──────────────────┐   ┌──────────────────┐ │
//! │      │ KeyframeRecorder │   │ RigAnimator      │ │
//! │      │ (saved at end)   │   │ (preview only)   │ │
//! │      └──────────────────┘   └──────────────────┘ │
//! └──────────────────────────────────────────────────┘
//! ```

pub mod session;
pub mod source;

pub use session::*;
pub use source::{JsonlTrackingSource, SourceFrame, StubSource, TrackingSource};
