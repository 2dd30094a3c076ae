//! Frame-to-frame smoothing of control signals.
//!
//! Landmark distances jitter by a pixel or two between frames even on a
//! still face. The smoother damps head rotation and blendshape values with
//! an exponential moving average; translation and expression pass through.

use std::collections::BTreeMap;

use facerig_signal_model::signal::{ControlSignal, HeadRotation};

/// Exponential smoother over a stream of control signals.
#[derive(Debug, Clone)]
pub struct SignalSmoother {
    alpha: f64,
    head: Option<HeadRotation>,
    blendshapes: BTreeMap<String, f64>,
}

impl SignalSmoother {
    /// `strength` in `[0.0, 1.0]`; larger values mean more smoothing.
    /// Out-of-range values are clamped.
    pub fn new(strength: f64) -> Self {
        Self {
            alpha: (1.0 - strength.clamp(0.0, 1.0)).clamp(0.0, 1.0),
            head: None,
            blendshapes: BTreeMap::new(),
        }
    }

    /// Whether this smoother leaves signals untouched.
    pub fn is_passthrough(&self) -> bool {
        self.alpha >= 1.0
    }

    /// Smooth the next frame.
    ///
    /// The first frame passes through unchanged. A feature that appears for
    /// the first time starts from its own value.
    pub fn smooth(&mut self, signal: &ControlSignal) -> ControlSignal {
        let alpha = self.alpha;
        let blend = |current: f64, previous: f64| alpha * current + (1.0 - alpha) * previous;

        let head = match self.head {
            Some(prev) => HeadRotation::new(
                blend(signal.head_rotation.x, prev.x),
                blend(signal.head_rotation.y, prev.y),
                blend(signal.head_rotation.z, prev.z),
            ),
            None => signal.head_rotation,
        };
        self.head = Some(head);

        let mut blendshapes = BTreeMap::new();
        for (name, &value) in &signal.blendshapes {
            let smoothed = match self.blendshapes.get(name) {
                Some(&prev) => blend(value, prev),
                None => value,
            };
            self.blendshapes.insert(name.clone(), smoothed);
            blendshapes.insert(name.clone(), smoothed);
        }

        ControlSignal {
            head_rotation: head,
            blendshapes,
            translation: signal.translation.clone(),
            expression: signal.expression.clone(),
        }
    }

    /// Forget all history.
    pub fn reset(&mut self) {
        self.head = None;
        self.blendshapes.clear();
    }
}
