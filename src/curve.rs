use serde::{Deserialize, Serialize};

use crate::math::lerp;

/// Piecewise-linear interpolation curve over `(t, value)` keyframes.
///
/// Used by the tectonic simulation to shape how elevation falls off from
/// plate boundaries into plate interiors. Evaluation clamps outside the key
/// range, so a curve whose values lie in `[0, 1]` always yields a valid
/// blend factor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Curve {
    keys: Vec<(f32, f32)>,
}

impl Curve {
    /// Builds a curve from keyframes, sorting them by `t`.
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self { keys }
    }

    /// The identity ramp from (0, 0) to (1, 1).
    pub fn linear() -> Self {
        Self::new(vec![(0.0, 0.0), (1.0, 1.0)])
    }

    /// Default falloff for oceanic plates sinking under continental
    /// neighbors: the boundary trench dominates for a while, then elevation
    /// climbs steeply toward the plate's desired depth.
    pub fn oceanic_subduction() -> Self {
        Self::new(vec![(0.0, 0.0), (0.4, 0.15), (0.7, 0.6), (1.0, 1.0)])
    }

    /// Default falloff for continental plates overriding oceanic neighbors:
    /// the interior reaches its plateau close to the boundary.
    pub fn continental_subduction() -> Self {
        Self::new(vec![(0.0, 0.0), (0.3, 0.65), (1.0, 1.0)])
    }

    /// Evaluates the curve at `t`, clamping to the first/last key outside
    /// the keyed range.
    pub fn evaluate(&self, t: f32) -> f32 {
        let (&(first_t, first_value), &(last_t, last_value)) =
            match (self.keys.first(), self.keys.last()) {
                (Some(first), Some(last)) => (first, last),
                _ => return 0.0,
            };
        if t <= first_t {
            return first_value;
        }
        if t >= last_t {
            return last_value;
        }
        for window in self.keys.windows(2) {
            let (t0, v0) = window[0];
            let (t1, v1) = window[1];
            if t <= t1 {
                if t1 == t0 {
                    return v1;
                }
                return lerp(v0, v1, (t - t0) / (t1 - t0));
            }
        }
        last_value
    }
}
