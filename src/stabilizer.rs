//! Temporal smoothing of the per-frame gesture stream.

use crate::types::{Gesture, StabilizedSignal};

/// Hold-last-valid filter over classifier output.
///
/// A confident gesture replaces the signal immediately and zeroes the miss
/// counter. Absent or unconfident frames increment the counter; the previous
/// gesture is held until the counter reaches the tolerance window, after
/// which the signal degrades to `Gesture::None`. Single dropped frames
/// therefore never reset game state.
pub struct Stabilizer {
    signal: Gesture,
    misses: u32,
    tolerance: u32,
}

impl Stabilizer {
    /// `tolerance` is in frames, calibrated to roughly one second at the
    /// expected capture rate (30 at 30 fps).
    pub fn new(tolerance: u32) -> Self {
        Self {
            signal: Gesture::None,
            misses: 0,
            tolerance,
        }
    }

    /// Feed one frame's classification, or `None` when no hand was visible.
    pub fn update(&mut self, observed: Option<Gesture>) -> StabilizedSignal {
        match observed {
            Some(gesture) if gesture != Gesture::None => {
                self.signal = gesture;
                self.misses = 0;
            }
            _ => {
                self.misses = self.misses.saturating_add(1);
                if self.misses >= self.tolerance {
                    self.signal = Gesture::None;
                }
            }
        }
        self.signal_now()
    }

    pub fn signal_now(&self) -> StabilizedSignal {
        StabilizedSignal {
            gesture: self.signal,
            misses: self.misses,
        }
    }

    pub fn reset(&mut self) {
        self.signal = Gesture::None;
        self.misses = 0;
    }
}
