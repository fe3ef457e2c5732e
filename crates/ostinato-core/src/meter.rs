//! Exponential-decay peak metering

use serde::{Deserialize, Serialize};

/// Decay applied per sample when the input does not exceed the held peak.
pub const PEAK_DECAY: f32 = 0.9997;

/// Stereo peak meter. Rises instantly, decays exponentially.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PeakMeter {
    left: f32,
    right: f32,
}

impl PeakMeter {
    pub fn update(&mut self, l: f32, r: f32) {
        Self::follow(&mut self.left, l);
        Self::follow(&mut self.right, r);
    }

    fn follow(peak: &mut f32, sample: f32) {
        let a = sample.abs();
        if a > *peak {
            *peak = a;
        } else {
            *peak *= PEAK_DECAY;
        }
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn right(&self) -> f32 {
        self.right
    }
}
