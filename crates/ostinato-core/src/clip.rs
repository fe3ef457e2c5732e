//! Audio clip: owned PCM positioned on the beat timeline

use serde::{Deserialize, Serialize};

/// A scheduled audio region. The PCM is immutable once the clip is attached
/// to a track; `len_beats` is a stretch target, not the recorded duration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clip {
    /// Left channel samples
    #[serde(skip)]
    left: Vec<f32>,
    /// Right channel samples (same length as left)
    #[serde(skip)]
    right: Vec<f32>,
    /// Timeline position in beats
    pub start_beat: f64,
    /// Musical length in beats; playback scales sample indices across it
    pub len_beats: f64,
    pub active: bool,
}

impl Clip {
    /// Build a clip from per-channel PCM.
    ///
    /// Panics if the channel lengths differ; the render path indexes both
    /// channels by the same frame count.
    pub fn new(left: Vec<f32>, right: Vec<f32>, start_beat: f64, len_beats: f64) -> Self {
        assert_eq!(left.len(), right.len(), "clip channel lengths differ");
        Self {
            left,
            right,
            start_beat,
            len_beats,
            active: true,
        }
    }

    /// Split an interleaved stereo buffer into an owned clip.
    pub fn from_interleaved(samples: &[f32], start_beat: f64, len_beats: f64) -> Self {
        let frames = samples.len() / 2;
        let mut left = Vec::with_capacity(frames);
        let mut right = Vec::with_capacity(frames);
        for frame in samples.chunks_exact(2) {
            left.push(frame[0]);
            right.push(frame[1]);
        }
        Self::new(left, right, start_beat, len_beats)
    }

    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn left(&self) -> &[f32] {
        &self.left
    }

    pub fn right(&self) -> &[f32] {
        &self.right
    }

    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.len_beats
    }
}
