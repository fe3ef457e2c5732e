//! Engine configuration

use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;
pub const DEFAULT_BIT_DEPTH: u16 = 24;
pub const DEFAULT_BUFFER_FRAMES: u32 = 512;
pub const DEFAULT_BPM: f64 = 120.0;

/// Engine boot parameters. Zero fields mean "use the default".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub sample_rate: u32,
    /// Informational only; rendering is always f32
    pub bit_depth: u16,
    /// Requested device period in frames
    pub buffer_frames: u32,
    pub bpm: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            bit_depth: DEFAULT_BIT_DEPTH,
            buffer_frames: DEFAULT_BUFFER_FRAMES,
            bpm: DEFAULT_BPM,
        }
    }
}

impl EngineConfig {
    /// Replace zero/unset fields with the engine defaults.
    pub fn normalized(&self) -> Self {
        Self {
            sample_rate: if self.sample_rate == 0 {
                DEFAULT_SAMPLE_RATE
            } else {
                self.sample_rate
            },
            bit_depth: if self.bit_depth == 0 {
                DEFAULT_BIT_DEPTH
            } else {
                self.bit_depth
            },
            buffer_frames: if self.buffer_frames == 0 {
                DEFAULT_BUFFER_FRAMES
            } else {
                self.buffer_frames
            },
            bpm: if self.bpm > 0.0 { self.bpm } else { DEFAULT_BPM },
        }
    }
}
