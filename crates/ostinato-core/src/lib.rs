//! ostinato-core: Domain types and the realtime mix core

mod clip;
mod config;
mod error;
mod meter;
mod mixer;
mod session;
mod track;
mod transport;

pub use clip::Clip;
pub use config::{
    EngineConfig, DEFAULT_BIT_DEPTH, DEFAULT_BPM, DEFAULT_BUFFER_FRAMES, DEFAULT_SAMPLE_RATE,
};
pub use error::{describe, EngineError, Result};
pub use meter::{PeakMeter, PEAK_DECAY};
pub use mixer::pan_gains;
pub use session::{EngineSnapshot, Session, TrackInfo};
pub use track::{Track, TrackKind};
pub use transport::{Transport, TransportState};

/// Output channel count. Rendering is always interleaved stereo.
pub const CHANNELS: usize = 2;

/// Hard ceiling on frames rendered in one period. The render path uses
/// fixed stack buffers of this size; longer device buffers are split.
pub const MAX_PERIOD_FRAMES: usize = 2048;

/// Track slots per session.
pub const MAX_TRACKS: usize = 64;

/// Clips per track.
pub const MAX_CLIPS_PER_TRACK: usize = 128;

/// Engine name and version string.
pub fn version() -> &'static str {
    concat!("ostinato engine ", env!("CARGO_PKG_VERSION"))
}
