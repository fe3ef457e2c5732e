//! ostinato-services: Device binding, clip decoding, and the engine control surface

pub mod audio_io;
pub mod decoder;
pub mod engine;

pub use audio_io::{AudioOutputError, RealtimeOutputStream};
pub use decoder::{decode_file, DecodeError, DecodedPcm};
pub use engine::AudioEngine;
