//! Error types for ostinato

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine not initialized")]
    NotInitialized,
    #[error("engine already initialized")]
    AlreadyInitialized,
    #[error("audio device failure: {0}")]
    AudioDevice(String),
    #[error("no track with id {0}")]
    InvalidTrack(u32),
    #[error("could not open or decode {0}")]
    FileNotFound(String),
    #[error("track slots exhausted")]
    OutOfMemory,
    #[error("invalid parameter: {0}")]
    InvalidParam(&'static str),
    #[error("clip list full")]
    ClipFull,
}

impl EngineError {
    /// Stable numeric result code for host bindings. Success is `0`.
    pub fn code(&self) -> i32 {
        match self {
            Self::NotInitialized => -1,
            Self::AlreadyInitialized => -2,
            Self::AudioDevice(_) => -3,
            Self::InvalidTrack(_) => -4,
            Self::FileNotFound(_) => -5,
            Self::OutOfMemory => -6,
            Self::InvalidParam(_) => -7,
            Self::ClipFull => -8,
        }
    }
}

/// Human-readable description of a numeric result code.
pub fn describe(code: i32) -> &'static str {
    match code {
        0 => "ok",
        -1 => "engine not initialized",
        -2 => "engine already initialized",
        -3 => "audio device failure",
        -4 => "invalid track",
        -5 => "file not found",
        -6 => "out of memory",
        -7 => "invalid parameter",
        -8 => "clip list full",
        _ => "unknown error",
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(EngineError::NotInitialized.code(), -1);
        assert_eq!(EngineError::AlreadyInitialized.code(), -2);
        assert_eq!(EngineError::AudioDevice(String::new()).code(), -3);
        assert_eq!(EngineError::InvalidTrack(7).code(), -4);
        assert_eq!(EngineError::FileNotFound(String::new()).code(), -5);
        assert_eq!(EngineError::OutOfMemory.code(), -6);
        assert_eq!(EngineError::InvalidParam("x").code(), -7);
        assert_eq!(EngineError::ClipFull.code(), -8);
    }

    #[test]
    fn describe_covers_every_code() {
        assert_eq!(describe(0), "ok");
        for code in -8..=-1 {
            assert_ne!(describe(code), "unknown error");
        }
        assert_eq!(describe(-99), "unknown error");
    }
}
