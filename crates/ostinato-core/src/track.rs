//! Track representation

use serde::{Deserialize, Serialize};

use crate::clip::Clip;

/// Track type tag. Only the tag differs; the mixer treats all kinds alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackKind {
    Audio,
    Midi,
    Bus,
    Master,
}

impl TrackKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Audio => "Audio",
            Self::Midi => "MIDI",
            Self::Bus => "Bus",
            Self::Master => "Master",
        }
    }
}

/// A named channel strip owning its clips and mixing parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    pub id: u32,
    pub kind: TrackKind,
    pub name: String,
    /// Volume (0.0 to 2.0)
    pub volume: f32,
    /// Pan (-1.0 left, 0.0 center, 1.0 right)
    pub pan: f32,
    pub muted: bool,
    pub soloed: bool,
    /// Armed for recording
    pub armed: bool,
    /// Peak of the last rendered period, post gain
    pub peak_l: f32,
    pub peak_r: f32,
    #[serde(skip)]
    pub clips: Vec<Clip>,
}

impl Track {
    pub fn new(id: u32, kind: TrackKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            volume: 1.0,
            pan: 0.0,
            muted: false,
            soloed: false,
            armed: false,
            peak_l: 0.0,
            peak_r: 0.0,
            clips: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_track_has_unity_defaults() {
        let t = Track::new(1, TrackKind::Audio, "Audio 1");
        assert_eq!(t.volume, 1.0);
        assert_eq!(t.pan, 0.0);
        assert!(!t.muted && !t.soloed && !t.armed);
        assert!(t.clips.is_empty());
    }

    #[test]
    fn kind_labels_match_display_names() {
        assert_eq!(TrackKind::Audio.label(), "Audio");
        assert_eq!(TrackKind::Midi.label(), "MIDI");
        assert_eq!(TrackKind::Bus.label(), "Bus");
        assert_eq!(TrackKind::Master.label(), "Master");
    }
}
