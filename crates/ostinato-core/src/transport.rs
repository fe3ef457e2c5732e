//! Transport state and controls

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Transport playback state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransportState {
    #[default]
    Stopped,
    Playing,
    Recording,
    Paused,
}

/// Musical playhead and tempo. Positions are kept in beats; seconds are
/// derived and re-derived as the engine advances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transport {
    pub state: TransportState,
    /// Tempo in BPM
    pub bpm: f64,
    /// Playhead in beats
    pub pos_beats: f64,
    /// Playhead in seconds
    pub pos_secs: f64,
    pub loop_enabled: bool,
    pub loop_start_beat: f64,
    pub loop_end_beat: f64,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            state: TransportState::Stopped,
            bpm: 120.0,
            pos_beats: 0.0,
            pos_secs: 0.0,
            loop_enabled: false,
            loop_start_beat: 0.0,
            loop_end_beat: 0.0,
        }
    }
}

impl Transport {
    pub fn new(bpm: f64) -> Self {
        Self {
            bpm,
            ..Default::default()
        }
    }

    /// Start playing. The playhead is left where it is.
    pub fn play(&mut self) {
        self.state = TransportState::Playing;
    }

    pub fn record(&mut self) {
        self.state = TransportState::Recording;
    }

    /// Stop and rewind to the origin. Idempotent.
    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
        self.pos_beats = 0.0;
        self.pos_secs = 0.0;
    }

    /// Pause playback. Only `Playing` pauses; other states are untouched.
    pub fn pause(&mut self) {
        if self.state == TransportState::Playing {
            self.state = TransportState::Paused;
        }
    }

    /// Move the playhead without changing state.
    pub fn seek(&mut self, beat: f64) -> Result<()> {
        if !beat.is_finite() || beat < 0.0 {
            return Err(EngineError::InvalidParam("seek position must be >= 0 beats"));
        }
        self.pos_beats = beat;
        self.pos_secs = beat * self.seconds_per_beat();
        Ok(())
    }

    /// Change the tempo. The musical position is invariant under a tempo
    /// change; `pos_secs` re-derives on the next advance.
    pub fn set_bpm(&mut self, bpm: f64) -> Result<()> {
        if !bpm.is_finite() || bpm <= 0.0 || bpm > 999.0 {
            return Err(EngineError::InvalidParam("bpm must be in (0, 999]"));
        }
        self.bpm = bpm;
        Ok(())
    }

    /// Set the loop region. The range must be ordered even when disabling.
    pub fn set_loop(&mut self, enabled: bool, start_beat: f64, end_beat: f64) -> Result<()> {
        if !(start_beat < end_beat) {
            return Err(EngineError::InvalidParam("loop start must precede loop end"));
        }
        self.loop_enabled = enabled;
        self.loop_start_beat = start_beat;
        self.loop_end_beat = end_beat;
        Ok(())
    }

    pub fn is_rolling(&self) -> bool {
        matches!(self.state, TransportState::Playing | TransportState::Recording)
    }

    pub fn seconds_per_beat(&self) -> f64 {
        60.0 / self.bpm
    }

    /// Advance the playhead by one rendered period, snapping back to the
    /// loop start when the region end is crossed.
    pub(crate) fn advance(&mut self, frames: u32, sample_rate: u32) {
        let delta_secs = f64::from(frames) / f64::from(sample_rate);
        self.pos_secs += delta_secs;
        self.pos_beats += delta_secs / self.seconds_per_beat();

        if self.loop_enabled && self.pos_beats >= self.loop_end_beat {
            self.pos_beats = self.loop_start_beat;
            self.pos_secs = self.loop_start_beat * self.seconds_per_beat();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stop_resets_playhead() {
        let mut t = Transport::new(120.0);
        t.play();
        t.seek(10.0).unwrap();
        t.stop();
        assert_eq!(t.state, TransportState::Stopped);
        assert_eq!(t.pos_beats, 0.0);
        assert_eq!(t.pos_secs, 0.0);
        t.stop();
        assert_eq!(t.state, TransportState::Stopped);
    }

    #[test]
    fn pause_only_applies_while_playing() {
        let mut t = Transport::new(120.0);
        t.pause();
        assert_eq!(t.state, TransportState::Stopped);
        t.record();
        t.pause();
        assert_eq!(t.state, TransportState::Recording);
        t.play();
        t.pause();
        assert_eq!(t.state, TransportState::Paused);
        t.pause();
        assert_eq!(t.state, TransportState::Paused);
    }

    #[test]
    fn play_resumes_from_any_state() {
        let mut t = Transport::new(120.0);
        t.record();
        t.play();
        assert_eq!(t.state, TransportState::Playing);
        t.pause();
        t.play();
        assert_eq!(t.state, TransportState::Playing);
    }

    #[test]
    fn seek_rejects_negative_positions() {
        let mut t = Transport::new(120.0);
        assert!(matches!(t.seek(-0.5), Err(EngineError::InvalidParam(_))));
        t.seek(8.0).unwrap();
        assert_eq!(t.pos_beats, 8.0);
        assert_eq!(t.pos_secs, 4.0); // 8 beats at 120 bpm
    }

    #[test]
    fn seek_keeps_transport_state() {
        let mut t = Transport::new(120.0);
        t.play();
        t.seek(3.0).unwrap();
        assert_eq!(t.state, TransportState::Playing);
    }

    #[test]
    fn bpm_range_is_validated() {
        let mut t = Transport::new(120.0);
        assert!(t.set_bpm(0.0).is_err());
        assert!(t.set_bpm(-10.0).is_err());
        assert!(t.set_bpm(1000.0).is_err());
        t.set_bpm(500.0).unwrap();
        assert_eq!(t.bpm, 500.0);
    }

    #[test]
    fn tempo_change_keeps_musical_position() {
        let mut t = Transport::new(120.0);
        t.seek(4.0).unwrap();
        t.set_bpm(60.0).unwrap();
        assert_eq!(t.pos_beats, 4.0);
    }

    #[test]
    fn loop_range_must_be_ordered() {
        let mut t = Transport::new(120.0);
        assert!(t.set_loop(true, 5.0, 5.0).is_err());
        assert!(t.set_loop(false, 2.0, 1.0).is_err());
        t.set_loop(true, 1.0, 5.0).unwrap();
        assert!(t.loop_enabled);
        assert_eq!(t.loop_start_beat, 1.0);
        assert_eq!(t.loop_end_beat, 5.0);
    }

    #[test]
    fn advance_snaps_to_loop_start() {
        let mut t = Transport::new(60.0); // 1 beat per second
        t.set_loop(true, 1.0, 2.0).unwrap();
        t.play();
        t.seek(1.9).unwrap();
        t.advance(200, 1000); // +0.2 beats, crosses the loop end
        assert_eq!(t.pos_beats, 1.0);
        assert_eq!(t.pos_secs, 1.0);
    }

    #[test]
    fn advance_without_loop_accumulates() {
        let mut t = Transport::new(120.0);
        t.play();
        t.advance(22_050, 44_100); // half a second = one beat at 120 bpm
        assert!((t.pos_beats - 1.0).abs() < 1e-12);
        assert!((t.pos_secs - 0.5).abs() < 1e-12);
    }
}
