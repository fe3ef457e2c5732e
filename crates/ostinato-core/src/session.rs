//! Session state: tracks, transport, master bus

use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::config::EngineConfig;
use crate::error::{EngineError, Result};
use crate::meter::PeakMeter;
use crate::track::{Track, TrackKind};
use crate::transport::{Transport, TransportState};
use crate::{MAX_CLIPS_PER_TRACK, MAX_TRACKS};

const MAX_NAME_LEN: usize = 63;

/// Everything the audio callback reads and the control surface mutates.
/// Guarded by a single engine-wide mutex in the service layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub transport: Transport,
    pub(crate) tracks: Vec<Track>,
    next_track_id: u32,
    pub(crate) any_solo: bool,
    pub(crate) master_volume: f32,
    pub(crate) master_peaks: PeakMeter,
    pub(crate) sample_rate: u32,
    bit_depth: u16,
    buffer_frames: u32,
}

impl Session {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            transport: Transport::new(config.bpm),
            tracks: Vec::new(),
            next_track_id: 1,
            any_solo: false,
            master_volume: 1.0,
            master_peaks: PeakMeter::default(),
            sample_rate: config.sample_rate,
            bit_depth: config.bit_depth,
            buffer_frames: config.buffer_frames,
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn buffer_frames(&self) -> u32 {
        self.buffer_frames
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn any_solo(&self) -> bool {
        self.any_solo
    }

    /// Create a track of the given kind. Ids are session-monotonic and never
    /// reused after a destroy.
    pub fn create_track(&mut self, kind: TrackKind) -> Result<u32> {
        if self.tracks.len() >= MAX_TRACKS {
            return Err(EngineError::OutOfMemory);
        }
        let id = self.next_track_id;
        self.next_track_id += 1;
        let name = format!("{} {}", kind.label(), self.tracks.len() + 1);
        self.tracks.push(Track::new(id, kind, name));
        Ok(id)
    }

    /// Destroy a track, releasing its clips with it.
    pub fn destroy_track(&mut self, id: u32) -> Result<()> {
        let pos = self
            .tracks
            .iter()
            .position(|t| t.id == id)
            .ok_or(EngineError::InvalidTrack(id))?;
        self.tracks.remove(pos);
        self.refresh_solo();
        Ok(())
    }

    pub fn track(&self, id: u32) -> Result<&Track> {
        self.tracks
            .iter()
            .find(|t| t.id == id)
            .ok_or(EngineError::InvalidTrack(id))
    }

    pub(crate) fn track_mut(&mut self, id: u32) -> Result<&mut Track> {
        self.tracks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(EngineError::InvalidTrack(id))
    }

    pub fn set_track_name(&mut self, id: u32, name: &str) -> Result<()> {
        self.track_mut(id)?.name = clamp_name(name);
        Ok(())
    }

    pub fn set_track_volume(&mut self, id: u32, volume: f32) -> Result<()> {
        self.track_mut(id)?.volume = volume.clamp(0.0, 2.0);
        Ok(())
    }

    pub fn set_track_pan(&mut self, id: u32, pan: f32) -> Result<()> {
        self.track_mut(id)?.pan = pan.clamp(-1.0, 1.0);
        Ok(())
    }

    pub fn set_track_mute(&mut self, id: u32, muted: bool) -> Result<()> {
        self.track_mut(id)?.muted = muted;
        Ok(())
    }

    pub fn set_track_solo(&mut self, id: u32, soloed: bool) -> Result<()> {
        self.track_mut(id)?.soloed = soloed;
        self.refresh_solo();
        Ok(())
    }

    pub fn set_track_armed(&mut self, id: u32, armed: bool) -> Result<()> {
        self.track_mut(id)?.armed = armed;
        Ok(())
    }

    pub fn track_info(&self, id: u32) -> Result<TrackInfo> {
        let t = self.track(id)?;
        Ok(TrackInfo {
            id: t.id,
            kind: t.kind,
            name: t.name.clone(),
            volume: t.volume,
            pan: t.pan,
            muted: t.muted,
            soloed: t.soloed,
            armed: t.armed,
            peak_l: t.peak_l,
            peak_r: t.peak_r,
            clip_count: t.clips.len() as u32,
        })
    }

    /// Attach a finished clip to a track. The clip list is bounded.
    pub fn install_clip(&mut self, id: u32, clip: Clip) -> Result<()> {
        let track = self.track_mut(id)?;
        if track.clips.len() >= MAX_CLIPS_PER_TRACK {
            return Err(EngineError::ClipFull);
        }
        track.clips.push(clip);
        Ok(())
    }

    /// Master volume is range-checked, not clamped.
    pub fn set_master_volume(&mut self, volume: f32) -> Result<()> {
        if !(0.0..=2.0).contains(&volume) {
            return Err(EngineError::InvalidParam("master volume must be in [0, 2]"));
        }
        self.master_volume = volume;
        Ok(())
    }

    pub fn master_volume(&self) -> f32 {
        self.master_volume
    }

    pub fn master_peaks(&self) -> (f32, f32) {
        (self.master_peaks.left(), self.master_peaks.right())
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let t = &self.transport;
        EngineSnapshot {
            transport: t.state,
            bpm: t.bpm,
            sample_rate: self.sample_rate,
            bit_depth: self.bit_depth,
            position_beats: t.pos_beats,
            position_seconds: t.pos_secs,
            bar: (t.pos_beats / 4.0) as u32 + 1,
            beat: (t.pos_beats % 4.0) as u32 + 1,
            master_volume: self.master_volume,
            master_peak_l: self.master_peaks.left(),
            master_peak_r: self.master_peaks.right(),
            track_count: self.tracks.len() as u32,
            loop_enabled: t.loop_enabled,
            loop_start_beat: t.loop_start_beat,
            loop_end_beat: t.loop_end_beat,
        }
    }

    fn refresh_solo(&mut self) {
        self.any_solo = self.tracks.iter().any(|t| t.soloed);
    }
}

/// Point-in-time view of the whole engine, taken under the lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub transport: TransportState,
    pub bpm: f64,
    pub sample_rate: u32,
    pub bit_depth: u16,
    pub position_beats: f64,
    pub position_seconds: f64,
    /// 1-based bar number, 4/4 assumed
    pub bar: u32,
    /// 1-based beat within the bar
    pub beat: u32,
    pub master_volume: f32,
    pub master_peak_l: f32,
    pub master_peak_r: f32,
    pub track_count: u32,
    pub loop_enabled: bool,
    pub loop_start_beat: f64,
    pub loop_end_beat: f64,
}

/// Point-in-time view of one track.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackInfo {
    pub id: u32,
    pub kind: TrackKind,
    pub name: String,
    pub volume: f32,
    pub pan: f32,
    pub muted: bool,
    pub soloed: bool,
    pub armed: bool,
    pub peak_l: f32,
    pub peak_r: f32,
    pub clip_count: u32,
}

fn clamp_name(name: &str) -> String {
    if name.len() <= MAX_NAME_LEN {
        return name.to_string();
    }
    let mut end = MAX_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    name[..end].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&EngineConfig::default())
    }

    fn tiny_clip() -> Clip {
        Clip::new(vec![0.0], vec![0.0], 0.0, 1.0)
    }

    #[test]
    fn track_ids_are_never_reused() {
        let mut s = session();
        let mut ids = Vec::new();
        for _ in 0..MAX_TRACKS {
            ids.push(s.create_track(TrackKind::Audio).unwrap());
        }
        assert!(matches!(
            s.create_track(TrackKind::Audio),
            Err(EngineError::OutOfMemory)
        ));

        s.destroy_track(ids[10]).unwrap();
        let id = s.create_track(TrackKind::Midi).unwrap();
        assert_eq!(id, 65);
        assert!(!ids.contains(&id));
        assert_eq!(s.track_count(), MAX_TRACKS);
    }

    #[test]
    fn live_track_ids_are_unique() {
        let mut s = session();
        let a = s.create_track(TrackKind::Audio).unwrap();
        let b = s.create_track(TrackKind::Audio).unwrap();
        s.destroy_track(a).unwrap();
        let c = s.create_track(TrackKind::Bus).unwrap();
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn default_names_use_kind_and_position() {
        let mut s = session();
        let a = s.create_track(TrackKind::Audio).unwrap();
        let b = s.create_track(TrackKind::Midi).unwrap();
        let c = s.create_track(TrackKind::Bus).unwrap();
        assert_eq!(s.track(a).unwrap().name, "Audio 1");
        assert_eq!(s.track(b).unwrap().name, "MIDI 2");
        assert_eq!(s.track(c).unwrap().name, "Bus 3");
    }

    #[test]
    fn names_are_truncated_to_63_bytes() {
        let mut s = session();
        let id = s.create_track(TrackKind::Audio).unwrap();
        let long = "x".repeat(100);
        s.set_track_name(id, &long).unwrap();
        assert_eq!(s.track(id).unwrap().name.len(), 63);

        s.set_track_name(id, "Drums").unwrap();
        assert_eq!(s.track(id).unwrap().name, "Drums");
    }

    #[test]
    fn volume_and_pan_are_clamped() {
        let mut s = session();
        let id = s.create_track(TrackKind::Audio).unwrap();
        s.set_track_volume(id, 5.0).unwrap();
        s.set_track_pan(id, -3.0).unwrap();
        let info = s.track_info(id).unwrap();
        assert_eq!(info.volume, 2.0);
        assert_eq!(info.pan, -1.0);
    }

    #[test]
    fn solo_cache_follows_solo_and_destroy() {
        let mut s = session();
        let a = s.create_track(TrackKind::Audio).unwrap();
        let b = s.create_track(TrackKind::Audio).unwrap();
        assert!(!s.any_solo());

        s.set_track_solo(b, true).unwrap();
        assert!(s.any_solo());

        s.set_track_solo(b, false).unwrap();
        assert!(!s.any_solo());

        s.set_track_solo(a, true).unwrap();
        s.destroy_track(a).unwrap();
        assert!(!s.any_solo());
    }

    #[test]
    fn clip_capacity_is_bounded() {
        let mut s = session();
        let id = s.create_track(TrackKind::Audio).unwrap();
        for _ in 0..MAX_CLIPS_PER_TRACK {
            s.install_clip(id, tiny_clip()).unwrap();
        }
        assert!(matches!(
            s.install_clip(id, tiny_clip()),
            Err(EngineError::ClipFull)
        ));
        assert_eq!(s.track_info(id).unwrap().clip_count, 128);
    }

    #[test]
    fn destroying_a_track_releases_its_clips() {
        let mut s = session();
        let id = s.create_track(TrackKind::Audio).unwrap();
        s.install_clip(id, tiny_clip()).unwrap();
        s.destroy_track(id).unwrap();
        assert!(matches!(s.track(id), Err(EngineError::InvalidTrack(_))));
        assert_eq!(s.track_count(), 0);
    }

    #[test]
    fn master_volume_is_validated_not_clamped() {
        let mut s = session();
        assert!(matches!(
            s.set_master_volume(3.0),
            Err(EngineError::InvalidParam(_))
        ));
        assert!(s.set_master_volume(-0.1).is_err());
        s.set_master_volume(1.5).unwrap();
        assert_eq!(s.master_volume(), 1.5);
    }

    #[test]
    fn unknown_track_is_an_error() {
        let mut s = session();
        let err = s.destroy_track(42).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTrack(42)));
        assert_eq!(err.code(), -4);
    }

    #[test]
    fn snapshot_reports_bar_and_beat() {
        let mut s = session();
        s.transport.seek(9.5).unwrap();
        let snap = s.snapshot();
        assert_eq!(snap.bar, 3);
        assert_eq!(snap.beat, 2);
        assert_eq!(snap.bpm, 120.0);
        assert_eq!(snap.sample_rate, 44_100);
        assert_eq!(snap.track_count, 0);
        assert!(!snap.loop_enabled);
    }
}
