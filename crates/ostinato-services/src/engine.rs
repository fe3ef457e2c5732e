//! Engine lifecycle and the host-facing control surface

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{info, warn};

use ostinato_core::{
    Clip, EngineConfig, EngineError, EngineSnapshot, Result, Session, TrackInfo, TrackKind,
    CHANNELS, MAX_CLIPS_PER_TRACK, MAX_PERIOD_FRAMES,
};

use crate::audio_io::RealtimeOutputStream;
use crate::decoder;

struct EngineInner {
    session: Arc<Mutex<Session>>,
    stream: RealtimeOutputStream,
    config: EngineConfig,
}

/// Handle to the mixing engine. The host holds a single instance; every
/// control operation serializes through the session lock that the render
/// callback also takes, so each period sees a consistent snapshot.
pub struct AudioEngine {
    inner: Option<EngineInner>,
}

impl Default for AudioEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioEngine {
    pub fn new() -> Self {
        Self { inner: None }
    }

    /// Open the output device and bring the engine up. Zero config fields
    /// fall back to defaults; omitting the config uses all defaults.
    pub fn init(&mut self, config: Option<EngineConfig>) -> Result<()> {
        if self.inner.is_some() {
            return Err(EngineError::AlreadyInitialized);
        }
        let config = config.unwrap_or_default().normalized();
        if config.buffer_frames as usize > MAX_PERIOD_FRAMES {
            return Err(EngineError::InvalidParam(
                "buffer_frames exceeds the period ceiling",
            ));
        }

        let session = Arc::new(Mutex::new(Session::new(&config)));
        let shared = session.clone();
        let stream = RealtimeOutputStream::open(
            config.sample_rate,
            config.buffer_frames,
            move |data| {
                let mut session = match shared.lock() {
                    Ok(guard) => guard,
                    Err(poisoned) => poisoned.into_inner(),
                };
                for period in data.chunks_mut(MAX_PERIOD_FRAMES * CHANNELS) {
                    session.render_period(period);
                }
            },
        )
        .map_err(|e| EngineError::AudioDevice(e.to_string()))?;

        info!(
            version = ostinato_core::version(),
            sample_rate = config.sample_rate,
            bpm = config.bpm,
            buffer_frames = config.buffer_frames,
            "engine initialized"
        );
        self.inner = Some(EngineInner {
            session,
            stream,
            config,
        });
        Ok(())
    }

    /// Stop the device and release every track's clip storage.
    pub fn shutdown(&mut self) -> Result<()> {
        let inner = self.inner.take().ok_or(EngineError::NotInitialized)?;
        inner.stream.stop();
        drop(inner);
        info!("engine shut down");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    pub fn config(&self) -> Result<EngineConfig> {
        Ok(self.inner()?.config.clone())
    }

    /// Most recent device fault reported by the driver, if any.
    pub fn device_fault(&self) -> Result<Option<String>> {
        Ok(self.inner()?.stream.take_fault())
    }

    pub fn state(&self) -> Result<EngineSnapshot> {
        Ok(self.session()?.snapshot())
    }

    // ── Transport ──

    pub fn play(&self) -> Result<()> {
        self.session()?.transport.play();
        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        self.session()?.transport.stop();
        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        self.session()?.transport.pause();
        Ok(())
    }

    pub fn record(&self) -> Result<()> {
        self.session()?.transport.record();
        Ok(())
    }

    pub fn seek(&self, beat: f64) -> Result<()> {
        self.session()?.transport.seek(beat)
    }

    pub fn set_bpm(&self, bpm: f64) -> Result<()> {
        self.session()?.transport.set_bpm(bpm)
    }

    pub fn set_loop(&self, enabled: bool, start_beat: f64, end_beat: f64) -> Result<()> {
        self.session()?.transport.set_loop(enabled, start_beat, end_beat)
    }

    // ── Master ──

    pub fn set_master_volume(&self, volume: f32) -> Result<()> {
        self.session()?.set_master_volume(volume)
    }

    pub fn master_peaks(&self) -> Result<(f32, f32)> {
        Ok(self.session()?.master_peaks())
    }

    // ── Tracks ──

    pub fn track_create(&self, kind: TrackKind) -> Result<u32> {
        let id = self.session()?.create_track(kind)?;
        info!(id, ?kind, "track created");
        Ok(id)
    }

    pub fn track_destroy(&self, id: u32) -> Result<()> {
        self.session()?.destroy_track(id)?;
        info!(id, "track destroyed");
        Ok(())
    }

    pub fn track_info(&self, id: u32) -> Result<TrackInfo> {
        self.session()?.track_info(id)
    }

    pub fn track_set_name(&self, id: u32, name: &str) -> Result<()> {
        self.session()?.set_track_name(id, name)
    }

    pub fn track_set_volume(&self, id: u32, volume: f32) -> Result<()> {
        self.session()?.set_track_volume(id, volume)
    }

    pub fn track_set_pan(&self, id: u32, pan: f32) -> Result<()> {
        self.session()?.set_track_pan(id, pan)
    }

    pub fn track_set_mute(&self, id: u32, muted: bool) -> Result<()> {
        self.session()?.set_track_mute(id, muted)
    }

    pub fn track_set_solo(&self, id: u32, soloed: bool) -> Result<()> {
        self.session()?.set_track_solo(id, soloed)
    }

    pub fn track_set_armed(&self, id: u32, armed: bool) -> Result<()> {
        self.session()?.set_track_armed(id, armed)
    }

    /// Load an audio file as a new clip on `id`. The decode runs with the
    /// session lock released so rendering is not stalled; the finished clip
    /// is installed under the lock, which revalidates the track.
    pub fn track_load_file(&self, id: u32, path: &Path) -> Result<()> {
        let sample_rate = {
            let session = self.session()?;
            let track = session.track(id)?;
            if track.clips.len() >= MAX_CLIPS_PER_TRACK {
                return Err(EngineError::ClipFull);
            }
            session.sample_rate()
        };

        let pcm = decoder::decode_file(path, sample_rate).map_err(|e| {
            warn!(path = %path.display(), error = %e, "clip decode failed");
            EngineError::FileNotFound(path.display().to_string())
        })?;

        let mut session = self.session()?;
        // Musical length is frozen at the BPM in effect when the clip lands.
        let len_beats =
            pcm.frames() as f64 / (f64::from(sample_rate) * 60.0 / session.transport.bpm);
        let clip = Clip::from_interleaved(&pcm.samples, 0.0, len_beats);
        session.install_clip(id, clip)?;

        info!(
            track = id,
            path = %path.display(),
            frames = pcm.frames(),
            "clip loaded"
        );
        Ok(())
    }

    fn inner(&self) -> Result<&EngineInner> {
        self.inner.as_ref().ok_or(EngineError::NotInitialized)
    }

    fn session(&self) -> Result<MutexGuard<'_, Session>> {
        let inner = self.inner()?;
        Ok(match inner.session.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        })
    }
}

impl Drop for AudioEngine {
    fn drop(&mut self) {
        let _ = self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_require_initialization() {
        let engine = AudioEngine::new();
        assert!(matches!(engine.play(), Err(EngineError::NotInitialized)));
        assert!(matches!(engine.seek(1.0), Err(EngineError::NotInitialized)));
        assert!(matches!(
            engine.track_create(TrackKind::Audio),
            Err(EngineError::NotInitialized)
        ));
        assert!(matches!(
            engine.track_load_file(1, Path::new("x.wav")),
            Err(EngineError::NotInitialized)
        ));
        assert!(matches!(engine.state(), Err(EngineError::NotInitialized)));
    }

    #[test]
    fn shutdown_without_init_is_rejected() {
        let mut engine = AudioEngine::new();
        let err = engine.shutdown().unwrap_err();
        assert!(matches!(err, EngineError::NotInitialized));
        assert_eq!(err.code(), -1);
    }

    #[test]
    fn oversized_buffer_is_rejected_before_touching_the_device() {
        let mut engine = AudioEngine::new();
        let cfg = EngineConfig {
            buffer_frames: 100_000,
            ..EngineConfig::default()
        };
        assert!(matches!(
            engine.init(Some(cfg)),
            Err(EngineError::InvalidParam(_))
        ));
        assert!(!engine.is_initialized());
    }
}
