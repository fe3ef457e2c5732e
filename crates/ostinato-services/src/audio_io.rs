//! Realtime audio output on the default cpal host

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig};
use crossbeam_channel::{bounded, Receiver};
use thiserror::Error;
use tracing::{error, info};

use ostinato_core::CHANNELS;

#[derive(Debug, Error)]
pub enum AudioOutputError {
    #[error("no audio output devices found")]
    NoDevices,
    #[error("failed to build output stream: {0}")]
    Stream(String),
    #[error("failed to start output stream: {0}")]
    Playback(String),
}

/// Handle to a running playback stream. Dropping it silences and releases
/// the device.
pub struct RealtimeOutputStream {
    stop_flag: Arc<AtomicBool>,
    fault_rx: Receiver<String>,
    _stream: cpal::Stream,
}

impl RealtimeOutputStream {
    /// Open the default output device in stereo f32 at `sample_rate` with a
    /// fixed period of `buffer_frames`, pulling each period from `render`.
    pub fn open<F>(
        sample_rate: u32,
        buffer_frames: u32,
        mut render: F,
    ) -> Result<Self, AudioOutputError>
    where
        F: FnMut(&mut [f32]) + Send + 'static,
    {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioOutputError::NoDevices)?;

        let config = StreamConfig {
            channels: CHANNELS as u16,
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Fixed(buffer_frames),
        };

        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop = stop_flag.clone();
        let (fault_tx, fault_rx) = bounded(1);

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    if stop.load(Ordering::SeqCst) {
                        data.fill(0.0);
                        return;
                    }
                    render(data);
                },
                move |err| {
                    error!("output stream error: {err}");
                    let _ = fault_tx.try_send(err.to_string());
                },
                None,
            )
            .map_err(|e| AudioOutputError::Stream(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioOutputError::Playback(e.to_string()))?;

        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate,
            buffer_frames,
            "output stream started"
        );

        Ok(Self {
            stop_flag,
            fault_rx,
            _stream: stream,
        })
    }

    /// Most recent fault reported by the driver, if any.
    pub fn take_fault(&self) -> Option<String> {
        self.fault_rx.try_recv().ok()
    }

    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

impl Drop for RealtimeOutputStream {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}
