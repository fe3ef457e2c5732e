//! Clip decoding: WAV input, normalized to stereo f32 at the engine rate

use std::path::Path;

use hound::SampleFormat;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("could not open {path}: {reason}")]
    Open { path: String, reason: String },
    #[error("unsupported sample format: {0}")]
    Format(String),
    #[error("resample failed: {0}")]
    Resample(String),
}

/// Interleaved stereo f32 at the engine sample rate.
#[derive(Debug, Clone)]
pub struct DecodedPcm {
    pub samples: Vec<f32>,
}

impl DecodedPcm {
    pub fn frames(&self) -> usize {
        self.samples.len() / 2
    }
}

/// Decode `path` into interleaved stereo f32 at `target_rate`. Mono files
/// are duplicated to both channels; channels beyond stereo are dropped.
pub fn decode_file(path: &Path, target_rate: u32) -> Result<DecodedPcm, DecodeError> {
    let open_err = |reason: String| DecodeError::Open {
        path: path.display().to_string(),
        reason,
    };

    let mut reader = hound::WavReader::open(path).map_err(|e| open_err(e.to_string()))?;
    let spec = reader.spec();

    let raw: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| open_err(e.to_string()))?,
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .map(|s| s.map(|v| f32::from(v) / 32768.0))
            .collect::<Result<_, _>>()
            .map_err(|e| open_err(e.to_string()))?,
        (SampleFormat::Int, 24) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 8_388_608.0))
            .collect::<Result<_, _>>()
            .map_err(|e| open_err(e.to_string()))?,
        (SampleFormat::Int, 32) => reader
            .samples::<i32>()
            .map(|s| s.map(|v| v as f32 / 2_147_483_648.0))
            .collect::<Result<_, _>>()
            .map_err(|e| open_err(e.to_string()))?,
        (fmt, bits) => return Err(DecodeError::Format(format!("{fmt:?}/{bits}-bit"))),
    };

    let (mut left, mut right) = split_channels(&raw, spec.channels as usize);
    if left.is_empty() {
        return Err(DecodeError::Format("no audio frames".into()));
    }

    if spec.sample_rate != target_rate {
        (left, right) = resample_stereo(&left, &right, spec.sample_rate, target_rate)?;
    }

    debug!(
        path = %path.display(),
        frames = left.len(),
        rate = target_rate,
        "decoded clip"
    );

    let mut samples = Vec::with_capacity(left.len() * 2);
    for (l, r) in left.iter().zip(&right) {
        samples.push(*l);
        samples.push(*r);
    }
    Ok(DecodedPcm { samples })
}

fn split_channels(samples: &[f32], channels: usize) -> (Vec<f32>, Vec<f32>) {
    match channels {
        0 => (Vec::new(), Vec::new()),
        1 => (samples.to_vec(), samples.to_vec()),
        n => {
            let frames = samples.len() / n;
            let mut left = Vec::with_capacity(frames);
            let mut right = Vec::with_capacity(frames);
            for frame in samples.chunks_exact(n) {
                left.push(frame[0]);
                right.push(frame[1]);
            }
            (left, right)
        }
    }
}

fn resample_stereo(
    left: &[f32],
    right: &[f32],
    from_rate: u32,
    to_rate: u32,
) -> Result<(Vec<f32>, Vec<f32>), DecodeError> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    let mut resampler = SincFixedIn::<f32>::new(
        f64::from(to_rate) / f64::from(from_rate),
        2.0,
        params,
        left.len(),
        2,
    )
    .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let input = vec![left.to_vec(), right.to_vec()];
    let mut output = resampler
        .process(&input, None)
        .map_err(|e| DecodeError::Resample(e.to_string()))?;

    let right = output.pop().unwrap_or_default();
    let left = output.pop().unwrap_or_default();
    Ok((left, right))
}
