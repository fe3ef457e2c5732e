//! Per-period render: tracks, clips, frames

use crate::meter::PeakMeter;
use crate::session::Session;
use crate::{CHANNELS, MAX_PERIOD_FRAMES};

/// Constant-power pan law. `pan` in [-1, +1] maps onto a quarter circle so
/// that gl^2 + gr^2 == 1 across the range.
pub fn pan_gains(pan: f32) -> (f32, f32) {
    let a = (pan + 1.0) * std::f32::consts::FRAC_PI_4;
    (a.cos(), a.sin())
}

impl Session {
    /// Render one device period into `out` (interleaved stereo f32).
    ///
    /// Every sample of `out` is written. Frames beyond [`MAX_PERIOD_FRAMES`]
    /// stay silent; callers split longer buffers. This path never allocates.
    pub fn render_period(&mut self, out: &mut [f32]) {
        out.fill(0.0);
        if !self.transport.is_rolling() {
            return;
        }
        let nf = (out.len() / CHANNELS).min(MAX_PERIOD_FRAMES);
        if nf == 0 {
            return;
        }

        let mut mix_l = [0.0f32; MAX_PERIOD_FRAMES];
        let mut mix_r = [0.0f32; MAX_PERIOD_FRAMES];

        let spb = self.transport.seconds_per_beat();
        let spf = 1.0 / f64::from(self.sample_rate);
        let bpf = spf / spb;

        let pos = self.transport.pos_beats;
        let loop_on = self.transport.loop_enabled;
        let loop_start = self.transport.loop_start_beat;
        let loop_end = self.transport.loop_end_beat;
        let any_solo = self.any_solo;

        for track in &mut self.tracks {
            if track.muted || (any_solo && !track.soloed) {
                continue;
            }

            let (mut gl, mut gr) = pan_gains(track.pan);
            gl *= track.volume;
            gr *= track.volume;

            let mut peaks = PeakMeter::default();

            for clip in track.clips.iter().filter(|c| c.active) {
                let clip_end = clip.end_beat();
                let frames = clip.frames();

                for f in 0..nf {
                    let mut beat_at = pos + f as f64 * bpf;

                    if loop_on && beat_at >= loop_end {
                        beat_at = loop_start + (beat_at - loop_start) % (loop_end - loop_start);
                    }

                    if beat_at < clip.start_beat || beat_at >= clip_end {
                        continue;
                    }

                    // Nearest-sample lookup: the clip's PCM is index-scaled
                    // across its beat length, no interpolation.
                    let offset = (beat_at - clip.start_beat) / clip.len_beats;
                    let fi = (offset * frames as f64) as usize;
                    if fi >= frames {
                        continue;
                    }

                    let sl = clip.left()[fi] * gl;
                    let sr = clip.right()[fi] * gr;
                    mix_l[f] += sl;
                    mix_r[f] += sr;
                    peaks.update(sl, sr);
                }
            }

            track.peak_l = peaks.left();
            track.peak_r = peaks.right();
        }

        let mv = self.master_volume;
        for f in 0..nf {
            let l = (mix_l[f] * mv).clamp(-1.0, 1.0);
            let r = (mix_r[f] * mv).clamp(-1.0, 1.0);
            out[f * CHANNELS] = l;
            out[f * CHANNELS + 1] = r;
            self.master_peaks.update(l, r);
        }

        let sample_rate = self.sample_rate;
        self.transport.advance(nf as u32, sample_rate);
    }
}
