use std::ops::Range;

use crate::config::{ms_to_samples, AnalysisConfig};

/// Short-time RMS of `samples` over frames of `frame_len`, advanced by `hop`.
///
/// A buffer shorter than one frame yields a single value over the whole buffer.
pub fn rms_envelope(samples: &[f32], frame_len: usize, hop: usize) -> Vec<f32> {
    if samples.is_empty() {
        return Vec::new();
    }
    let frame_len = frame_len.clamp(1, samples.len());
    let hop = hop.max(1);

    let mut envelope = Vec::with_capacity((samples.len() - frame_len) / hop + 1);
    let mut start = 0;
    while start + frame_len <= samples.len() {
        let frame = &samples[start..start + frame_len];
        let sum_sq: f64 = frame.iter().map(|&s| s as f64 * s as f64).sum();
        envelope.push((sum_sq / frame_len as f64).sqrt() as f32);
        start += hop;
    }
    envelope
}

/// Sample index where the onset peak frame begins: the first RMS frame within
/// `onset_peak_ratio` of the loudest one. A steady tone peaks at its start;
/// silence resolves to 0.
pub fn onset_peak(samples: &[f32], sample_rate: u32, config: &AnalysisConfig) -> usize {
    let frame_len = ms_to_samples(config.energy_frame_ms, sample_rate);
    let hop = ms_to_samples(config.energy_hop_ms, sample_rate).max(1);
    let envelope = rms_envelope(samples, frame_len, hop);

    let loudest = envelope.iter().copied().fold(0.0f32, f32::max);
    if !(loudest > 0.0) {
        return 0;
    }
    let level = loudest * config.onset_peak_ratio;
    envelope.iter().position(|&rms| rms >= level).unwrap_or(0) * hop
}

/// Pick the slice of the clip to analyse: the decaying resonance after the
/// loudest onset rather than the broadband impact itself.
///
/// The window starts `onset_skip_ms` after the onset peak and runs for
/// `window_ms`, clamped to the buffer. It never starts earlier, so a late
/// onset leaves a short or empty window.
pub fn select_window(samples: &[f32], sample_rate: u32, config: &AnalysisConfig) -> Range<usize> {
    let len = samples.len();
    if len == 0 {
        return 0..0;
    }

    let peak = onset_peak(samples, sample_rate, config);
    let skip = ms_to_samples(config.onset_skip_ms, sample_rate);
    let window_len = ms_to_samples(config.window_ms, sample_rate).max(1);

    let start = (peak + skip).min(len);
    let end = (start + window_len).min(len);

    log::debug!(
        "onset peak at {:.3}s, analysis window {:.3}s..{:.3}s",
        peak as f64 / sample_rate as f64,
        start as f64 / sample_rate as f64,
        end as f64 / sample_rate as f64
    );

    start..end
}
