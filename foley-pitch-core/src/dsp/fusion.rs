use crate::config::{ms_to_samples, AnalysisConfig};
use crate::dsp::autocorr::estimate_frame;
use crate::types::FrameEstimate;

/// Slide an analysis frame across `filtered` and estimate each position.
///
/// A window shorter than one frame is analysed as a single frame.
pub fn frame_estimates(filtered: &[f32], sample_rate: u32, config: &AnalysisConfig) -> Vec<FrameEstimate> {
    if filtered.is_empty() {
        return Vec::new();
    }
    let frame_len = ms_to_samples(config.frame_ms, sample_rate).max(1);
    let hop = ms_to_samples(config.frame_hop_ms, sample_rate).max(1);

    if filtered.len() < frame_len {
        return vec![estimate_frame(filtered, sample_rate, config)];
    }

    let mut estimates = Vec::with_capacity((filtered.len() - frame_len) / hop + 1);
    let mut start = 0;
    while start + frame_len <= filtered.len() {
        estimates.push(estimate_frame(&filtered[start..start + frame_len], sample_rate, config));
        start += hop;
    }
    estimates
}

/// Median of `values`; sorts in place. Empty input gives 0.
pub fn median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        0.5 * (values[mid - 1] + values[mid])
    } else {
        values[mid]
    }
}

/// Population standard deviation.
pub fn std_dev(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let var = values.iter().map(|&v| (v as f64 - mean).powi(2)).sum::<f64>() / n;
    var.sqrt() as f32
}

/// Width in Hz of an interval of `cents` above `freq_hz`.
pub fn cents_to_hz(freq_hz: f32, cents: f32) -> f32 {
    freq_hz * (2f32.powf(cents / 1200.0) - 1.0)
}

/// Combine per-frame estimates into one frequency, or 0 when the frames do
/// not agree on a reliable pitch.
pub fn fuse(estimates: &[FrameEstimate], config: &AnalysisConfig) -> f32 {
    let mut good: Vec<f32> = estimates
        .iter()
        .filter(|e| {
            e.confidence >= config.min_confidence
                && e.frequency_hz >= config.valid_min_hz
                && e.frequency_hz <= config.valid_max_hz
        })
        .map(|e| e.frequency_hz)
        .collect();

    if good.len() < config.min_good_frames {
        log::debug!(
            "{} of {} frames reliable, need {}",
            good.len(),
            estimates.len(),
            config.min_good_frames
        );
        return 0.0;
    }

    let spread = std_dev(&good);
    let center = median(&mut good);
    let tolerance = cents_to_hz(center, config.max_spread_cents);
    if !(center.is_finite() && spread <= tolerance) {
        log::debug!(
            "rejecting median {:.2} Hz: spread {:.2} Hz exceeds {:.2} Hz",
            center,
            spread,
            tolerance
        );
        return 0.0;
    }

    log::debug!(
        "median {:.2} Hz over {} frames (spread {:.2} Hz)",
        center,
        good.len(),
        spread
    );
    center
}
