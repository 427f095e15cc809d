use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Every tunable of the estimation pipeline.
///
/// Durations are in milliseconds and converted to sample counts against the
/// clip's own sample rate, so one config serves any input rate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    // Onset-relative windowing
    /// RMS frame length for onset detection.
    pub energy_frame_ms: f64,
    /// Hop between RMS frames.
    pub energy_hop_ms: f64,
    /// Distance from the onset peak to the start of the analysis window.
    pub onset_skip_ms: f64,
    /// Requested analysis window length.
    pub window_ms: f64,
    /// The onset peak is the first RMS frame reaching this fraction of the
    /// loudest frame.
    pub onset_peak_ratio: f32,

    // Band-limiting
    pub highpass_hz: f64,
    pub lowpass_hz: f64,
    /// Q of both second-order sections (0.707 = Butterworth).
    pub filter_q: f64,

    // Frame-wise autocorrelation
    pub frame_ms: f64,
    pub frame_hop_ms: f64,
    /// Mean squared amplitude below which a frame counts as silence.
    pub silence_energy: f32,
    /// Lowest frequency searched; sets the longest lag.
    pub search_min_hz: f32,
    /// Highest frequency searched; sets the shortest lag.
    pub search_max_hz: f32,
    /// The best lag is the first peak whose interpolated height reaches this
    /// fraction of the strongest peak.
    pub key_maximum_ratio: f32,
    /// A longer-lag peak within this of the best correlation is preferred.
    pub fundamental_tolerance: f32,
    /// Longest lag considered by the fundamental bias, as a multiple of the
    /// best lag.
    pub fundamental_search_ratio: f32,
    /// Correlation mapped to confidence 0; 1.0 maps to confidence 1.
    pub correlation_floor: f32,

    // Fusion and gating
    pub min_confidence: f32,
    pub valid_min_hz: f32,
    pub valid_max_hz: f32,
    pub min_good_frames: usize,
    /// Largest standard deviation accepted, in cents around the median.
    pub max_spread_cents: f32,

    // Note mapping
    pub midi_low: i32,
    pub midi_high: i32,
    /// After folding down into range, drop one more octave if it still fits.
    pub prefer_lower_octave: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            energy_frame_ms: 20.0,
            energy_hop_ms: 10.0,
            onset_skip_ms: 150.0,
            window_ms: 400.0,
            onset_peak_ratio: 0.9,
            highpass_hz: 40.0,
            lowpass_hz: 1500.0,
            filter_q: std::f64::consts::FRAC_1_SQRT_2,
            frame_ms: 120.0,
            frame_hop_ms: 30.0,
            silence_energy: 1e-5,
            search_min_hz: 50.0,
            search_max_hz: 1000.0,
            key_maximum_ratio: 0.9,
            fundamental_tolerance: 0.08,
            fundamental_search_ratio: 1.9,
            correlation_floor: 0.3,
            min_confidence: 0.6,
            valid_min_hz: 40.0,
            valid_max_hz: 2000.0,
            min_good_frames: 3,
            max_spread_cents: 50.0,
            midi_low: 36,
            midi_high: 96,
            prefer_lower_octave: true,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<()> {
        let durations = [
            ("energyFrameMs", self.energy_frame_ms),
            ("energyHopMs", self.energy_hop_ms),
            ("windowMs", self.window_ms),
            ("frameMs", self.frame_ms),
            ("frameHopMs", self.frame_hop_ms),
        ];
        for (name, value) in durations {
            if !(value.is_finite() && value > 0.0) {
                return Err(invalid(format!("{name} must be positive, got {value}")));
            }
        }
        if !(self.onset_skip_ms.is_finite() && self.onset_skip_ms >= 0.0) {
            return Err(invalid(format!(
                "onsetSkipMs must not be negative, got {}",
                self.onset_skip_ms
            )));
        }
        if !(self.highpass_hz >= 0.0 && self.highpass_hz < self.lowpass_hz) {
            return Err(invalid(format!(
                "filter band {}..{} Hz is empty",
                self.highpass_hz, self.lowpass_hz
            )));
        }
        if !(self.filter_q > 0.0) {
            return Err(invalid("filterQ must be positive".into()));
        }
        if !(self.search_min_hz > 0.0 && self.search_min_hz < self.search_max_hz) {
            return Err(invalid(format!(
                "search band {}..{} Hz is empty",
                self.search_min_hz, self.search_max_hz
            )));
        }
        if !(self.valid_min_hz >= 0.0 && self.valid_min_hz < self.valid_max_hz) {
            return Err(invalid(format!(
                "valid band {}..{} Hz is empty",
                self.valid_min_hz, self.valid_max_hz
            )));
        }
        let unit = [
            ("onsetPeakRatio", self.onset_peak_ratio),
            ("fundamentalTolerance", self.fundamental_tolerance),
            ("minConfidence", self.min_confidence),
        ];
        for (name, value) in unit {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(format!("{name} must lie in [0, 1], got {value}")));
            }
        }
        if !(self.key_maximum_ratio > 0.0 && self.key_maximum_ratio <= 1.0) {
            return Err(invalid(format!(
                "keyMaximumRatio must lie in (0, 1], got {}",
                self.key_maximum_ratio
            )));
        }
        if !(self.correlation_floor >= 0.0 && self.correlation_floor < 1.0) {
            return Err(invalid("correlationFloor must lie in [0, 1)".into()));
        }
        if !(self.fundamental_search_ratio >= 1.0) {
            return Err(invalid("fundamentalSearchRatio must be at least 1".into()));
        }
        if self.min_good_frames == 0 {
            return Err(invalid("minGoodFrames must be at least 1".into()));
        }
        if !(self.max_spread_cents >= 0.0) {
            return Err(invalid("maxSpreadCents must not be negative".into()));
        }
        if self.midi_low < 0 || self.midi_high > 127 || self.midi_high - self.midi_low < 12 {
            return Err(invalid(format!(
                "MIDI range {}..={} must span at least one octave within 0..=127",
                self.midi_low, self.midi_high
            )));
        }
        Ok(())
    }
}

/// Convert a duration to a sample count at `sample_rate`.
pub(crate) fn ms_to_samples(ms: f64, sample_rate: u32) -> usize {
    (ms * sample_rate as f64 / 1000.0).round() as usize
}

fn invalid(msg: String) -> Error {
    Error::InvalidConfig(msg)
}
