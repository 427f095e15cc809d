use std::f64::consts::PI;

use crate::config::AnalysisConfig;

/// Filtering applied to the analysis copy of a clip. Never used on the
/// samples that get played back.
pub trait AnalysisFilter {
    /// Return a filtered copy with the same length as `samples`.
    fn apply(&self, samples: &[f32], sample_rate: u32) -> Vec<f32>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FilterType {
    LowPass,
    HighPass,
}

/// Second-order IIR section (RBJ cookbook), transposed direct form II.
#[derive(Clone, Debug)]
pub struct Biquad {
    b0: f64,
    b1: f64,
    b2: f64,
    a1: f64,
    a2: f64,
    z1: f64,
    z2: f64,
}

impl Biquad {
    pub fn new(filter_type: FilterType, cutoff_hz: f64, q: f64, sample_rate: u32) -> Self {
        let w0 = 2.0 * PI * cutoff_hz / sample_rate as f64;
        let (sin_w0, cos_w0) = w0.sin_cos();
        let alpha = sin_w0 / (2.0 * q);
        let a0 = 1.0 + alpha;

        let (b0, b1, b2) = match filter_type {
            FilterType::LowPass => {
                let b1 = 1.0 - cos_w0;
                (b1 / 2.0, b1, b1 / 2.0)
            }
            FilterType::HighPass => {
                let b1 = -(1.0 + cos_w0);
                (-b1 / 2.0, b1, -b1 / 2.0)
            }
        };

        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: -2.0 * cos_w0 / a0,
            a2: (1.0 - alpha) / a0,
            z1: 0.0,
            z2: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        let y = self.b0 * x + self.z1;
        self.z1 = self.b1 * x - self.a1 * y + self.z2;
        self.z2 = self.b2 * x - self.a2 * y;
        y
    }

    pub fn run(&mut self, samples: &mut [f32]) {
        for s in samples.iter_mut() {
            *s = self.process(*s as f64) as f32;
        }
    }
}

/// High-pass then low-pass, removing rumble/DC drift and content well above
/// any plausible foley fundamental.
#[derive(Clone, Debug)]
pub struct BandLimiter {
    pub highpass_hz: f64,
    pub lowpass_hz: f64,
    pub q: f64,
}

impl BandLimiter {
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self {
            highpass_hz: config.highpass_hz,
            lowpass_hz: config.lowpass_hz,
            q: config.filter_q,
        }
    }
}

impl Default for BandLimiter {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}

impl AnalysisFilter for BandLimiter {
    fn apply(&self, samples: &[f32], sample_rate: u32) -> Vec<f32> {
        let mut out = samples.to_vec();
        let nyquist = sample_rate as f64 / 2.0;

        // A stage whose cutoff is outside (0, nyquist) is skipped.
        if self.highpass_hz > 0.0 && self.highpass_hz < nyquist {
            Biquad::new(FilterType::HighPass, self.highpass_hz, self.q, sample_rate).run(&mut out);
        }
        if self.lowpass_hz > 0.0 && self.lowpass_hz < nyquist {
            Biquad::new(FilterType::LowPass, self.lowpass_hz, self.q, sample_rate).run(&mut out);
        }
        out
    }
}
