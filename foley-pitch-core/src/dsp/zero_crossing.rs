/// Count sign changes between consecutive samples. Zero counts as positive.
pub fn count_zero_crossings(samples: &[f32]) -> usize {
    samples
        .windows(2)
        .filter(|pair| (pair[0] >= 0.0) != (pair[1] >= 0.0))
        .count()
}

/// Rough cycle frequency from the zero-crossing rate: two crossings per cycle.
///
/// Returns 0 unless the result is finite and within `[min_hz, max_hz]`. Used
/// only when autocorrelation found nothing; damped or noisy material can defeat
/// autocorrelation yet still cross zero at a countable rate.
pub fn zero_crossing_frequency(samples: &[f32], sample_rate: u32, min_hz: f32, max_hz: f32) -> f32 {
    if samples.len() < 2 || sample_rate == 0 {
        return 0.0;
    }
    let crossings = count_zero_crossings(samples);
    let seconds = samples.len() as f64 / sample_rate as f64;
    let freq = (crossings as f64 / (2.0 * seconds)) as f32;

    if freq.is_finite() && freq >= min_hz && freq <= max_hz {
        freq
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: u32, secs: f64) -> Vec<f32> {
        let n = (sample_rate as f64 * secs) as usize;
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sample_rate as f64 + 0.1).sin() as f32)
            .collect()
    }

    #[test]
    fn test_known_sine_rate() {
        let freq = zero_crossing_frequency(&sine(300.0, 44100, 0.4), 44100, 40.0, 2000.0);
        assert!((freq - 300.0).abs() < 5.0, "got {freq}");
    }

    #[test]
    fn test_dc_signal_no_crossings() {
        assert_eq!(count_zero_crossings(&[1.0; 1000]), 0);
        assert_eq!(zero_crossing_frequency(&[1.0; 1000], 44100, 40.0, 2000.0), 0.0);
    }

    #[test]
    fn test_silence_counts_as_positive() {
        assert_eq!(count_zero_crossings(&[0.0; 100]), 0);
    }

    #[test]
    fn test_out_of_range_rejected() {
        // Alternating samples cross every sample: Nyquist, far above range
        let alternating: Vec<f32> = (0..1000).map(|i| if i % 2 == 0 { 0.5 } else { -0.5 }).collect();
        assert_eq!(zero_crossing_frequency(&alternating, 8000, 40.0, 2000.0), 0.0);
        assert_eq!(zero_crossing_frequency(&sine(20.0, 8000, 1.0), 8000, 40.0, 2000.0), 0.0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(zero_crossing_frequency(&[], 44100, 40.0, 2000.0), 0.0);
    }
}
