use crate::config::AnalysisConfig;
use crate::types::FrameEstimate;

/// The lag picked from a correlation curve, before interpolation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LagPick {
    pub lag: usize,
    pub correlation: f32,
}

/// Shortest and longest lag searched for a frame of `frame_len` samples.
///
/// The longest lag is rounded up so the period of `search_min_hz` is covered,
/// then capped at half the frame so every correlation sums over at least half
/// of it. `None` when nothing is searchable.
pub fn lag_bounds(sample_rate: u32, frame_len: usize, config: &AnalysisConfig) -> Option<(usize, usize)> {
    let min_lag = ((sample_rate as f32 / config.search_max_hz).floor() as usize).max(2);
    let max_lag = ((sample_rate as f32 / config.search_min_hz).ceil() as usize).min(frame_len / 2);
    if max_lag < min_lag || max_lag + 1 >= frame_len {
        return None;
    }
    Some((min_lag, max_lag))
}

/// Normalized autocorrelation of the mean-centered `frame`.
///
/// `curve[lag]` holds the correlation of the frame against itself shifted by
/// `lag`, divided by the geometric mean of both overlapping sub-window
/// energies. Lags from `min_lag - 1` to `max_lag + 1` are filled so that every
/// searched lag has both neighbours; other entries are zero.
pub fn correlation_curve(frame: &[f32], min_lag: usize, max_lag: usize) -> Vec<f32> {
    let n = frame.len();
    let mut curve = vec![0.0f32; max_lag + 2];
    if n == 0 || min_lag == 0 || max_lag + 1 >= n {
        return curve;
    }

    let mean = frame.iter().map(|&s| s as f64).sum::<f64>() / n as f64;
    let x: Vec<f64> = frame.iter().map(|&s| s as f64 - mean).collect();

    // prefix[i] = energy of x[..i]
    let mut prefix = Vec::with_capacity(n + 1);
    prefix.push(0.0f64);
    let mut acc = 0.0;
    for &v in &x {
        acc += v * v;
        prefix.push(acc);
    }

    for lag in (min_lag - 1)..=(max_lag + 1) {
        let overlap = n - lag;
        let dot: f64 = x[..overlap]
            .iter()
            .zip(&x[lag..])
            .map(|(a, b)| a * b)
            .sum();
        let head_energy = prefix[overlap];
        let tail_energy = prefix[n] - prefix[lag];
        let denom = (head_energy * tail_energy).sqrt();
        curve[lag] = if denom > 1e-12 {
            (dot / denom).clamp(-1.0, 1.0) as f32
        } else {
            0.0
        };
    }
    curve
}

fn is_peak(curve: &[f32], lag: usize) -> bool {
    curve[lag] > 0.0 && curve[lag] >= curve[lag - 1] && curve[lag] >= curve[lag + 1]
}

/// Height of the parabola through a peak and its two neighbours.
///
/// A period that falls between integer lags leaves the raw peak short of the
/// true maximum; the vertex restores it.
pub fn peak_height(curve: &[f32], lag: usize) -> f32 {
    let (y0, y1, y2) = (curve[lag - 1], curve[lag], curve[lag + 1]);
    let offset = parabolic_offset(y0, y1, y2);
    (y1 - 0.25 * (y0 - y2) * offset).clamp(-1.0, 1.0)
}

fn refined_lag(curve: &[f32], lag: usize) -> f32 {
    lag as f32 + parabolic_offset(curve[lag - 1], curve[lag], curve[lag + 1])
}

/// Choose the lag that best represents the fundamental period.
///
/// Peaks are compared by interpolated height. The best lag is the first key
/// maximum: the strongest peak of the first lobe whose height reaches
/// `key_maximum_ratio` of the strongest peak overall, so multiples of a steady
/// period never win. Then, up to `fundamental_search_ratio` times the refined
/// best period, a longer-lag peak within `fundamental_tolerance` of the best
/// height takes over when it stands in its own lobe, i.e. the curve dipped
/// below that tolerance in between. The longest such peak wins.
pub fn pick_lag(curve: &[f32], min_lag: usize, max_lag: usize, config: &AnalysisConfig) -> Option<LagPick> {
    if min_lag == 0 || max_lag < min_lag || curve.len() < max_lag + 2 {
        return None;
    }

    let peaks: Vec<(usize, f32)> = (min_lag..=max_lag)
        .filter(|&lag| is_peak(curve, lag))
        .map(|lag| (lag, peak_height(curve, lag)))
        .collect();
    let strongest = peaks.iter().map(|&(_, height)| height).reduce(f32::max)?;

    let threshold = strongest * config.key_maximum_ratio;
    let (mut best_lag, mut best_height) = peaks.iter().copied().find(|&(_, height)| height >= threshold)?;
    let mut lag = best_lag + 1;
    while lag <= max_lag && curve[lag] >= threshold {
        if is_peak(curve, lag) {
            let height = peak_height(curve, lag);
            if height > best_height {
                best_lag = lag;
                best_height = height;
            }
        }
        lag += 1;
    }

    // Fundamental bias toward longer lags
    let floor = best_height - config.fundamental_tolerance;
    let limit = ((refined_lag(curve, best_lag) * config.fundamental_search_ratio).floor() as usize).min(max_lag);
    let mut chosen = best_lag;
    let mut chosen_height = best_height;
    let mut dipped = false;
    for lag in (best_lag + 1)..=limit {
        if curve[lag] < floor {
            dipped = true;
            continue;
        }
        if !is_peak(curve, lag) {
            continue;
        }
        let height = peak_height(curve, lag);
        if dipped || height > chosen_height {
            chosen = lag;
            chosen_height = height;
            dipped = false;
        }
    }

    if chosen != best_lag {
        log::trace!(
            "fundamental bias moved lag {} ({:.3}) -> {} ({:.3})",
            best_lag,
            best_height,
            chosen,
            chosen_height
        );
    }

    Some(LagPick {
        lag: chosen,
        correlation: curve[chosen],
    })
}

/// Vertex offset of the parabola through (-1, y0), (0, y1), (1, y2), within ±1.
pub fn parabolic_offset(y0: f32, y1: f32, y2: f32) -> f32 {
    let denom = y0 - 2.0 * y1 + y2;
    if denom.abs() < 1e-12 {
        return 0.0;
    }
    let offset = 0.5 * (y0 - y2) / denom;
    if offset.is_finite() {
        offset.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

/// Map a raw correlation to [0, 1] confidence.
pub fn confidence_from_correlation(correlation: f32, floor: f32) -> f32 {
    if !(correlation > floor) {
        return 0.0;
    }
    ((correlation - floor) / (1.0 - floor)).clamp(0.0, 1.0)
}

/// Estimate the dominant periodicity of one frame of filtered samples.
///
/// Never fails: silence, an unsearchable frame or a flat curve all give
/// [`FrameEstimate::NONE`].
pub fn estimate_frame(frame: &[f32], sample_rate: u32, config: &AnalysisConfig) -> FrameEstimate {
    if frame.len() < 3 || sample_rate == 0 {
        return FrameEstimate::NONE;
    }

    let energy = frame.iter().map(|&s| s as f64 * s as f64).sum::<f64>() / frame.len() as f64;
    if energy < config.silence_energy as f64 {
        return FrameEstimate::NONE;
    }

    let Some((min_lag, max_lag)) = lag_bounds(sample_rate, frame.len(), config) else {
        return FrameEstimate::NONE;
    };
    let curve = correlation_curve(frame, min_lag, max_lag);
    let Some(pick) = pick_lag(&curve, min_lag, max_lag, config) else {
        return FrameEstimate::NONE;
    };

    let offset = parabolic_offset(curve[pick.lag - 1], curve[pick.lag], curve[pick.lag + 1]);
    let period = pick.lag as f32 + offset;
    let frequency_hz = sample_rate as f32 / period;
    if !(period > 0.0 && frequency_hz.is_finite()) {
        return FrameEstimate::NONE;
    }

    let confidence = confidence_from_correlation(pick.correlation, config.correlation_floor);
    if confidence <= 0.0 {
        return FrameEstimate::NONE;
    }

    FrameEstimate {
        frequency_hz,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn sine(freq: f64, sample_rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (0.5 * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin()) as f32)
            .collect()
    }

    fn noise(len: usize, seed: u32) -> Vec<f32> {
        let mut state = seed;
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
            })
            .collect()
    }

    /// Correlation curve made of Gaussian bumps at the given (lag, height).
    fn bump_curve(len: usize, bumps: &[(usize, f32)]) -> Vec<f32> {
        (0..len)
            .map(|lag| {
                bumps
                    .iter()
                    .map(|&(center, height)| {
                        let d = (lag as f32 - center as f32) / 4.0;
                        height * (-d * d).exp()
                    })
                    .fold(0.0, f32::max)
            })
            .collect()
    }

    #[test]
    fn test_sine_frame_frequency() {
        let config = AnalysisConfig::default();
        for &(freq, sr) in &[(50.0, 8000), (110.0, 44100), (440.0, 44100), (997.0, 8000)] {
            let frame = sine(freq, sr, (sr as f64 * 0.12) as usize);
            let est = estimate_frame(&frame, sr, &config);
            let err = (est.frequency_hz as f64 - freq).abs() / freq;
            assert!(err < 0.01, "{freq} Hz @ {sr}: got {}", est.frequency_hz);
            assert!(est.confidence > 0.95, "confidence {}", est.confidence);
        }
    }

    #[test]
    fn test_silence_returns_none() {
        let est = estimate_frame(&vec![0.0; 4000], 44100, &AnalysisConfig::default());
        assert_eq!(est, FrameEstimate::NONE);
    }

    #[test]
    fn test_quiet_frame_is_gated() {
        let frame: Vec<f32> = sine(200.0, 8000, 960).iter().map(|s| s * 0.001).collect();
        let est = estimate_frame(&frame, 8000, &AnalysisConfig::default());
        assert_eq!(est, FrameEstimate::NONE);
    }

    #[test]
    fn test_white_noise_has_no_confidence() {
        let est = estimate_frame(&noise(5292, 7), 44100, &AnalysisConfig::default());
        assert_eq!(est.confidence, 0.0);
    }

    #[test]
    fn test_period_longer_than_frame() {
        let est = estimate_frame(&sine(100.0, 8000, 100), 8000, &AnalysisConfig::default());
        assert_eq!(est, FrameEstimate::NONE);
    }

    #[test]
    fn test_lag_bounds() {
        let config = AnalysisConfig::default();
        assert_eq!(lag_bounds(44100, 5292, &config), Some((44, 882)));
        assert_eq!(lag_bounds(8000, 960, &config), Some((8, 160)));
        assert_eq!(lag_bounds(8000, 10, &config), None);
    }

    #[test]
    fn test_curve_of_sine_peaks_at_period() {
        let frame = sine(200.0, 8000, 960);
        let curve = correlation_curve(&frame, 8, 160);
        assert!(curve[40] > 0.99);
        assert!(curve[20] < -0.99);
        assert!(curve.iter().all(|c| (-1.0..=1.0).contains(c)));
    }

    #[test]
    fn test_prefers_lower_octave_within_tolerance() {
        // Peak at 100 and a distinct peak just under an octave lower, 0.05 weaker.
        let curve = bump_curve(400, &[(100, 0.95), (185, 0.90)]);
        let pick = pick_lag(&curve, 20, 398, &AnalysisConfig::default()).unwrap();
        assert_eq!(pick.lag, 185);
    }

    #[test]
    fn test_keeps_best_lag_outside_tolerance() {
        let curve = bump_curve(400, &[(100, 0.95), (185, 0.80)]);
        let pick = pick_lag(&curve, 20, 398, &AnalysisConfig::default()).unwrap();
        assert_eq!(pick.lag, 100);
        assert!((pick.correlation - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_bias_search_stops_below_ratio() {
        // 2x the best lag lies beyond the 1.9x search limit.
        let curve = bump_curve(400, &[(100, 0.95), (200, 0.94)]);
        let pick = pick_lag(&curve, 20, 398, &AnalysisConfig::default()).unwrap();
        assert_eq!(pick.lag, 100);
    }

    #[test]
    fn test_longest_of_several_candidates() {
        let curve = bump_curve(400, &[(100, 0.95), (140, 0.92), (170, 0.90)]);
        let pick = pick_lag(&curve, 20, 398, &AnalysisConfig::default()).unwrap();
        assert_eq!(pick.lag, 170);
    }

    #[test]
    fn test_period_multiples_resolve_to_shortest() {
        let curve = bump_curve(400, &[(100, 0.990), (200, 0.995), (300, 0.998)]);
        let pick = pick_lag(&curve, 20, 398, &AnalysisConfig::default()).unwrap();
        assert_eq!(pick.lag, 100);
    }

    #[test]
    fn test_first_key_maximum_beats_integer_multiple() {
        // 700 Hz at 8 kHz: period 11.43 samples, so lag 11 peaks near 0.97
        // while 7 periods land on lag 80 at about 1.0.
        let frame = sine(700.0, 8000, 960);
        let curve = correlation_curve(&frame, 8, 160);
        assert!(curve[80] > curve[11]);
        let pick = pick_lag(&curve, 8, 160, &AnalysisConfig::default()).unwrap();
        assert_eq!(pick.lag, 11);
        assert!(peak_height(&curve, 11) > 0.99);
    }

    #[test]
    fn test_bias_ignores_second_period_of_short_lags() {
        // 941 Hz at 8 kHz: 1.9 times the integer lag 9 would reach the lobe at
        // two periods (17 samples), the refined period does not.
        let frame = sine(941.0, 8000, 960);
        let est = estimate_frame(&frame, 8000, &AnalysisConfig::default());
        assert!((est.frequency_hz - 941.0).abs() < 10.0, "got {}", est.frequency_hz);
    }

    #[test]
    fn test_plateau_without_dip_keeps_best_lag() {
        // A weaker peak on the shoulder of the best lobe, never falling below
        // the tolerance in between, is not a separate period.
        let mut curve = vec![0.0f32; 300];
        for i in 1..=10 {
            curve[100 - i] = 0.95 - 0.02 * i as f32;
        }
        curve[100] = 0.95;
        for (i, v) in [0.94, 0.93, 0.92, 0.92, 0.91, 0.91, 0.90, 0.90, 0.90, 0.91, 0.90, 0.5]
            .into_iter()
            .enumerate()
        {
            curve[101 + i] = v;
        }
        let pick = pick_lag(&curve, 20, 290, &AnalysisConfig::default()).unwrap();
        assert_eq!(pick.lag, 100);
    }

    #[test]
    fn test_peak_height_of_symmetric_peak() {
        let curve = [0.5, 0.9, 0.5];
        assert!((peak_height(&curve, 1) - 0.9).abs() < 1e-6);
        // cos around a peak sitting half a lag right of index 1
        let step = 2.0 * std::f32::consts::PI / 8.5;
        let curve: Vec<f32> = [-1.5f32, -0.5, 0.5].iter().map(|d| (d * step).cos()).collect();
        assert!(curve[1] < 0.94);
        assert!(peak_height(&curve, 1) > 0.99);
    }

    #[test]
    fn test_flat_curve_has_no_pick() {
        let curve = vec![0.0f32; 200];
        assert_eq!(pick_lag(&curve, 10, 150, &AnalysisConfig::default()), None);
    }

    #[test]
    fn test_parabolic_offset() {
        // y = -(x - 0.25)^2 sampled at -1, 0, 1
        let offset = parabolic_offset(-1.5625, -0.0625, -0.5625);
        assert!((offset - 0.25).abs() < 1e-5);
        assert_eq!(parabolic_offset(1.0, 1.0, 1.0), 0.0);
        assert_eq!(parabolic_offset(1.0, 0.99, 0.985), 1.0);
    }

    #[test]
    fn test_confidence_mapping() {
        assert_eq!(confidence_from_correlation(0.2, 0.3), 0.0);
        assert_eq!(confidence_from_correlation(0.3, 0.3), 0.0);
        assert!((confidence_from_correlation(0.65, 0.3) - 0.5).abs() < 1e-6);
        assert_eq!(confidence_from_correlation(1.0, 0.3), 1.0);
        assert_eq!(confidence_from_correlation(f32::NAN, 0.3), 0.0);
    }
}
