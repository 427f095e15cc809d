//! Synthetic clips shared by the unit tests.

use std::f64::consts::PI;
use std::io::Cursor;

pub fn sine(freq: f64, sample_rate: u32, secs: f64, amplitude: f32) -> Vec<f32> {
    let n = (sample_rate as f64 * secs) as usize;
    (0..n)
        .map(|i| amplitude * (2.0 * PI * freq * i as f64 / sample_rate as f64).sin() as f32)
        .collect()
}

/// Deterministic uniform noise in [-1, 1).
pub fn noise(len: usize, seed: u32) -> Vec<f32> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0
        })
        .collect()
}

/// A broadband impact followed by a damped sinusoidal ring.
pub fn impact_with_tail(
    sample_rate: u32,
    transient_secs: f64,
    tail_freq: f64,
    tail_secs: f64,
    tail_decay_secs: f64,
) -> Vec<f32> {
    let sr = sample_rate as f64;
    let transient_len = (transient_secs * sr) as usize;
    let tail_len = (tail_secs * sr) as usize;

    let mut out: Vec<f32> = noise(transient_len, 99)
        .into_iter()
        .enumerate()
        .map(|(i, s)| s * (1.0 - 0.7 * i as f32 / transient_len as f32))
        .collect();
    out.extend((0..tail_len).map(|i| {
        let t = i as f64 / sr;
        (0.4 * (-t / tail_decay_secs).exp() * (2.0 * PI * tail_freq * t).sin()) as f32
    }));
    out
}

/// 16-bit PCM WAV bytes of interleaved `samples`.
pub fn wav_bytes(samples: &[f32], sample_rate: u32, channels: u16) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample((s.clamp(-1.0, 1.0) * 32767.0) as i16).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// 32-bit float mono WAV bytes.
pub fn wav_bytes_f32(samples: &[f32], sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for &s in samples {
            writer.write_sample(s).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}
