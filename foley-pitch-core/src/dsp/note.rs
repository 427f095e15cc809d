use crate::config::AnalysisConfig;
use crate::types::{FusedEstimate, Method, NoteResult};

pub const A4_HZ: f32 = 440.0;
pub const A4_MIDI: i32 = 69;

pub const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Nearest equal-tempered MIDI number, or `None` for zero/negative/non-finite input.
pub fn freq_to_midi(freq_hz: f32) -> Option<i32> {
    if !(freq_hz > 0.0 && freq_hz.is_finite()) {
        return None;
    }
    let midi = (A4_MIDI as f32 + 12.0 * (freq_hz / A4_HZ).log2()).round();
    midi.is_finite().then_some(midi as i32)
}

pub fn midi_to_freq(midi: i32) -> f32 {
    A4_HZ * 2f32.powf((midi - A4_MIDI) as f32 / 12.0)
}

/// Transpose `midi` by whole octaves into `[low, high]`.
///
/// A number already in range is returned unchanged. With `prefer_lower`, a
/// number that had to be folded drops one more octave when that still fits.
pub fn fold_octave(midi: i32, low: i32, high: i32, prefer_lower: bool) -> i32 {
    let mut folded = midi;
    while folded > high {
        folded -= 12;
    }
    while folded < low {
        folded += 12;
    }
    if prefer_lower && folded != midi && folded - 12 >= low {
        folded -= 12;
    }
    folded
}

/// Scientific pitch name, e.g. 69 -> "A4", 36 -> "C2".
pub fn note_name(midi: i32) -> String {
    let pitch_class = midi.rem_euclid(12) as usize;
    let octave = midi.div_euclid(12) - 1;
    format!("{}{}", NOTE_NAMES[pitch_class], octave)
}

/// Inverse of [`note_name`]: "C#4" -> 61. Sharps only, as produced above.
pub fn parse_note_name(name: &str) -> Option<i32> {
    let split = name.find(|c: char| c.is_ascii_digit() || c == '-')?;
    let (pitch, octave) = name.split_at(split);
    let pitch_class = NOTE_NAMES.iter().position(|&n| n == pitch)? as i32;
    let octave: i32 = octave.parse().ok()?;
    Some((octave + 1) * 12 + pitch_class)
}

/// Turn a fused estimate into the final note record.
pub fn map_note(fused: FusedEstimate, config: &AnalysisConfig) -> NoteResult {
    if fused.method == Method::Unpitched {
        return NoteResult::unpitched();
    }
    let Some(raw_midi) = freq_to_midi(fused.frequency_hz) else {
        return NoteResult::unpitched();
    };

    let midi = fold_octave(raw_midi, config.midi_low, config.midi_high, config.prefer_lower_octave);
    if midi != raw_midi {
        log::debug!(
            "folded MIDI {} ({}) to {} ({})",
            raw_midi,
            note_name(raw_midi),
            midi,
            note_name(midi)
        );
    }

    NoteResult {
        frequency_hz: fused.frequency_hz,
        midi_number: Some(midi),
        note_name: Some(note_name(midi)),
        method: fused.method,
    }
}
