use foley_pitch_core::dsp::note::midi_to_freq;
use foley_pitch_core::{Analysis, NoteResult};
use serde::Serialize;
use serde_json::json;

use crate::hint::GenerationHint;

/// One-line human summary of a clip's note: measured frequency, then the
/// folded note with its equal-tempered frequency.
pub fn describe(locator: &str, note: &NoteResult) -> String {
    match (note.midi_number, note.note_name.as_deref()) {
        (Some(midi), Some(name)) if note.is_pitched() => format!(
            "{}: {:.2} Hz  {} (MIDI {}, {:.2} Hz)  [{}]",
            locator,
            note.frequency_hz,
            name,
            midi,
            midi_to_freq(midi),
            note.method
        ),
        _ => format!("{}: could not detect a stable pitch", locator),
    }
}

/// Analysis window and per-frame estimates, one line each.
pub fn describe_frames(analysis: &Analysis) -> Vec<String> {
    let mut lines = Vec::with_capacity(analysis.frames.len() + 1);
    if analysis.sample_rate > 0 {
        let sr = analysis.sample_rate as f64;
        lines.push(format!(
            "  window {:.3}s..{:.3}s",
            analysis.window.start as f64 / sr,
            analysis.window.end as f64 / sr
        ));
    } else {
        lines.push("  window empty".to_string());
    }
    for (i, frame) in analysis.frames.iter().enumerate() {
        if frame.is_pitched() {
            lines.push(format!(
                "  frame {:>2}: {:8.2} Hz  confidence {:.2}",
                i, frame.frequency_hz, frame.confidence
            ));
        } else {
            lines.push(format!("  frame {:>2}: -", i));
        }
    }
    lines
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    source: &'a str,
    #[serde(flatten)]
    note: &'a NoteResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_hint: Option<GenerationHint>,
}

pub fn json_line(
    locator: &str,
    note: &NoteResult,
    generation_hint: Option<GenerationHint>,
) -> serde_json::Result<String> {
    let report = JsonReport {
        source: locator,
        note,
        generation_hint,
    };
    serde_json::to_string(&report)
}

pub fn json_error_line(locator: &str, error: &str) -> String {
    json!({ "source": locator, "error": error }).to_string()
}
